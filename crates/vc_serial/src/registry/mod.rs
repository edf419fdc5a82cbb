//! A runtime table of serializable types.
//!
//! ## Menu
//!
//! - [`TypeRegistry`]: maps [`TypeId`](core::any::TypeId), full type path and
//!   bare identifier to a type's [`TypeMetadata`](crate::TypeMetadata).

// -----------------------------------------------------------------------------
// Modules

mod type_registry;

// -----------------------------------------------------------------------------
// Exports

pub use type_registry::TypeRegistry;
