//! Paths used by the generated code.
//!
//! Kept in one place so a change in the `vc_serial` layout only touches this module.

use proc_macro2::TokenStream;
use quote::quote;

pub(crate) mod fp;

// -----------------------------------------------------------------------------
// Crate Path

/// The path of the `vc_serial` crate as seen from the deriving crate.
///
/// 1. For crates that depend on `vc_serial`, `::vc_serial`.
/// 2. For crates that depend on `vc_autoserial`, `::vc_autoserial::serial`.
/// 3. For crates that depend on `vc` (a renamed facade), `::vc::serial`.
/// 4. Otherwise `::vc_serial`, which only resolves inside `vc_serial` itself.
///
/// This reads the caller's `Cargo.toml`, so it is called once per derive and
/// the result is passed around.
pub(crate) fn vc_serial() -> syn::Path {
    vc_macro_utils::Manifest::shared(|manifest| manifest.get_crate_path("vc_serial"))
}

// -----------------------------------------------------------------------------
// Items

#[inline(always)]
pub(crate) fn described_(vc_serial_path: &syn::Path) -> TokenStream {
    quote! { #vc_serial_path::info::Described }
}

#[inline(always)]
pub(crate) fn type_metadata_(vc_serial_path: &syn::Path) -> TokenStream {
    quote! { #vc_serial_path::info::TypeMetadata }
}

#[inline(always)]
pub(crate) fn base_info_(vc_serial_path: &syn::Path) -> TokenStream {
    quote! { #vc_serial_path::info::BaseInfo }
}

#[inline(always)]
pub(crate) fn metadata_cell_(vc_serial_path: &syn::Path) -> TokenStream {
    quote! { #vc_serial_path::info::MetadataCell }
}

#[inline(always)]
pub(crate) fn generic_metadata_cell_(vc_serial_path: &syn::Path) -> TokenStream {
    quote! { #vc_serial_path::info::GenericMetadataCell }
}

#[inline(always)]
pub(crate) fn aggregate_(vc_serial_path: &syn::Path) -> TokenStream {
    quote! { #vc_serial_path::access::Aggregate }
}

#[inline(always)]
pub(crate) fn save_(vc_serial_path: &syn::Path) -> TokenStream {
    quote! { #vc_serial_path::archive::Save }
}

#[inline(always)]
pub(crate) fn load_(vc_serial_path: &syn::Path) -> TokenStream {
    quote! { #vc_serial_path::archive::Load }
}

#[inline(always)]
pub(crate) fn output_archive_(vc_serial_path: &syn::Path) -> TokenStream {
    quote! { #vc_serial_path::archive::OutputArchive }
}

#[inline(always)]
pub(crate) fn input_archive_(vc_serial_path: &syn::Path) -> TokenStream {
    quote! { #vc_serial_path::archive::InputArchive }
}

#[inline(always)]
pub(crate) fn serial_error_(vc_serial_path: &syn::Path) -> TokenStream {
    quote! { #vc_serial_path::SerialError }
}

#[inline(always)]
pub(crate) fn traverse_(vc_serial_path: &syn::Path) -> TokenStream {
    quote! { #vc_serial_path::traverse }
}

#[cfg(feature = "auto_register")]
#[inline(always)]
pub(crate) fn auto_register_(vc_serial_path: &syn::Path) -> TokenStream {
    quote! { #vc_serial_path::__macro_exports::auto_register }
}
