// -----------------------------------------------------------------------------
// Modules

mod match_serial;

mod auto_register;
mod struct_kind;
mod trait_aggregate;
mod trait_described;
mod trait_save_load;

// -----------------------------------------------------------------------------
// Internal API

pub(crate) use match_serial::match_serial_impls;

use auto_register::get_auto_register_impl;
use struct_kind::impl_struct;
use trait_aggregate::impl_trait_aggregate;
use trait_described::impl_trait_described;
use trait_save_load::impl_trait_save_load;
