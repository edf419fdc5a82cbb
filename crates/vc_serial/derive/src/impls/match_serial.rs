use proc_macro::TokenStream;
use quote::quote;
use syn::DeriveInput;

use crate::derive_data::SerialStruct;

/// Provided for `#[derive(Serial)]`.
pub(crate) fn match_serial_impls(ast: DeriveInput) -> TokenStream {
    let info = match SerialStruct::from_input(&ast) {
        Ok(val) => val,
        Err(err) => return err.into_compile_error().into(),
    };

    let serial_impls = match crate::impls::impl_struct(&info) {
        Ok(val) => val,
        Err(err) => return err.into_compile_error().into(),
    };

    TokenStream::from(quote! {
        const _: () = {
            #serial_impls
        };
    })
}
