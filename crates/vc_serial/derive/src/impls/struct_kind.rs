use proc_macro2::TokenStream;
use quote::quote;

use super::{get_auto_register_impl, impl_trait_aggregate};
use super::{impl_trait_described, impl_trait_save_load};

use crate::derive_data::SerialStruct;

/// Implement `Described`, `Aggregate`, `Save` and `Load` for a struct.
pub(crate) fn impl_struct(info: &SerialStruct) -> syn::Result<TokenStream> {
    let meta = info.meta();
    let (impl_generics, ty_generics, where_clause) = meta.split_generics(
        info.own_fields().map(|f| f.ty()),
        info.base_fields().map(|f| f.ty()),
    );
    let generics = (&impl_generics, &ty_generics, &where_clause);

    let described_tokens = impl_trait_described(info, generics);
    let aggregate_tokens = impl_trait_aggregate(info, generics);
    let save_load_tokens = impl_trait_save_load(meta, generics);
    let auto_register_tokens = get_auto_register_impl(meta)?;

    Ok(quote! {
        #described_tokens

        #aggregate_tokens

        #save_load_tokens

        #auto_register_tokens
    })
}
