//! Fully qualified paths of `core` items, immune to shadowing in the caller's scope.

use proc_macro2::TokenStream;
use quote::{ToTokens, quote};

pub(crate) struct OptionFP;

impl ToTokens for OptionFP {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        tokens.extend(quote!(::core::option::Option));
    }
}

pub(crate) struct ResultFP;

impl ToTokens for ResultFP {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        tokens.extend(quote!(::core::result::Result));
    }
}
