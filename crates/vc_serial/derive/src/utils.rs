use proc_macro2::TokenStream;

/// An empty token stream, for optional code sections.
#[inline(always)]
pub(crate) fn empty() -> TokenStream {
    TokenStream::new()
}
