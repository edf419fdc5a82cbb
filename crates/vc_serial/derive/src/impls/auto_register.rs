use proc_macro2::TokenStream;

use crate::derive_data::SerialMeta;

/// Generate the `inventory` submission for `#[serial(auto_register)]`.
#[cfg(feature = "auto_register")]
pub(crate) fn get_auto_register_impl(meta: &SerialMeta) -> syn::Result<TokenStream> {
    use quote::quote_spanned;

    let Some(span) = meta.attrs().auto_register else {
        return Ok(crate::utils::empty());
    };

    if meta.impl_with_generic() {
        return Err(syn::Error::new(
            span,
            "`auto_register` needs a concrete type, register generic instantiations by hand",
        ));
    }

    let auto_register_ = crate::path::auto_register_(meta.vc_serial_path());
    let ident = meta.ident();

    Ok(quote_spanned! { span =>
        #auto_register_::inventory::submit!{
            #auto_register_::__AutoRegisterFunc(
                <#ident as #auto_register_::__RegisterType>::__register
            )
        }
    })
}

/// Generate the `inventory` submission for `#[serial(auto_register)]`.
#[cfg(not(feature = "auto_register"))]
pub(crate) fn get_auto_register_impl(_: &SerialMeta) -> syn::Result<TokenStream> {
    Ok(crate::utils::empty())
}
