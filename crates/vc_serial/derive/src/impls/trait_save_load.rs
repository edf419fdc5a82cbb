use proc_macro2::TokenStream;
use quote::quote;
use syn::{ImplGenerics, TypeGenerics};

use crate::derive_data::SerialMeta;
use crate::path::fp::ResultFP;

/// Generate `Save` and `Load`, both delegating to the object traversal.
pub(crate) fn impl_trait_save_load(
    meta: &SerialMeta,
    (impl_generics, ty_generics, where_clause): (&ImplGenerics, &TypeGenerics, &TokenStream),
) -> TokenStream {
    let vc_serial_path = meta.vc_serial_path();
    let save_ = crate::path::save_(vc_serial_path);
    let load_ = crate::path::load_(vc_serial_path);
    let output_archive_ = crate::path::output_archive_(vc_serial_path);
    let input_archive_ = crate::path::input_archive_(vc_serial_path);
    let serial_error_ = crate::path::serial_error_(vc_serial_path);
    let traverse_ = crate::path::traverse_(vc_serial_path);

    let ident = meta.ident();

    quote! {
        impl #impl_generics #save_ for #ident #ty_generics #where_clause {
            #[inline]
            fn save(&self, archive: &mut dyn #output_archive_) -> #ResultFP<(), #serial_error_> {
                #traverse_::save_object(self, archive)
            }
        }

        impl #impl_generics #load_ for #ident #ty_generics #where_clause {
            #[inline]
            fn load(&mut self, archive: &mut dyn #input_archive_) -> #ResultFP<(), #serial_error_> {
                #traverse_::load_object(self, archive)
            }
        }
    }
}
