use proc_macro2::TokenStream;
use quote::quote;
use syn::{ImplGenerics, TypeGenerics};

use crate::derive_data::SerialStruct;

/// Generate the `Described` impl.
///
/// The metadata lives in a `MetadataCell` for plain types and in a
/// `GenericMetadataCell` keyed by `Self` for generic ones.
pub(crate) fn impl_trait_described(
    info: &SerialStruct,
    (impl_generics, ty_generics, where_clause): (&ImplGenerics, &TypeGenerics, &TokenStream),
) -> TokenStream {
    let meta = info.meta();
    let vc_serial_path = meta.vc_serial_path();
    let described_ = crate::path::described_(vc_serial_path);
    let type_metadata_ = crate::path::type_metadata_(vc_serial_path);
    let base_info_ = crate::path::base_info_(vc_serial_path);

    let type_ident = meta.type_ident();
    let field_names = info.own_fields().map(|f| f.name.as_str());
    let base_types = info.base_fields().map(|f| f.ty());

    let build_tokens = quote! {
        #type_metadata_::new::<Self>(
            #type_ident,
            &[#(#field_names),*],
            &[#(#base_info_::of::<#base_types>()),*],
        )
    };

    let cell_tokens = if meta.impl_with_generic() {
        let cell_ = crate::path::generic_metadata_cell_(vc_serial_path);
        quote! {
            static CELL: #cell_ = #cell_::new();
            CELL.get_or_insert::<Self>(|| #build_tokens)
        }
    } else {
        let cell_ = crate::path::metadata_cell_(vc_serial_path);
        quote! {
            static CELL: #cell_ = #cell_::new();
            CELL.get_or_init(|| #build_tokens)
        }
    };

    let ident = meta.ident();

    quote! {
        impl #impl_generics #described_ for #ident #ty_generics #where_clause {
            fn metadata() -> &'static #type_metadata_ {
                #cell_tokens
            }
        }
    }
}
