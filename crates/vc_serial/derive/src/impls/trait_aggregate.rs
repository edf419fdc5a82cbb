use proc_macro2::{Literal, TokenStream};
use quote::{ToTokens, quote};
use syn::{ImplGenerics, TypeGenerics};

use crate::derive_data::SerialStruct;
use crate::path::fp::OptionFP;

/// Generate the `Aggregate` impl: one `match` arm per own field and per base.
pub(crate) fn impl_trait_aggregate(
    info: &SerialStruct,
    (impl_generics, ty_generics, where_clause): (&ImplGenerics, &TypeGenerics, &TokenStream),
) -> TokenStream {
    let meta = info.meta();
    let vc_serial_path = meta.vc_serial_path();
    let aggregate_ = crate::path::aggregate_(vc_serial_path);
    let described_ = crate::path::described_(vc_serial_path);
    let type_metadata_ = crate::path::type_metadata_(vc_serial_path);
    let save_ = crate::path::save_(vc_serial_path);
    let load_ = crate::path::load_(vc_serial_path);

    let field_members: Vec<_> = info.own_fields().map(|f| &f.member).collect();
    let field_indices = (0..field_members.len()).map(Literal::usize_unsuffixed);
    let field_indices_mut = field_indices.clone();

    let base_members: Vec<_> = info.base_fields().map(|f| &f.member).collect();
    let base_indices = (0..base_members.len()).map(Literal::usize_unsuffixed);
    let base_indices_mut = base_indices.clone();

    // Bound to a token stream: a unit struct cannot appear inside `#(..)*`.
    let option_ = OptionFP.to_token_stream();
    let ident = meta.ident();

    quote! {
        impl #impl_generics #aggregate_ for #ident #ty_generics #where_clause {
            #[inline]
            fn aggregate_metadata(&self) -> &'static #type_metadata_ {
                <Self as #described_>::metadata()
            }

            fn field_at(&self, index: usize) -> #option_<&dyn #save_> {
                match index {
                    #(#field_indices => #option_::Some(&self.#field_members),)*
                    _ => #option_::None,
                }
            }

            fn field_at_mut(&mut self, index: usize) -> #option_<&mut dyn #load_> {
                match index {
                    #(#field_indices_mut => #option_::Some(&mut self.#field_members),)*
                    _ => #option_::None,
                }
            }

            fn base_at(&self, index: usize) -> #option_<&dyn #aggregate_> {
                match index {
                    #(#base_indices => #option_::Some(&self.#base_members),)*
                    _ => #option_::None,
                }
            }

            fn base_at_mut(&mut self, index: usize) -> #option_<&mut dyn #aggregate_> {
                match index {
                    #(#base_indices_mut => #option_::Some(&mut self.#base_members),)*
                    _ => #option_::None,
                }
            }
        }
    }
}
