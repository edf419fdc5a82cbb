use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::{Generics, Ident, ImplGenerics, Path, Type, TypeGenerics};

use super::TypeAttributes;

/// Type-level information shared by every generated impl.
pub(crate) struct SerialMeta<'a> {
    vc_serial_path: Path,
    attrs: TypeAttributes,
    ident: &'a Ident,
    generics: &'a Generics,
}

impl core::fmt::Debug for SerialMeta<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SerialMeta")
            .field("vc_serial_path", &self.vc_serial_path.to_token_stream())
            .field("ident", &self.ident)
            .finish()
    }
}

impl<'a> SerialMeta<'a> {
    #[inline]
    pub fn new(attrs: TypeAttributes, ident: &'a Ident, generics: &'a Generics) -> Self {
        Self {
            vc_serial_path: crate::path::vc_serial(),
            attrs,
            ident,
            generics,
        }
    }

    #[inline]
    pub fn vc_serial_path(&self) -> &Path {
        &self.vc_serial_path
    }

    #[inline]
    pub fn attrs(&self) -> &TypeAttributes {
        &self.attrs
    }

    #[inline]
    pub fn ident(&self) -> &'a Ident {
        self.ident
    }

    /// The identifier as written in archives, without a raw prefix.
    #[inline]
    pub fn type_ident(&self) -> String {
        use syn::ext::IdentExt;
        self.ident.unraw().to_string()
    }

    #[inline]
    pub fn impl_with_generic(&self) -> bool {
        !self.generics.params.is_empty()
    }

    /// Splits the generics for an impl header.
    ///
    /// For generic types the where clause also requires every type parameter
    /// to be `'static`, every own field type to implement `Save + Load` and
    /// every base type to implement `Described + Aggregate`.
    pub fn split_generics<'b>(
        &'b self,
        field_types: impl Iterator<Item = &'b Type>,
        base_types: impl Iterator<Item = &'b Type>,
    ) -> (ImplGenerics<'b>, TypeGenerics<'b>, TokenStream) {
        let (impl_generics, ty_generics, where_clause) = self.generics.split_for_impl();

        if !self.impl_with_generic() {
            return (impl_generics, ty_generics, where_clause.to_token_stream());
        }

        let vc_serial_path = &self.vc_serial_path;
        let save_ = crate::path::save_(vc_serial_path);
        let load_ = crate::path::load_(vc_serial_path);
        let described_ = crate::path::described_(vc_serial_path);
        let aggregate_ = crate::path::aggregate_(vc_serial_path);

        let mut predicates: Vec<TokenStream> = where_clause
            .map(|clause| clause.predicates.iter().map(ToTokens::to_token_stream).collect())
            .unwrap_or_default();

        predicates.extend(
            self.generics
                .type_params()
                .map(|param| {
                    let ident = &param.ident;
                    quote!(#ident: 'static)
                }),
        );

        let mut seen: Vec<&Type> = Vec::new();
        for ty in field_types {
            if !seen.contains(&ty) {
                seen.push(ty);
                predicates.push(quote!(#ty: #save_ + #load_));
            }
        }
        for ty in base_types {
            predicates.push(quote!(#ty: #described_ + #aggregate_));
        }

        (impl_generics, ty_generics, quote!(where #(#predicates,)*))
    }
}
