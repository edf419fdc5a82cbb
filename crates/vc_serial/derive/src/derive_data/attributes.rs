use proc_macro2::Span;
use syn::spanned::Spanned;
use syn::{Attribute, LitStr};

use crate::SERIAL_ATTRIBUTE_NAME;

// -----------------------------------------------------------------------------
// TypeAttributes

/// `#[serial(...)]` on the type.
#[derive(Default)]
pub(crate) struct TypeAttributes {
    /// `#[serial(auto_register)]`
    pub auto_register: Option<Span>,
}

impl TypeAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();

        for attr in attrs.iter().filter(|a| a.path().is_ident(SERIAL_ATTRIBUTE_NAME)) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("auto_register") {
                    if out.auto_register.is_some() {
                        return Err(meta.error("duplicate `auto_register`"));
                    }
                    out.auto_register = Some(meta.path.span());
                    Ok(())
                } else {
                    Err(meta.error("unknown type attribute, expected `auto_register`"))
                }
            })?;
        }

        Ok(out)
    }
}

// -----------------------------------------------------------------------------
// FieldAttributes

/// How a field takes part in serialization.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum FieldRole {
    /// An own field, written under its name.
    #[default]
    Member,
    /// `#[serial(base)]`, flattened before the own fields.
    Base,
    /// `#[serial(skip)]`
    Skip,
}

/// `#[serial(...)]` on a field.
#[derive(Default)]
pub(crate) struct FieldAttributes {
    pub role: FieldRole,
    /// `#[serial(rename = "...")]`
    pub rename: Option<LitStr>,
}

impl FieldAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();

        for attr in attrs.iter().filter(|a| a.path().is_ident(SERIAL_ATTRIBUTE_NAME)) {
            attr.parse_nested_meta(|meta| {
                let role = if meta.path.is_ident("base") {
                    FieldRole::Base
                } else if meta.path.is_ident("skip") {
                    FieldRole::Skip
                } else if meta.path.is_ident("rename") {
                    if out.rename.is_some() {
                        return Err(meta.error("duplicate `rename`"));
                    }
                    let lit: LitStr = meta.value()?.parse()?;
                    if lit.value().is_empty() {
                        return Err(syn::Error::new(lit.span(), "field name cannot be empty"));
                    }
                    out.rename = Some(lit);
                    return Ok(());
                } else {
                    return Err(meta.error("unknown field attribute, expected `base`, `skip` or `rename`"));
                };

                if out.role != FieldRole::Member {
                    return Err(meta.error("a field can be marked only once as `base` or `skip`"));
                }
                out.role = role;
                Ok(())
            })?;
        }

        if let Some(rename) = &out.rename
            && out.role != FieldRole::Member
        {
            return Err(syn::Error::new(
                rename.span(),
                "`rename` has no effect on `base` or `skip` fields",
            ));
        }

        Ok(out)
    }
}
