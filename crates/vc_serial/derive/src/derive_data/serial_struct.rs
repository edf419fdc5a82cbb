use proc_macro2::Span;
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Field, Fields, Index, Member, Type};

use super::{FieldAttributes, FieldRole, MAX_FIELDS, MAX_IDENTIFIER_LEN, SerialMeta, TypeAttributes};

/// One field of the deriving struct.
pub(crate) struct StructField<'a> {
    pub data: &'a Field,
    /// `self.#member`
    pub member: Member,
    /// The archive name, only meaningful for [`FieldRole::Member`].
    pub name: String,
    pub attrs: FieldAttributes,
}

impl StructField<'_> {
    #[inline]
    pub fn ty(&self) -> &Type {
        &self.data.ty
    }
}

/// A validated struct ready for code generation.
pub(crate) struct SerialStruct<'a> {
    meta: SerialMeta<'a>,
    fields: Vec<StructField<'a>>,
}

impl<'a> SerialStruct<'a> {
    pub fn from_input(ast: &'a DeriveInput) -> syn::Result<Self> {
        let Data::Struct(data) = &ast.data else {
            return Err(syn::Error::new(
                ast.ident.span(),
                "`Serial` can only be derived for structs",
            ));
        };

        if matches!(data.fields, Fields::Unit) {
            return Err(syn::Error::new(
                ast.ident.span(),
                "`Serial` cannot be derived for a unit struct, it has nothing to serialize",
            ));
        }

        if let Some(lifetime) = ast.generics.lifetimes().next() {
            return Err(syn::Error::new(
                lifetime.span(),
                "`Serial` types must be `'static`, lifetime parameters are not supported",
            ));
        }

        let attrs = TypeAttributes::parse_attrs(&ast.attrs)?;
        let meta = SerialMeta::new(attrs, &ast.ident, &ast.generics);

        check_ident_len(&meta.type_ident(), ast.ident.span())?;

        let fields = data
            .fields
            .iter()
            .enumerate()
            .map(|(index, field)| parse_field(index, field))
            .collect::<syn::Result<Vec<_>>>()?;

        let info = Self { meta, fields };
        info.validate_shape()?;
        Ok(info)
    }

    fn validate_shape(&self) -> syn::Result<()> {
        let ident = self.meta.ident();
        let own = self.own_fields().count();
        let bases = self.base_fields().count();

        if own >= MAX_FIELDS {
            return Err(syn::Error::new(
                ident.span(),
                format!(
                    "`{ident}` has {own} serialized fields, at most {} are supported",
                    MAX_FIELDS - 1
                ),
            ));
        }

        if own == 0 && bases == 0 {
            return Err(syn::Error::new(
                ident.span(),
                format!("`{ident}` has neither serialized fields nor bases"),
            ));
        }

        let mut names: Vec<&str> = Vec::with_capacity(own);
        for field in self.own_fields() {
            if names.contains(&field.name.as_str()) {
                return Err(syn::Error::new(
                    field.data.span(),
                    format!("duplicate serialized field name `{}`", field.name),
                ));
            }
            names.push(&field.name);
        }

        Ok(())
    }

    #[inline]
    pub fn meta(&self) -> &SerialMeta<'a> {
        &self.meta
    }

    /// Own fields in declaration order.
    pub fn own_fields(&self) -> impl Iterator<Item = &StructField<'a>> {
        self.fields.iter().filter(|f| f.attrs.role == FieldRole::Member)
    }

    /// Base fields in declaration order.
    pub fn base_fields(&self) -> impl Iterator<Item = &StructField<'a>> {
        self.fields.iter().filter(|f| f.attrs.role == FieldRole::Base)
    }
}

fn parse_field(index: usize, field: &Field) -> syn::Result<StructField<'_>> {
    let attrs = FieldAttributes::parse_attrs(&field.attrs)?;

    let (member, default_name) = match &field.ident {
        Some(ident) => (Member::Named(ident.clone()), ident.unraw().to_string()),
        None => (
            Member::Unnamed(Index {
                index: index as u32,
                span: field.span(),
            }),
            format!("value{index}"),
        ),
    };

    let name = match &attrs.rename {
        Some(lit) => lit.value(),
        None => default_name,
    };

    if attrs.role == FieldRole::Member {
        check_ident_len(&name, field.span())?;
    }

    Ok(StructField {
        data: field,
        member,
        name,
        attrs,
    })
}

fn check_ident_len(ident: &str, span: Span) -> syn::Result<()> {
    if ident.len() >= MAX_IDENTIFIER_LEN {
        return Err(syn::Error::new(
            span,
            format!(
                "identifier is {} bytes long, at most {} are supported",
                ident.len(),
                MAX_IDENTIFIER_LEN - 1
            ),
        ));
    }
    Ok(())
}
