//! Model derive macro implementation.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Result, Type};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let table = get_table_name(&input)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Model can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Model can only be derived for structs",
            ));
        }
    };

    let mut specs = Vec::new();
    let mut value_exprs = Vec::new();
    let mut extract_fields = Vec::new();

    for field in fields {
        let column = ColumnModel::from_field(field)?;
        specs.push(column.field_spec());
        value_exprs.push(column.value_expr());
        extract_fields.push(column.extract_field());
    }

    Ok(quote! {
        impl myorm::Model for #name {
            const TABLE: &'static str = #table;

            fn fields() -> &'static [myorm::FieldSpec] {
                static FIELDS: &[myorm::FieldSpec] = &[#(#specs),*];
                FIELDS
            }

            fn values(&self) -> myorm::OrmResult<Vec<myorm::ScalarValue>> {
                Ok(vec![#(#value_exprs),*])
            }

            fn from_values(values: Vec<myorm::ScalarValue>) -> myorm::OrmResult<Self> {
                let mut values = values.into_iter();
                let mut next = |column: &str| {
                    values
                        .next()
                        .ok_or_else(|| myorm::OrmError::decode(column, "missing field value"))
                };
                Ok(Self {
                    #(#extract_fields),*
                })
            }
        }
    })
}

/// How a field stores its value.
enum Storage {
    Scalar,
    Enumeration,
    Blob(Type),
}

struct ColumnModel {
    ident: syn::Ident,
    column: String,
    field_type: syn::Ident,
    nullable: bool,
    storage: Storage,
    attr: FieldAttr,
}

impl ColumnModel {
    fn from_field(field: &syn::Field) -> Result<Self> {
        let ident = field
            .ident
            .clone()
            .expect("named fields checked by caller");
        let attr = FieldAttr::parse_all(field)?;
        let column = attr.column.clone().unwrap_or_else(|| ident.to_string());

        let (inner, nullable) = unwrap_option(&field.ty);

        let (field_type, storage) = if attr.enumeration {
            ("Enum", Storage::Enumeration)
        } else if attr.blob || attr.codec.is_some() {
            let codec = attr
                .codec
                .clone()
                .unwrap_or_else(|| syn::parse_quote!(myorm::JsonCodec));
            ("Blob", Storage::Blob(codec))
        } else {
            (scalar_field_type(field, inner)?, Storage::Scalar)
        };

        let field_type = syn::Ident::new(field_type, proc_macro2::Span::call_site());

        Ok(Self {
            ident,
            column,
            field_type,
            nullable,
            storage,
            attr,
        })
    }

    fn field_spec(&self) -> TokenStream {
        let column = &self.column;
        let field_type = &self.field_type;
        let mut spec = quote! {
            myorm::FieldSpec::new(#column, myorm::FieldType::#field_type)
        };

        if self.nullable {
            spec = quote! { #spec.nullable() };
        }
        if self.attr.not_null {
            spec = quote! { #spec.not_null() };
        }
        if self.attr.primary_key {
            spec = quote! { #spec.primary_key() };
        }
        if self.attr.auto_increment {
            spec = quote! { #spec.auto_increment() };
        }
        if let Some(size) = self.attr.fixed_size {
            spec = quote! { #spec.fixed_size(#size) };
        }
        if let Some(size) = self.attr.max_size {
            spec = quote! { #spec.max_size(#size) };
        }
        if let Some(digits) = self.attr.time_fraction {
            spec = quote! { #spec.time_fraction(#digits) };
        }

        spec
    }

    fn value_expr(&self) -> TokenStream {
        let ident = &self.ident;
        match (&self.storage, self.nullable) {
            (Storage::Scalar, _) => quote! {
                myorm::ScalarValue::from(self.#ident.clone())
            },
            (Storage::Enumeration, false) => quote! {
                myorm::model::encode_enum(&self.#ident)
            },
            (Storage::Enumeration, true) => quote! {
                myorm::model::encode_enum_opt(&self.#ident)
            },
            (Storage::Blob(codec), false) => quote! {
                myorm::model::encode_blob::<#codec, _>(&self.#ident)?
            },
            (Storage::Blob(codec), true) => quote! {
                myorm::model::encode_blob_opt::<#codec, _>(&self.#ident)?
            },
        }
    }

    fn extract_field(&self) -> TokenStream {
        let ident = &self.ident;
        let column = &self.column;
        match (&self.storage, self.nullable) {
            (Storage::Scalar, _) => quote! {
                #ident: myorm::FromScalarValue::from_scalar(next(#column)?, #column)?
            },
            (Storage::Enumeration, false) => quote! {
                #ident: myorm::model::decode_enum(next(#column)?, #column)?
            },
            (Storage::Enumeration, true) => quote! {
                #ident: myorm::model::decode_enum_opt(next(#column)?, #column)?
            },
            (Storage::Blob(codec), false) => quote! {
                #ident: myorm::model::decode_blob::<#codec, _>(next(#column)?, #column)?
            },
            (Storage::Blob(codec), true) => quote! {
                #ident: myorm::model::decode_blob_opt::<#codec, _>(next(#column)?, #column)?
            },
        }
    }
}

/// Peel `Option<T>` off a field type.
fn unwrap_option(ty: &Type) -> (&Type, bool) {
    if let Type::Path(path) = ty {
        if let Some(segment) = path.path.segments.last() {
            if segment.ident == "Option" {
                if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                    if let Some(syn::GenericArgument::Type(inner)) = args.args.first() {
                        return (inner, true);
                    }
                }
            }
        }
    }
    (ty, false)
}

/// Map a scalar field type to its `FieldType` tag by name.
fn scalar_field_type(field: &syn::Field, ty: &Type) -> Result<&'static str> {
    let last_segment = match ty {
        Type::Path(path) => path.path.segments.last().map(|s| s.ident.to_string()),
        _ => None,
    };

    match last_segment.as_deref() {
        Some("String") => Ok("Text"),
        Some("Uuid") => Ok("Uuid"),
        Some("i32") => Ok("Int"),
        Some("u32") => Ok("UnsignedInt"),
        Some("i64") => Ok("Long"),
        Some("u64") => Ok("UnsignedLong"),
        Some("f64") => Ok("Double"),
        Some("Decimal") => Ok("Decimal"),
        Some("bool") => Ok("Bool"),
        Some("DateTime") => Ok("DateTime"),
        Some("NaiveDate") => Ok("Date"),
        Some("NaiveTime") => Ok("Time"),
        Some("TimeDelta") | Some("Duration") => Ok("Span"),
        _ => Err(syn::Error::new_spanned(
            field,
            "unsupported column type; mark payload fields with #[orm(blob)] or #[orm(enumeration)]",
        )),
    }
}

/// Parsed field-level `#[orm(...)]` attributes.
#[derive(Default)]
struct FieldAttr {
    column: Option<String>,
    primary_key: bool,
    not_null: bool,
    auto_increment: bool,
    enumeration: bool,
    blob: bool,
    fixed_size: Option<u32>,
    max_size: Option<u32>,
    time_fraction: Option<u8>,
    codec: Option<Type>,
}

impl FieldAttr {
    fn parse_all(field: &syn::Field) -> Result<Self> {
        let mut parsed = Self::default();
        for attr in &field.attrs {
            if attr.path().is_ident("orm") {
                let update: FieldAttr = attr.parse_args()?;
                parsed.merge(update);
            }
        }
        Ok(parsed)
    }

    fn merge(&mut self, other: FieldAttr) {
        if other.column.is_some() {
            self.column = other.column;
        }
        self.primary_key |= other.primary_key;
        self.not_null |= other.not_null;
        self.auto_increment |= other.auto_increment;
        self.enumeration |= other.enumeration;
        self.blob |= other.blob;
        if other.fixed_size.is_some() {
            self.fixed_size = other.fixed_size;
        }
        if other.max_size.is_some() {
            self.max_size = other.max_size;
        }
        if other.time_fraction.is_some() {
            self.time_fraction = other.time_fraction;
        }
        if other.codec.is_some() {
            self.codec = other.codec;
        }
    }
}

impl syn::parse::Parse for FieldAttr {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let mut parsed = Self::default();

        // Comma-separated flags and key = value pairs.
        loop {
            if input.is_empty() {
                break;
            }

            let ident: syn::Ident = input.parse()?;
            if ident == "primary_key" {
                parsed.primary_key = true;
            } else if ident == "not_null" {
                parsed.not_null = true;
            } else if ident == "auto_increment" {
                parsed.auto_increment = true;
            } else if ident == "enumeration" {
                parsed.enumeration = true;
            } else if ident == "blob" {
                parsed.blob = true;
            } else if ident == "column" {
                let _: syn::Token![=] = input.parse()?;
                let value: syn::LitStr = input.parse()?;
                parsed.column = Some(value.value());
            } else if ident == "fixed_size" {
                let _: syn::Token![=] = input.parse()?;
                let value: syn::LitInt = input.parse()?;
                parsed.fixed_size = Some(value.base10_parse()?);
            } else if ident == "max_size" {
                let _: syn::Token![=] = input.parse()?;
                let value: syn::LitInt = input.parse()?;
                parsed.max_size = Some(value.base10_parse()?);
            } else if ident == "time_fraction" {
                let _: syn::Token![=] = input.parse()?;
                let value: syn::LitInt = input.parse()?;
                parsed.time_fraction = Some(value.base10_parse()?);
            } else if ident == "codec" {
                let _: syn::Token![=] = input.parse()?;
                parsed.codec = Some(input.parse()?);
            } else {
                return Err(syn::Error::new_spanned(
                    &ident,
                    format!("unknown orm attribute '{ident}'"),
                ));
            }

            if input.peek(syn::Token![,]) {
                let _: syn::Token![,] = input.parse()?;
            } else {
                break;
            }
        }

        Ok(parsed)
    }
}

/// Extract the table name from the struct-level `#[orm(table = "...")]`.
fn get_table_name(input: &DeriveInput) -> Result<String> {
    for attr in &input.attrs {
        if attr.path().is_ident("orm") {
            if let Ok(nested) = attr.parse_args::<syn::MetaNameValue>() {
                if nested.path.is_ident("table") {
                    if let syn::Expr::Lit(syn::ExprLit {
                        lit: syn::Lit::Str(lit),
                        ..
                    }) = &nested.value
                    {
                        return Ok(lit.value());
                    }
                }
            }
        }
    }
    Err(syn::Error::new_spanned(
        input,
        "Model requires #[orm(table = \"table_name\")] attribute",
    ))
}
