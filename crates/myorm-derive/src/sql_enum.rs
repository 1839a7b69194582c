//! SqlEnum derive macro implementation.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Expr, ExprLit, Fields, Lit, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let name_text = name.to_string();

    let variants = match &input.data {
        Data::Enum(data) => &data.variants,
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "SqlEnum can only be derived for enums",
            ));
        }
    };

    let mut ordinals = Vec::new();
    let mut next_ordinal: i32 = 0;

    for variant in variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "SqlEnum variants cannot carry data",
            ));
        }

        if let Some((_, expr)) = &variant.discriminant {
            next_ordinal = discriminant_value(expr)?;
        }

        ordinals.push((variant.ident.clone(), next_ordinal));
        next_ordinal += 1;
    }

    let to_arms = ordinals.iter().map(|(variant, ordinal)| {
        quote! { Self::#variant => #ordinal }
    });
    let from_arms = ordinals.iter().map(|(variant, ordinal)| {
        quote! { #ordinal => Ok(Self::#variant) }
    });

    Ok(quote! {
        impl myorm::SqlEnum for #name {
            fn to_index(&self) -> i32 {
                match self {
                    #(#to_arms),*
                }
            }

            fn from_index(value: i32) -> myorm::OrmResult<Self> {
                match value {
                    #(#from_arms,)*
                    other => Err(myorm::OrmError::decode(
                        #name_text,
                        format!("{other} is not a valid ordinal"),
                    )),
                }
            }
        }
    })
}

fn discriminant_value(expr: &Expr) -> Result<i32> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Int(lit), ..
        }) => lit.base10_parse(),
        other => Err(syn::Error::new_spanned(
            other,
            "SqlEnum discriminants must be integer literals",
        )),
    }
}
