use proc_macro::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::punctuated::Punctuated;
use syn::{Attribute, Data, DeriveInput, Field, Fields, Token, Type, parse_macro_input};

/// Derive `envbind::EnvRecord`, listing every named field for binding
///
/// `Option<T>` fields are optional and converted with `T`'s parser. Fields
/// marked `#[env(skip)]` are never bound and keep their `Default` value.
#[proc_macro_derive(EnvRecord, attributes(env))]
pub fn derive_env_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match generate_env_record(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Derive `envbind::DefaultSource`, exposing a clone of each named field by name
#[proc_macro_derive(DefaultSource, attributes(env))]
pub fn derive_default_source(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match generate_default_source(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn generate_env_record(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut descriptors = Vec::new();
    let mut assign_arms = Vec::new();

    for field in named_fields(input, "EnvRecord")? {
        if is_skipped(&field.attrs)? {
            continue;
        }

        let Some(field_ident) = field.ident.as_ref() else {
            continue;
        };
        let field_name = field_ident.unraw().to_string();

        // Optional fields resolve their parser by the inner type
        let (is_option, actual_type) = extract_option_type(&field.ty);
        let type_name = type_identifier(actual_type);

        if is_option {
            descriptors.push(quote! {
                ::envbind::FieldDescriptor::optional(#field_name, #type_name)
            });
            assign_arms.push(quote! {
                #field_name => ::envbind::field::assign_optional(&mut self.#field_ident, value)
            });
        } else {
            descriptors.push(quote! {
                ::envbind::FieldDescriptor::required(#field_name, #type_name)
            });
            assign_arms.push(quote! {
                #field_name => ::envbind::field::assign_required(&mut self.#field_ident, value)
            });
        }
    }

    Ok(quote! {
        impl #impl_generics ::envbind::EnvRecord for #struct_name #ty_generics #where_clause {
            fn fields() -> &'static [::envbind::FieldDescriptor] {
                const FIELDS: &[::envbind::FieldDescriptor] = &[#(#descriptors),*];
                FIELDS
            }

            fn assign(
                &mut self,
                field: &str,
                value: ::envbind::BoxedValue,
            ) -> ::core::result::Result<(), ::envbind::BoxedValue> {
                match field {
                    #(#assign_arms,)*
                    _ => ::core::result::Result::Err(value),
                }
            }
        }
    })
}

fn generate_default_source(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut value_arms = Vec::new();

    for field in named_fields(input, "DefaultSource")? {
        if is_skipped(&field.attrs)? {
            continue;
        }

        let Some(field_ident) = field.ident.as_ref() else {
            continue;
        };
        let field_name = field_ident.unraw().to_string();

        value_arms.push(quote! {
            #field_name => ::core::option::Option::Some(
                ::std::boxed::Box::new(::core::clone::Clone::clone(&self.#field_ident))
                    as ::envbind::BoxedValue
            )
        });
    }

    Ok(quote! {
        impl #impl_generics ::envbind::DefaultSource for #struct_name #ty_generics #where_clause {
            fn default_value(
                &self,
                field: &str,
            ) -> ::core::option::Option<::envbind::BoxedValue> {
                match field {
                    #(#value_arms,)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    })
}

fn named_fields<'a>(
    input: &'a DeriveInput,
    derive: &str,
) -> syn::Result<&'a Punctuated<Field, Token![,]>> {
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => Ok(&fields.named),
            _ => Err(syn::Error::new_spanned(
                input,
                format!("{derive} only supports structs with named fields"),
            )),
        },
        _ => Err(syn::Error::new_spanned(
            input,
            format!("{derive} only supports structs"),
        )),
    }
}

/// Check for #[env(skip)]
fn is_skipped(attrs: &[Attribute]) -> syn::Result<bool> {
    let mut skip = false;

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("env")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else {
                Err(meta.error("unsupported env attribute, expected `skip`"))
            }
        })?;
    }

    Ok(skip)
}

/// Name used to look up a parser: the last path segment, without generics
fn type_identifier(ty: &Type) -> String {
    match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.to_string())
            .unwrap_or_default(),
        Type::Group(group) => type_identifier(&group.elem),
        Type::Paren(paren) => type_identifier(&paren.elem),
        other => quote!(#other).to_string().replace(' ', ""),
    }
}

/// Extract the inner type from Option<T>, returns (is_option, inner_type)
fn extract_option_type(ty: &Type) -> (bool, &Type) {
    // Types passed through macro_rules! fragments arrive wrapped in a group
    match ty {
        Type::Group(group) => return extract_option_type(&group.elem),
        Type::Paren(paren) => return extract_option_type(&paren.elem),
        _ => {}
    }

    if let Type::Path(type_path) = ty
        && let Some(segment) = type_path.path.segments.last()
        && segment.ident == "Option"
        && let syn::PathArguments::AngleBracketed(args) = &segment.arguments
        && let Some(syn::GenericArgument::Type(inner_ty)) = args.args.first()
    {
        return (true, inner_ty);
    }
    (false, ty)
}
