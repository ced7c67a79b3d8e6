use crate::attributes::{ComponentAttributes, DefaultDefinition, FieldAttributes};
use itertools::Itertools;
use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};
use syn::spanned::Spanned;
use syn::{
    Attribute, Data, DataStruct, DeriveInput, Error, Field, Fields, Index, Member, Result,
};

const COMPONENT: &str = "component";

struct FieldInfo {
    construction: TokenStream,
    injection: Option<TokenStream>,
}

fn extract_field_attributes(field: &Field) -> Result<Option<FieldAttributes>> {
    field
        .attrs
        .iter()
        .filter(|attr| attr.path().is_ident(COMPONENT))
        .map(FieldAttributes::try_from)
        .next()
        .transpose()
}

fn generate_injection(
    ident: &Ident,
    field: &Field,
    member: Member,
    name: &str,
    index: usize,
) -> TokenStream {
    let ty = &field.ty;
    let inject = format_ident!("__sprig_inject_{}", index);

    quote! {
        {
            fn #inject(
                owner: &sprig_di::instance_provider::ComponentInstanceAnyPtr,
                value: ::std::boxed::Box<dyn ::std::any::Any>,
            ) -> ::std::result::Result<(), sprig_di::autowired::AssignmentError> {
                let owner = (**owner)
                    .downcast_ref::<#ident>()
                    .ok_or(sprig_di::autowired::AssignmentError::IncompatibleOwner)?;
                sprig_di::autowired::InjectionPoint::assign(&owner.#member, value)
            }

            sprig_di::class::FieldDescriptor::autowired::<#ty>(#name, #inject)
        }
    }
}

fn generate_field(ident: &Ident, field: &Field, index: usize) -> Result<FieldInfo> {
    let (member, name) = match &field.ident {
        Some(field_ident) => (Member::Named(field_ident.clone()), field_ident.to_string()),
        None => (Member::Unnamed(Index::from(index)), index.to_string()),
    };

    let attributes = extract_field_attributes(field)?;
    let construction = match attributes.as_ref().and_then(|attr| attr.default.as_ref()) {
        Some(DefaultDefinition::Expr(path)) => quote!(#path()),
        _ => quote!(::std::default::Default::default()),
    };

    let injection = attributes
        .filter(|attributes| attributes.autowired)
        .map(|_| generate_injection(ident, field, member, &name, index));

    Ok(FieldInfo {
        construction,
        injection,
    })
}

fn extract_component_attributes(attributes: &[Attribute]) -> Result<Option<ComponentAttributes>> {
    attributes
        .iter()
        .filter(|attribute| attribute.path().is_ident(COMPONENT))
        .map(ComponentAttributes::try_from)
        .next()
        .transpose()
}

pub fn expand_component(input: &DeriveInput) -> Result<TokenStream> {
    let fields = if let Data::Struct(DataStruct { fields, .. }) = &input.data {
        fields
    } else {
        return Err(Error::new(
            input.span(),
            "Can only derive Component on structs!",
        ));
    };

    if !input.generics.params.is_empty() {
        return Err(Error::new(
            input.generics.span(),
            "Components cannot be generic!",
        ));
    }

    let ident = &input.ident;
    let infos: Vec<_> = fields
        .iter()
        .enumerate()
        .map(|(index, field)| generate_field(ident, field, index))
        .try_collect()?;

    let attributes = extract_component_attributes(&input.attrs)?;
    let (class, constructor) = attributes
        .map(|attributes| (attributes.class, attributes.constructor))
        .unwrap_or_default();

    let creation = if let Some(constructor) = constructor {
        quote!(#constructor())
    } else {
        let constructions = infos.iter().map(|info| &info.construction);
        let generation = match fields {
            Fields::Named(named) => {
                let idents = named.named.iter().filter_map(|field| field.ident.as_ref());
                quote!(Self { #(#idents: #constructions),* })
            }
            Fields::Unnamed(_) => quote!(Self(#(#constructions),*)),
            Fields::Unit => quote!(Self),
        };

        quote!(::std::result::Result::Ok(#generation))
    };

    let class_override = class.map(|class| quote!(.with_class_id(#class)));
    let injections = infos.iter().filter_map(|info| info.injection.as_ref());

    Ok(quote! {
        #[automatically_derived]
        impl sprig_di::component::Injectable for #ident {}

        #[automatically_derived]
        impl sprig_di::component::ComponentDowncast<#ident> for #ident {
            fn downcast(
                source: sprig_di::instance_provider::ComponentInstanceAnyPtr,
            ) -> ::std::result::Result<sprig_di::instance_provider::ComponentInstancePtr<Self>, sprig_di::instance_provider::ComponentInstanceAnyPtr> {
                source.downcast()
            }
        }

        #[automatically_derived]
        impl sprig_di::component::Component for #ident {
            fn create() -> ::std::result::Result<Self, sprig_di::instance_provider::ErrorPtr> {
                #creation
            }
        }

        const _: () = {
            fn register() -> sprig_di::class::ClassDescriptor {
                sprig_di::class::ClassDescriptor::of::<#ident>()
                    #class_override
                    #(.with_field(#injections))*
            }

            sprig_di::catalog::internal::submit! {
                sprig_di::catalog::internal::ComponentRegisterer {
                    register
                }
            };
        };
    })
}
