use crate::attributes::AdviceAttribute;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::spanned::Spanned;
use syn::{Error, ImplItem, ItemImpl, Result};

const BEFORE: &str = "before";
const AFTER: &str = "after";

fn is_advice_attribute(attr: &syn::Attribute) -> bool {
    attr.path().is_ident(BEFORE) || attr.path().is_ident(AFTER)
}

pub fn expand_aspect(mut item: ItemImpl) -> Result<TokenStream> {
    if item.trait_.is_some() {
        return Err(Error::new(
            item.span(),
            "Aspects must be declared on inherent impl blocks!",
        ));
    }

    if !item.generics.params.is_empty() {
        return Err(Error::new(
            item.generics.span(),
            "Aspects cannot be generic!",
        ));
    }

    let self_ty = item.self_ty.clone();
    let mut advice_functions = vec![];
    let mut descriptors = vec![];

    for impl_item in &item.items {
        let method = if let ImplItem::Fn(method) = impl_item {
            method
        } else {
            continue;
        };

        let mut markers = vec![];
        for attr in method.attrs.iter().filter(|attr| is_advice_attribute(attr)) {
            let target = AdviceAttribute::try_from(attr)?.target;
            if attr.path().is_ident(BEFORE) {
                markers.push(quote!(sprig_di::class::MethodMarker::Before(#target.to_string())));
            } else {
                markers.push(quote!(sprig_di::class::MethodMarker::After(#target.to_string())));
            }
        }

        if markers.is_empty() {
            continue;
        }

        let method_ident = &method.sig.ident;
        let name = method_ident.to_string();
        let advice = format_ident!("__sprig_advice_{}", method_ident);

        advice_functions.push(quote! {
            fn #advice(
                aspect: &(dyn ::std::any::Any + Send + Sync),
                invocation: &sprig_di::proxy::Invocation,
            ) {
                if let ::std::option::Option::Some(aspect) = aspect.downcast_ref::<#self_ty>() {
                    aspect.#method_ident(invocation);
                }
            }
        });

        descriptors.push(quote! {
            sprig_di::class::MethodDescriptor::new(#name, ::std::vec![#(#markers),*], #advice)
        });
    }

    if descriptors.is_empty() {
        return Err(Error::new(
            item.span(),
            "Aspects must declare at least one #[before] or #[after] method!",
        ));
    }

    for impl_item in &mut item.items {
        if let ImplItem::Fn(method) = impl_item {
            method.attrs.retain(|attr| !is_advice_attribute(attr));
        }
    }

    Ok(quote! {
        #item

        const _: () = {
            #(#advice_functions)*

            fn register() -> sprig_di::catalog::internal::AspectDefinition {
                sprig_di::catalog::internal::AspectDefinition {
                    aspect_type: ::std::any::TypeId::of::<#self_ty>(),
                    aspect_name: ::std::any::type_name::<#self_ty>(),
                    methods: ::std::vec![#(#descriptors),*],
                }
            }

            sprig_di::catalog::internal::submit! {
                sprig_di::catalog::internal::AspectRegisterer {
                    register
                }
            };
        };
    })
}
