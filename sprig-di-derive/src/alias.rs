use proc_macro2::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{Error, ItemImpl, Result, Type};

pub fn register_component_alias(item: &ItemImpl) -> Result<TokenStream> {
    let trait_type = item
        .trait_
        .as_ref()
        .map(|(_, path, ..)| path)
        .ok_or_else(|| Error::new(item.span(), "Missing trait identifier!"))?;

    if !item.generics.params.is_empty() {
        return Err(Error::new(
            item.generics.span(),
            "Component aliases cannot be generic!",
        ));
    }

    let target_type = if let Type::Path(path) = item.self_ty.as_ref() {
        &path.path
    } else {
        return Err(Error::new(
            item.self_ty.span(),
            "Registering traits is only available for Components!",
        ));
    };

    Ok(quote! {
        #item

        #[automatically_derived]
        impl sprig_di::component::ComponentDowncast<#target_type> for dyn #trait_type + Send + Sync {
            fn downcast(
                source: sprig_di::instance_provider::ComponentInstanceAnyPtr,
            ) -> ::std::result::Result<sprig_di::instance_provider::ComponentInstancePtr<Self>, sprig_di::instance_provider::ComponentInstanceAnyPtr> {
                source.downcast::<#target_type>().map(|p| p as sprig_di::instance_provider::ComponentInstancePtr<Self>)
            }
        }

        const _: () = {
            fn cast(
                instance: sprig_di::instance_provider::ComponentInstanceAnyPtr,
            ) -> ::std::result::Result<::std::boxed::Box<dyn ::std::any::Any>, sprig_di::instance_provider::ComponentInstanceAnyPtr> {
                <dyn #trait_type + Send + Sync as sprig_di::component::ComponentDowncast<#target_type>>::downcast(instance)
                    .map(|p| ::std::boxed::Box::new(p) as ::std::boxed::Box<dyn ::std::any::Any>)
            }

            fn proxy(
                instance: sprig_di::instance_provider::ComponentInstanceAnyPtr,
                interceptor: sprig_di::proxy::InterceptorPtr,
            ) -> ::std::result::Result<::std::boxed::Box<dyn ::std::any::Any>, sprig_di::instance_provider::ComponentInstanceAnyPtr> {
                <dyn #trait_type + Send + Sync as sprig_di::component::ComponentDowncast<#target_type>>::downcast(instance)
                    .map(|target| {
                        let proxy = sprig_di::proxy::Proxy::<dyn #trait_type + Send + Sync>::new(target, interceptor);
                        ::std::boxed::Box::new(
                            sprig_di::instance_provider::ComponentInstancePtr::new(proxy)
                                as sprig_di::instance_provider::ComponentInstancePtr<dyn #trait_type + Send + Sync>,
                        ) as ::std::boxed::Box<dyn ::std::any::Any>
                    })
            }

            fn register() -> sprig_di::catalog::internal::CapabilityDefinition {
                sprig_di::catalog::internal::CapabilityDefinition {
                    target_type: ::std::any::TypeId::of::<#target_type>(),
                    target_name: ::std::any::type_name::<#target_type>(),
                    capability: sprig_di::class::CapabilityDescriptor::of::<dyn #trait_type + Send + Sync>(
                        cast,
                        ::std::option::Option::Some(proxy),
                    ),
                }
            }

            sprig_di::catalog::internal::submit! {
                sprig_di::catalog::internal::CapabilityRegisterer {
                    register
                }
            };
        };
    })
}
