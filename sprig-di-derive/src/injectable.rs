use itertools::Itertools;
use proc_macro2::{Ident, TokenStream};
use quote::quote;
use syn::spanned::Spanned;
use syn::{Error, FnArg, ItemTrait, Pat, Result, Signature, TraitItem};

fn extract_arguments(signature: &Signature) -> Result<Vec<&Ident>> {
    match signature.receiver() {
        Some(receiver)
            if receiver.reference.is_some()
                && receiver.mutability.is_none()
                && receiver.colon_token.is_none() => {}
        _ => {
            return Err(Error::new(
                signature.span(),
                "Injectable trait methods must take &self!",
            ))
        }
    }

    signature
        .inputs
        .iter()
        .filter_map(|input| match input {
            FnArg::Receiver(_) => None,
            FnArg::Typed(typed) => Some(typed),
        })
        .map(|typed| match typed.pat.as_ref() {
            Pat::Ident(pat) if pat.by_ref.is_none() && pat.subpat.is_none() => Ok(&pat.ident),
            _ => Err(Error::new(
                typed.pat.span(),
                "Injectable trait method arguments must be plain identifiers!",
            )),
        })
        .try_collect()
}

fn generate_proxy_method(signature: &Signature) -> Result<TokenStream> {
    if signature.asyncness.is_some() || signature.unsafety.is_some() {
        return Err(Error::new(
            signature.span(),
            "Injectable trait methods cannot be async or unsafe!",
        ));
    }

    if !signature.generics.params.is_empty() {
        return Err(Error::new(
            signature.generics.span(),
            "Injectable trait methods cannot be generic!",
        ));
    }

    let arguments = extract_arguments(signature)?;
    let ident = &signature.ident;
    let name = ident.to_string();

    Ok(quote! {
        #signature {
            let __sprig_invocation = self.invocation(#name, || {
                ::std::vec![#(::std::format!("{:?}", #arguments)),*]
            });
            self.interceptor().before(&__sprig_invocation);
            let __sprig_result = self.target().#ident(#(#arguments),*);
            self.interceptor().after(&__sprig_invocation);
            __sprig_result
        }
    })
}

pub fn expand_injectable(item: &ItemTrait) -> Result<TokenStream> {
    if !item.generics.params.is_empty() || item.generics.where_clause.is_some() {
        return Err(Error::new(
            item.generics.span(),
            "Injectable traits cannot be generic!",
        ));
    }

    let signatures: Vec<_> = item
        .items
        .iter()
        .map(|trait_item| match trait_item {
            TraitItem::Fn(method) => Ok(&method.sig),
            _ => Err(Error::new(
                trait_item.span(),
                "Injectable traits can only contain methods!",
            )),
        })
        .try_collect()?;

    let ident = &item.ident;
    let names = signatures.iter().map(|signature| signature.ident.to_string());
    let methods: Vec<_> = signatures
        .iter()
        .map(|signature| generate_proxy_method(signature))
        .try_collect()?;

    Ok(quote! {
        #item

        #[automatically_derived]
        impl sprig_di::component::Injectable for dyn #ident + Send + Sync {}

        #[automatically_derived]
        impl sprig_di::proxy::Capability for dyn #ident + Send + Sync {
            const METHODS: &'static [&'static str] = &[#(#names),*];
        }

        #[automatically_derived]
        impl #ident for sprig_di::proxy::Proxy<dyn #ident + Send + Sync> {
            #(#methods)*
        }
    })
}
