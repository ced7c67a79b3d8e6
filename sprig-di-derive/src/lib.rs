mod alias;
mod aspect;
mod attributes;
mod component;
mod injectable;

use crate::alias::register_component_alias;
use crate::aspect::expand_aspect;
use crate::component::expand_component;
use crate::injectable::expand_injectable;
use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput, Error, ItemImpl, ItemTrait};

/// Registers a struct as a component. See `sprig_di::component` for supported attributes.
#[proc_macro_derive(Component, attributes(component))]
pub fn generate_component(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_component(&input)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}

/// Marks a trait as an injectable capability and generates its call-intercepting proxy.
#[proc_macro_attribute]
pub fn injectable(_attr: TokenStream, input: TokenStream) -> TokenStream {
    let item = parse_macro_input!(input as ItemTrait);
    expand_injectable(&item)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}

/// Registers an `impl Trait for Component` block, making the component injectable as
/// `dyn Trait + Send + Sync`.
#[proc_macro_attribute]
pub fn component_alias(_attr: TokenStream, input: TokenStream) -> TokenStream {
    let item = parse_macro_input!(input as ItemImpl);
    register_component_alias(&item)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}

/// Marks a component as an aspect. Methods annotated with `#[before("<class>.<method>")]` or
/// `#[after("<class>.<method>")]` become advice for the given target.
#[proc_macro_attribute]
pub fn aspect(_attr: TokenStream, input: TokenStream) -> TokenStream {
    let item = parse_macro_input!(input as ItemImpl);
    expand_aspect(item)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}
