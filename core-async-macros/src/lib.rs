//! Attribute macros that let crates write `async fn` tests and entry points
//! without naming the executor.
//!
//! `#[core_async::test]` expands to a plain `#[test]` whose body is driven by
//! `core_async::runtime::block_on`. `#[core_async::main]` does the same for a
//! binary's `main`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, ItemFn};

#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
    expand(attr, item, MacroKind::Test)
}

#[proc_macro_attribute]
pub fn main(attr: TokenStream, item: TokenStream) -> TokenStream {
    expand(attr, item, MacroKind::Main)
}

enum MacroKind {
    Test,
    Main,
}

fn expand(attr: TokenStream, item: TokenStream, kind: MacroKind) -> TokenStream {
    if !attr.is_empty() {
        let tokens = TokenStream2::from(attr);
        return syn::Error::new_spanned(tokens, "core_async attribute macros take no arguments")
            .to_compile_error()
            .into();
    }

    let input = parse_macro_input!(item as ItemFn);

    if input.sig.asyncness.is_none() {
        return syn::Error::new_spanned(
            input.sig.fn_token,
            "core_async attribute macros require `async fn`",
        )
        .to_compile_error()
        .into();
    }

    let ItemFn {
        attrs,
        vis,
        mut sig,
        block,
    } = input;
    sig.asyncness = None;

    let test_attr = match kind {
        MacroKind::Test => quote!(#[test]),
        MacroKind::Main => TokenStream2::new(),
    };

    quote! {
        #(#attrs)*
        #test_attr
        #vis #sig {
            core_async::runtime::block_on(async move #block)
        }
    }
    .into()
}
