//! `#[test]` replacement that installs the vdom-patch test subscriber first.

use unsynn::*;

keyword! {
    KwFn = "fn";
}

unsynn! {
    struct Preamble {
        tokens: Any<Cons<Except<KwFn>, TokenTree>>,
    }

    struct Signature {
        tokens: Any<Cons<Except<BraceGroup>, TokenTree>>,
    }

    struct TestFn {
        preamble: Preamble,
        _fn: KwFn,
        name: Ident,
        signature: Signature,
        body: BraceGroup,
    }
}

impl quote::ToTokens for Preamble {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        self.tokens.to_tokens(tokens)
    }
}

impl quote::ToTokens for Signature {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        self.tokens.to_tokens(tokens)
    }
}

/// Marks a function as a test and runs `vdom_patch_testhelpers::setup()`
/// before its body.
///
/// ```ignore
/// use vdom_patch_testhelpers::test;
///
/// #[test]
/// fn patches_text() {
///     // tracing output goes to stderr, filtered by VDOM_LOG
/// }
/// ```
///
/// A different harness attribute can be passed through:
/// `#[vdom_patch_testhelpers::test(some_harness::test)]`.
#[proc_macro_attribute]
pub fn test(
    attr: proc_macro::TokenStream,
    item: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    let item = TokenStream::from(item);
    let mut iter = item.to_token_iter();
    let TestFn {
        preamble,
        _fn,
        name,
        signature,
        body,
    } = match iter.parse::<TestFn>() {
        Ok(decl) => decl,
        Err(_) => {
            return quote::quote! {
                ::core::compile_error!("#[vdom_patch_testhelpers::test] expects a function");
            }
            .into();
        }
    };

    let harness = if attr.is_empty() {
        quote::quote! { #[::core::prelude::rust_2024::test] }
    } else {
        let attr = TokenStream::from(attr);
        quote::quote! { #[#attr] }
    };
    let body = body.0.stream();

    quote::quote! {
        #harness
        #preamble fn #name #signature {
            ::vdom_patch_testhelpers::setup();

            #body
        }
    }
    .into()
}
