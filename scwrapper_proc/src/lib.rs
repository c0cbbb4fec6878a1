use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    Expr, FnArg, Ident, ItemFn, LitStr, Pat, Result, ReturnType, Token,
    parse::{Parse, ParseStream},
    parse_macro_input,
};

/// Arguments of `#[boundary(...)]`
struct BoundaryArgs {
    /// Value returned to the foreign caller when the body panics.
    /// `None` means `()` for void exports and `Default::default()` otherwise.
    fallback: Option<Expr>,
}

impl Parse for BoundaryArgs {
    fn parse(input: ParseStream) -> Result<Self> {
        if input.is_empty() {
            return Ok(BoundaryArgs { fallback: None });
        }

        // fallback = <expr>
        let key: Ident = input.parse()?;
        if key != "fallback" {
            return Err(syn::Error::new(key.span(), "expected `fallback`"));
        }
        input.parse::<Token![=]>()?;
        let fallback: Expr = input.parse()?;

        if input.peek(Token![,]) {
            input.parse::<Token![,]>()?;
        }
        if !input.is_empty() {
            return Err(input.error("unexpected tokens after `fallback = ...`"));
        }

        Ok(BoundaryArgs {
            fallback: Some(fallback),
        })
    }
}

/// Collects the argument names of the export, for entry logging
fn arg_names(func: &ItemFn) -> Result<Vec<Ident>> {
    func.sig
        .inputs
        .iter()
        .map(|arg| match arg {
            FnArg::Typed(typed) => match typed.pat.as_ref() {
                Pat::Ident(pat) => Ok(pat.ident.clone()),
                other => Err(syn::Error::new_spanned(
                    other,
                    "#[boundary] exports must bind every argument to a plain name",
                )),
            },
            FnArg::Receiver(receiver) => Err(syn::Error::new_spanned(
                receiver,
                "#[boundary] cannot be used on methods",
            )),
        })
        .collect()
}

fn expand(args: BoundaryArgs, func: ItemFn) -> Result<TokenStream2> {
    match &func.sig.abi {
        Some(abi) if abi.name.as_ref().is_some_and(|name| name.value() == "C") => {}
        _ => {
            return Err(syn::Error::new_spanned(
                &func.sig,
                "#[boundary] exports must be declared `extern \"C\"`",
            ));
        }
    }

    let attrs = &func.attrs;
    let vis = &func.vis;
    let sig = &func.sig;
    let block = &func.block;
    let name = sig.ident.to_string();

    let names = arg_names(&func)?;
    let placeholders = vec!["{:?}"; names.len()].join(", ");
    let entry_fmt = LitStr::new(
        &format!("[EXPORT] {}({})", name, placeholders),
        sig.ident.span(),
    );

    let fallback = match (&args.fallback, &sig.output) {
        (Some(expr), _) => quote! { #expr },
        (None, ReturnType::Default) => quote! { () },
        (None, ReturnType::Type(..)) => quote! { ::core::default::Default::default() },
    };

    Ok(quote! {
        #(#attrs)*
        #[unsafe(no_mangle)]
        #vis #sig {
            debug_log!(#entry_fmt #(, #names)*);
            #[allow(unused_unsafe)]
            let body = move || unsafe #block;
            match ::std::panic::catch_unwind(::std::panic::AssertUnwindSafe(body)) {
                Ok(value) => value,
                Err(_payload) => {
                    debug_log!(
                        "[EXPORT] {} panicked: {}",
                        #name,
                        crate::panic_message(_payload.as_ref())
                    );
                    #fallback
                }
            }
        }
    })
}

/// Turns an `extern "C"` function into an unmangled export that never unwinds
/// into its foreign caller.
///
/// The body runs inside `catch_unwind`; a panic is logged (with the
/// `debug-logs` feature of the calling crate) and the fallback value is
/// returned instead. The calling crate must provide a `debug_log!` macro and a
/// `crate::panic_message(&(dyn Any + Send)) -> String` function.
///
/// ```ignore
/// #[boundary(fallback = -1)]
/// pub unsafe extern "C" fn GetCount(result: *const ResultDescription) -> i32 { ... }
/// ```
#[proc_macro_attribute]
pub fn boundary(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as BoundaryArgs);
    let func = parse_macro_input!(item as ItemFn);

    match expand(args, func) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}
