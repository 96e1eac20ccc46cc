use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::punctuated::Punctuated;
use syn::{parse_macro_input, FnArg, ItemFn, LitStr, MetaNameValue, Pat, Token};

/// Attribute used to mark functions as implementing a runtime builtin.
///
/// Example:
/// ```rust,ignore
/// use quire_macros::runtime_builtin;
///
/// #[runtime_builtin(name = "sin")]
/// fn sin_builtin(x: Value) -> Result<Value, LangError> {
///     /* implementation */
/// }
/// ```
///
/// This registers the function with the `quire-builtins` inventory
/// so the evaluator can discover it at start-up.
#[proc_macro_attribute]
pub fn runtime_builtin(args: TokenStream, input: TokenStream) -> TokenStream {
    let args =
        parse_macro_input!(args with Punctuated::<MetaNameValue, Token![,]>::parse_terminated);
    let mut name_lit: Option<LitStr> = None;
    for arg in args {
        if arg.path.is_ident("name") {
            if let syn::Expr::Lit(syn::ExprLit {
                lit: syn::Lit::Str(s),
                ..
            }) = arg.value
            {
                name_lit = Some(s);
            } else {
                panic!("name must be a string literal");
            }
        } else {
            panic!("unknown attribute parameter; only `name` is supported");
        }
    }
    let name_lit = name_lit.expect("expected `name = \"...\"` argument");
    let name_str = name_lit.value();

    let func: ItemFn = parse_macro_input!(input as ItemFn);
    let ident = &func.sig.ident;

    // Extract param idents and types
    let mut param_idents = Vec::new();
    let mut param_types = Vec::new();
    for arg in &func.sig.inputs {
        match arg {
            FnArg::Typed(pt) => {
                if let Pat::Ident(pi) = pt.pat.as_ref() {
                    param_idents.push(pi.ident.clone());
                } else {
                    panic!("parameters must be simple identifiers");
                }
                param_types.push((*pt.ty).clone());
            }
            _ => panic!("self parameter not allowed"),
        }
    }
    let param_len = param_idents.len();

    // Detect if the last parameter is variadic Vec<Value>
    let is_last_variadic = param_types
        .last()
        .map(|ty| {
            if let syn::Type::Path(tp) = ty {
                if tp
                    .path
                    .segments
                    .last()
                    .map(|s| s.ident == "Vec")
                    .unwrap_or(false)
                {
                    if let syn::PathArguments::AngleBracketed(ab) =
                        &tp.path.segments.last().unwrap().arguments
                    {
                        if let Some(syn::GenericArgument::Type(syn::Type::Path(inner))) =
                            ab.args.first()
                        {
                            return inner
                                .path
                                .segments
                                .last()
                                .map(|s| s.ident == "Value")
                                .unwrap_or(false);
                        }
                    }
                }
            }
            false
        })
        .unwrap_or(false);

    let wrapper_ident = format_ident!("__rt_wrap_{}", ident);

    let conv_stmts: Vec<proc_macro2::TokenStream> = if is_last_variadic && param_len > 0 {
        let mut stmts = Vec::new();
        for (i, (ident, ty)) in param_idents
            .iter()
            .zip(param_types.iter())
            .enumerate()
            .take(param_len - 1)
        {
            stmts.push(quote! {
                let #ident : #ty = std::convert::TryInto::try_into(&args[#i])?;
            });
        }
        let last_ident = &param_idents[param_len - 1];
        stmts.push(quote! {
            let #last_ident : Vec<quire_builtins::Value> =
                args[#param_len - 1..].to_vec();
        });
        stmts
    } else {
        param_idents
            .iter()
            .zip(param_types.iter())
            .enumerate()
            .map(|(i, (ident, ty))| {
                quote! {
                    let #ident : #ty = std::convert::TryInto::try_into(&args[#i])?;
                }
            })
            .collect()
    };

    let arity_check = if is_last_variadic {
        quote! {
            if args.len() < #param_len - 1 {
                return Err(quire_builtins::LangError::with_detail(
                    quire_builtins::ErrorCode::WrongArity,
                    #name_str,
                ));
            }
        }
    } else {
        quote! {
            if args.len() != #param_len {
                return Err(quire_builtins::LangError::with_detail(
                    quire_builtins::ErrorCode::WrongArity,
                    #name_str,
                ));
            }
        }
    };

    let wrapper = quote! {
        fn #wrapper_ident(
            args: &[quire_builtins::Value],
        ) -> Result<quire_builtins::Value, quire_builtins::LangError> {
            #![allow(unused_variables)]
            #arity_check
            #(#conv_stmts)*
            let res = #ident(#(#param_idents),*)?;
            Ok(quire_builtins::Value::from(res))
        }
    };

    let register = quote! {
        quire_builtins::inventory::submit! {
            quire_builtins::BuiltinFunction::new(#name_str, #wrapper_ident)
        }
    };

    TokenStream::from(quote! {
        #func
        #wrapper
        #register
    })
}
