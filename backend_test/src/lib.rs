use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, spanned::Spanned, FnArg, Ident, ItemFn, Pat, Signature, Type};

/// Transform an asynchronous test into a synchronous one and inject
/// dependencies.
///
/// Every test gets its own server with freshly generated secrets. Injectable
/// dependencies are [`rocket::local::asynchronous::Client`] and the
/// `Registry` and `Balloting` services managed by that server, matched by
/// type name. Pass `populated` to register the example candidates and voters
/// before the test body runs.
#[proc_macro_attribute]
pub fn backend_test(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut item_fn = parse_macro_input!(input as ItemFn);

    // Extract the injected arguments and reject invalid function signatures.
    let test_args = match check_sig(item_fn.sig.clone()) {
        Ok(args) => args,
        Err(err) => {
            return err.into_compile_error().into();
        }
    };

    // Rename the future so the test can have its original name.
    let name = item_fn.sig.ident.clone();
    let new_name = format_ident!("{}_fut", name);
    item_fn.sig.ident = new_name.clone();

    // Seed example data if asked.
    let maybe_populate = match parse_macro_input!(args as Option<Ident>) {
        Some(arg) if arg == "populated" => quote! {
            crate::service::examples::populate(&_registry);
        },
        Some(arg) => {
            return syn::Error::new(arg.span(), "Expected no arguments or `populated`")
                .into_compile_error()
                .into();
        }
        None => quote! {},
    };

    // Rewrite the test function.
    quote! {
        #[test]
        fn #name() {
            /// Test setup.
            async fn setup() -> rocket::local::asynchronous::Client {
                log4rs_test_utils::test_logging::init_logging_once_for(
                    ["secret_ballot_backend"],
                    None,
                    None,
                );
                rocket::local::asynchronous::Client::tracked(crate::rocket_for_test())
                    .await
                    .unwrap()
            }

            /// The test itself.
            #item_fn

            let runtime = rocket::tokio::runtime::Builder::new_multi_thread()
                .thread_name("rocket-worker-test-thread")
                .worker_threads(1)
                .enable_all()
                .build()
                .unwrap();

            runtime.block_on(async {
                let rocket_client = setup().await;
                let _registry = rocket_client
                    .rocket()
                    .state::<crate::service::Registry>()
                    .unwrap()
                    .clone();
                let _balloting = rocket_client
                    .rocket()
                    .state::<crate::service::Balloting>()
                    .unwrap()
                    .clone();

                #maybe_populate

                #new_name(#(#test_args),*).await;
            });
        }
    }
    .into()
}

/// Ensure the wrapped test is async, map each parameter to the dependency it
/// asks for, and reject unknown or repeated parameters.
fn check_sig(sig: Signature) -> Result<Vec<TokenStream2>, syn::Error> {
    if sig.asyncness.is_none() {
        return Err(syn::Error::new(sig.span(), "Test must be marked `async`"));
    }

    let mut seen: Vec<String> = vec![];
    let mut args = vec![];

    for input in &sig.inputs {
        if let FnArg::Typed(pat_type) = input {
            if let (Pat::Ident(_), Type::Path(type_path)) = (&*pat_type.pat, &*pat_type.ty) {
                // The last path segment names the type, however it is qualified.
                if let Some(segment) = type_path.path.segments.last() {
                    let injected = match segment.ident.to_string().as_str() {
                        "Client" => Some(quote! { rocket_client }),
                        "Registry" => Some(quote! { _registry }),
                        "Balloting" => Some(quote! { _balloting }),
                        _ => None,
                    };
                    if let Some(injected) = injected {
                        let type_name = segment.ident.to_string();
                        if seen.contains(&type_name) {
                            return Err(syn::Error::new(
                                input.span(),
                                format!("Test cannot accept more than one `{type_name}`"),
                            ));
                        }
                        seen.push(type_name);
                        args.push(injected);
                        continue;
                    }
                }
            }
        }

        return Err(syn::Error::new(
            input.span(),
            "Expected one of `client_ident: Client`, `registry_ident: Registry` or `balloting_ident: Balloting`",
        ));
    }

    Ok(args)
}
