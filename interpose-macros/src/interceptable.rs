//! `#[interceptable]` - contract marker and proxy adapter for a trait.

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::{
    FnArg, GenericArgument, Ident, ItemTrait, LitStr, Pat, PathArguments, ReturnType, Token,
    TraitItem, TraitItemFn, Type, TypeParamBound, parse::Parse, parse_macro_input,
};

/// Arguments for the `#[interceptable]` macro.
pub(crate) struct ContractArgs {
    pub name: Option<String>,
}

impl Parse for ContractArgs {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        let mut name = None;

        while !input.is_empty() {
            let ident: Ident = input.parse()?;
            input.parse::<Token![=]>()?;

            match ident.to_string().as_str() {
                "name" => {
                    let lit: LitStr = input.parse()?;
                    name = Some(lit.value());
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown attribute: {}", other),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(ContractArgs { name })
    }
}

/// Implementation of the `#[interceptable]` macro.
pub fn interceptable_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as ContractArgs);
    let mut input = parse_macro_input!(item as ItemTrait);

    match expand(&args, &mut input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(args: &ContractArgs, item: &mut ItemTrait) -> syn::Result<TokenStream2> {
    if !item.generics.params.is_empty() || item.generics.where_clause.is_some() {
        return Err(syn::Error::new_spanned(
            &item.generics,
            "interceptable contracts cannot be generic",
        ));
    }
    check_supertraits(item)?;

    let trait_ident = item.ident.clone();
    let vis = item.vis.clone();
    let type_name = args
        .name
        .clone()
        .unwrap_or_else(|| trait_ident.to_string());
    let contract_ident = format_ident!("{}Contract", trait_ident);
    let proxy_ident = format_ident!("{}Proxy", trait_ident);

    let mut methods = Vec::new();
    for trait_item in &mut item.items {
        match trait_item {
            TraitItem::Fn(method) => methods.push(ContractMethod::parse(method)?),
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "interceptable contracts may only contain methods",
                ));
            }
        }
    }

    let descriptors = methods.iter().map(|m| m.descriptor(&type_name));
    let proxy_methods = methods
        .iter()
        .enumerate()
        .map(|(index, m)| m.proxy_method(index, &trait_ident, &contract_ident));

    Ok(quote! {
        #item

        #[doc = concat!("Contract marker generated by `#[interceptable]` for `", stringify!(#trait_ident), "`.")]
        #[derive(Clone, Copy, Debug, Default)]
        #vis struct #contract_ident;

        impl ::interpose::Contract for #contract_ident {
            type Object = dyn #trait_ident;

            fn descriptor() -> &'static ::interpose::TypeDescriptor {
                static DESCRIPTOR: ::interpose::__private::OnceLock<::interpose::TypeDescriptor> =
                    ::interpose::__private::OnceLock::new();
                DESCRIPTOR.get_or_init(|| {
                    ::interpose::TypeDescriptor::contract(#type_name, vec![#(#descriptors),*])
                })
            }
        }

        impl<T> ::interpose::Intercept<T> for #contract_ident
        where
            T: #trait_ident + Send + Sync + 'static,
        {
            type Proxy = #proxy_ident<T>;

            fn proxy(
                target: ::interpose::__private::Arc<T>,
                control: ::interpose::__private::Arc<::interpose::InterceptionControl>,
            ) -> Self::Proxy {
                #proxy_ident { target, control }
            }

            fn proxy_object(proxy: Self::Proxy) -> ::std::boxed::Box<Self::Object> {
                ::std::boxed::Box::new(proxy)
            }

            fn target_object(target: T) -> ::std::boxed::Box<Self::Object> {
                ::std::boxed::Box::new(target)
            }
        }

        #[doc = concat!("Intercepting proxy generated by `#[interceptable]` for `", stringify!(#trait_ident), "`.")]
        #vis struct #proxy_ident<T> {
            target: ::interpose::__private::Arc<T>,
            control: ::interpose::__private::Arc<::interpose::InterceptionControl>,
        }

        impl<T> #proxy_ident<T> {
            /// The wrapped target.
            pub fn target(&self) -> &::interpose::__private::Arc<T> {
                &self.target
            }
        }

        impl<T> ::std::fmt::Debug for #proxy_ident<T> {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.debug_struct(stringify!(#proxy_ident))
                    .field("control", &self.control)
                    .finish_non_exhaustive()
            }
        }

        impl<T> #trait_ident for #proxy_ident<T>
        where
            T: #trait_ident + Send + Sync + 'static,
        {
            #(#proxy_methods)*
        }

        impl<T> ::interpose::InterceptingProxy for #proxy_ident<T>
        where
            T: Send + Sync + 'static,
        {
            fn interception(&self) -> &::interpose::InterceptionControl {
                &self.control
            }

            fn invoke_capability(
                &self,
                method: &::interpose::MethodDescriptor,
                arguments: ::interpose::Arguments,
            ) -> ::interpose::MethodResult {
                let target: ::interpose::__private::Arc<dyn ::std::any::Any + Send + Sync> =
                    self.target.clone();
                self.control.invoke_capability(method, arguments, target)
            }
        }
    })
}

fn check_supertraits(item: &ItemTrait) -> syn::Result<()> {
    for bound in &item.supertraits {
        match bound {
            TypeParamBound::Trait(t)
                if t.path.is_ident("Send")
                    || t.path.is_ident("Sync")
                    || path_ends_with(&t.path, &["marker", "Send"])
                    || path_ends_with(&t.path, &["marker", "Sync"]) => {}
            TypeParamBound::Lifetime(lt) if lt.ident == "static" => {}
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "interceptable contracts may only have `Send`, `Sync` or `'static` supertraits",
                ));
            }
        }
    }
    Ok(())
}

fn path_ends_with(path: &syn::Path, tail: &[&str]) -> bool {
    let segments: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
    segments.len() >= tail.len() && segments[segments.len() - tail.len()..] == *tail
}

// ============================================================================
// Methods
// ============================================================================

enum Output {
    Unit,
    Value(Type),
    Fallible { ok: Type, err: Type },
}

struct Param {
    name: String,
    ty: Type,
    tags: Vec<String>,
}

struct ContractMethod {
    ident: Ident,
    params: Vec<Param>,
    signature_output: ReturnType,
    output: Output,
    return_type: String,
    tags: Vec<String>,
    flags: Vec<Ident>,
}

impl ContractMethod {
    /// Validate `method` and strip the `#[interpose(...)]` attributes it carries.
    fn parse(method: &mut TraitItemFn) -> syn::Result<Self> {
        let sig = &method.sig;
        if !sig.generics.params.is_empty() || sig.generics.where_clause.is_some() {
            return Err(syn::Error::new_spanned(
                &sig.generics,
                "interceptable methods cannot be generic",
            ));
        }
        if let Some(asyncness) = &sig.asyncness {
            return Err(syn::Error::new_spanned(
                asyncness,
                "interceptable methods cannot be async",
            ));
        }
        if let Some(unsafety) = &sig.unsafety {
            return Err(syn::Error::new_spanned(
                unsafety,
                "interceptable methods cannot be unsafe",
            ));
        }
        if let Some(variadic) = &sig.variadic {
            return Err(syn::Error::new_spanned(
                variadic,
                "interceptable methods cannot be variadic",
            ));
        }

        let mut tags = Vec::new();
        let mut flags = Vec::new();
        for attr in method.attrs.iter().filter(|a| a.path().is_ident("interpose")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("tag") {
                    let lit: LitStr = meta.value()?.parse()?;
                    tags.push(lit.value());
                } else if meta.path.is_ident("getter") {
                    flags.push(Ident::new("GETTER", Span::call_site()));
                } else if meta.path.is_ident("setter") {
                    flags.push(Ident::new("SETTER", Span::call_site()));
                } else if meta.path.is_ident("no_policies") {
                    flags.push(Ident::new("NO_POLICIES", Span::call_site()));
                } else {
                    return Err(meta.error("expected `tag = \"...\"`, `getter`, `setter` or `no_policies`"));
                }
                Ok(())
            })?;
        }
        method.attrs.retain(|a| !a.path().is_ident("interpose"));

        let mut inputs = method.sig.inputs.iter_mut();
        match inputs.next() {
            Some(FnArg::Receiver(receiver))
                if receiver.reference.is_some() && receiver.mutability.is_none() => {}
            Some(other) => {
                return Err(syn::Error::new_spanned(
                    other,
                    "interceptable methods must take `&self`",
                ));
            }
            None => {
                return Err(syn::Error::new_spanned(
                    &method.sig.ident,
                    "interceptable methods must take `&self`",
                ));
            }
        }

        let mut params = Vec::new();
        for (index, input) in inputs.enumerate() {
            let FnArg::Typed(pat_type) = input else {
                continue;
            };
            reject_borrowed(&pat_type.ty)?;

            let name = match &*pat_type.pat {
                Pat::Ident(pat) => pat.ident.to_string(),
                Pat::Wild(_) => format!("arg{index}"),
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "interceptable method parameters must be plain identifiers",
                    ));
                }
            };

            let mut param_tags = Vec::new();
            for attr in pat_type.attrs.iter().filter(|a| a.path().is_ident("interpose")) {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("tag") {
                        let lit: LitStr = meta.value()?.parse()?;
                        param_tags.push(lit.value());
                        Ok(())
                    } else {
                        Err(meta.error("expected `tag = \"...\"`"))
                    }
                })?;
            }
            pat_type.attrs.retain(|a| !a.path().is_ident("interpose"));

            params.push(Param {
                name,
                ty: (*pat_type.ty).clone(),
                tags: param_tags,
            });
        }

        let (output, return_type) = match &method.sig.output {
            ReturnType::Default => (Output::Unit, "()".to_string()),
            ReturnType::Type(_, ty) => {
                reject_borrowed(ty)?;
                let output = match result_parts(ty) {
                    Some((ok, err)) => Output::Fallible { ok, err },
                    None => Output::Value((**ty).clone()),
                };
                (output, type_string(ty))
            }
        };

        Ok(ContractMethod {
            ident: method.sig.ident.clone(),
            params,
            signature_output: method.sig.output.clone(),
            output,
            return_type,
            tags,
            flags,
        })
    }

    fn descriptor(&self, type_name: &str) -> TokenStream2 {
        let name = self.ident.to_string();
        let params = self.params.iter().map(|p| {
            let pname = &p.name;
            let pty = type_string(&p.ty);
            let ptags = &p.tags;
            quote! {
                .parameter(::interpose::Parameter::new(#pname, #pty) #(.with_tag(#ptags))*)
            }
        });
        let return_type = &self.return_type;
        let tags = &self.tags;
        let flags = &self.flags;

        quote! {
            ::interpose::MethodDescriptor::builder(#type_name, #name)
                #(#params)*
                .returns(#return_type)
                #(.tag(#tags))*
                .flags(::interpose::MethodFlags::empty() #(| ::interpose::MethodFlags::#flags)*)
                .build()
        }
    }

    fn proxy_method(&self, index: usize, trait_ident: &Ident, contract: &Ident) -> TokenStream2 {
        let ident = &self.ident;
        let args: Vec<Ident> = (0..self.params.len())
            .map(|i| format_ident!("__arg{}", i))
            .collect();
        let tys: Vec<&Type> = self.params.iter().map(|p| &p.ty).collect();
        let positions = 0..self.params.len();

        let signature_output = &self.signature_output;
        let call = quote! { <T as #trait_ident>::#ident(&**__target, #(#args),*) };
        let terminal_result = match &self.output {
            Output::Unit | Output::Value(_) => quote! {
                ::core::result::Result::Ok(::interpose::ReturnValue::new(#call))
            },
            Output::Fallible { .. } => quote! {
                match #call {
                    ::core::result::Result::Ok(value) => {
                        ::core::result::Result::Ok(::interpose::ReturnValue::new(value))
                    }
                    ::core::result::Result::Err(err) => {
                        ::core::result::Result::Err(::interpose::CallError::into_box(err))
                    }
                }
            },
        };

        let unpack = match &self.output {
            Output::Unit => quote! {
                ::interpose::__private::infallible::<()>(__result, __method)
            },
            Output::Value(ty) => quote! {
                ::interpose::__private::infallible::<#ty>(__result, __method)
            },
            Output::Fallible { ok, err } => quote! {
                ::interpose::__private::fallible::<#ok, #err>(__result, __method)
            },
        };

        quote! {
            fn #ident(&self, #(#args: #tys),*) #signature_output {
                let __method = &<#contract as ::interpose::Contract>::descriptor().methods()[#index];
                let __target = &self.target;
                let __instance: ::interpose::__private::Arc<dyn ::std::any::Any + Send + Sync> =
                    self.target.clone();
                let mut __invocation = ::interpose::Invocation::new(
                    __method.clone(),
                    ::interpose::Arguments::new() #(.with(#args))*,
                    __instance,
                );
                let __terminal = |__invocation: &mut ::interpose::Invocation| -> ::interpose::MethodResult {
                    #( let #args = __invocation.arguments().cloned::<#tys>(#positions)?; )*
                    #terminal_result
                };
                let __result = self.control.dispatch(&mut __invocation, &__terminal);
                #unpack
            }
        }
    }
}

fn reject_borrowed(ty: &Type) -> syn::Result<()> {
    match ty {
        Type::Reference(_) => Err(syn::Error::new_spanned(
            ty,
            "interceptable methods must take and return owned values",
        )),
        Type::ImplTrait(_) => Err(syn::Error::new_spanned(
            ty,
            "interceptable methods cannot use `impl Trait`",
        )),
        _ => Ok(()),
    }
}

/// `Result<T, E>` (two type arguments) split into `(T, E)`.
fn result_parts(ty: &Type) -> Option<(Type, Type)> {
    let Type::Path(path) = ty else {
        return None;
    };
    let last = path.path.segments.last()?;
    if last.ident != "Result" {
        return None;
    }
    let PathArguments::AngleBracketed(generics) = &last.arguments else {
        return None;
    };
    let mut types = generics.args.iter().filter_map(|arg| match arg {
        GenericArgument::Type(ty) => Some(ty.clone()),
        _ => None,
    });
    match (types.next(), types.next(), types.next()) {
        (Some(ok), Some(err), None) => Some((ok, err)),
        _ => None,
    }
}

/// Render a type the way it is written, without token spacing.
fn type_string(ty: &Type) -> String {
    let raw = quote!(#ty).to_string();
    let chars: Vec<char> = raw.chars().collect();
    let word = |c: char| c.is_alphanumeric() || c == '_';
    let mut out = String::with_capacity(raw.len());
    for (i, &c) in chars.iter().enumerate() {
        if c == ' ' {
            let before = i.checked_sub(1).map(|j| chars[j]);
            let after = chars.get(i + 1).copied();
            if matches!((before, after), (Some(b), Some(a)) if word(b) && word(a)) {
                out.push(' ');
            }
            continue;
        }
        out.push(c);
    }
    out
}
