use crate::attrs::{RequestAttrs, name_or_ident};
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{DeriveInput, Result};

/// #[derive(Query)] 实现
/// - `dto = Type` 必填；
/// - 只接受 `log` 标记，`transactional` / `event_listener` 对查询没有意义，直接报错。
pub(crate) fn expand(input: DeriveInput) -> Result<TokenStream2> {
    let cfg = RequestAttrs::parse(&input.attrs, "query")?;
    RequestAttrs::reject(cfg.transactional, "queries cannot be transactional")?;
    RequestAttrs::reject(cfg.event_listener, "queries cannot be event listeners")?;

    let ident = &input.ident;
    let Some(dto) = &cfg.dto else {
        return Err(syn::Error::new_spanned(
            ident,
            "#[derive(Query)] requires #[query(dto = Type)]",
        ));
    };

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let markers = cfg.markers();
    let validate = cfg.validate_fn();
    let name = name_or_ident(cfg.name.clone(), ident);

    Ok(quote! {
        impl #impl_generics ::cqrs_application::markers::Marked
            for #ident #ty_generics #where_clause
        {
            const MARKERS: ::cqrs_application::markers::Markers = #markers;
        }

        impl #impl_generics ::cqrs_application::query::Query for #ident #ty_generics #where_clause {
            const NAME: &'static str = #name;

            type Dto = #dto;

            #validate
        }
    })
}
