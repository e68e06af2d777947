use crate::attrs::{RequestAttrs, name_or_ident};
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{DeriveInput, Result};

/// #[derive(Command)] 实现
/// - 生成 `::cqrs_application::markers::Marked`（标记来自 `#[command(...)]` 中的开关）
/// - 生成 `::cqrs_application::command::Command`（`NAME` 默认取类型名）
/// - 可选 `validate = path`：`fn(&Self) -> Result<(), ValidationError>`
pub(crate) fn expand(input: DeriveInput) -> Result<TokenStream2> {
    let cfg = RequestAttrs::parse(&input.attrs, "command")?;
    if let Some(dto) = &cfg.dto {
        return Err(syn::Error::new_spanned(dto, "'dto' is only valid on #[query(...)]"));
    }

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let markers = cfg.markers();
    let validate = cfg.validate_fn();
    let name = name_or_ident(cfg.name, ident);

    Ok(quote! {
        impl #impl_generics ::cqrs_application::markers::Marked
            for #ident #ty_generics #where_clause
        {
            const MARKERS: ::cqrs_application::markers::Markers = #markers;
        }

        impl #impl_generics ::cqrs_application::command::Command
            for #ident #ty_generics #where_clause
        {
            const NAME: &'static str = #name;

            #validate
        }
    })
}
