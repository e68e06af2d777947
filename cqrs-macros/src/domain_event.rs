use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{DeriveInput, LitStr, Result};

/// #[derive(DomainEvent)] 实现
/// - 生成 `::cqrs_domain::domain_event::DomainEvent`
/// - `#[event(event_type = "...")]` 指定事件类型名，缺省为类型名
pub(crate) fn expand(input: DeriveInput) -> Result<TokenStream2> {
    let mut event_type: Option<LitStr> = None;

    for attr in input.attrs.iter().filter(|a| a.path().is_ident("event")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("event_type") {
                if event_type.is_some() {
                    return Err(meta.error("duplicate key 'event_type' in attribute"));
                }
                event_type = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("unknown key; expected 'event_type'"))
            }
        })?;
    }

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let event_type = event_type.unwrap_or_else(|| LitStr::new(&ident.to_string(), ident.span()));

    Ok(quote! {
        impl #impl_generics ::cqrs_domain::domain_event::DomainEvent
            for #ident #ty_generics #where_clause
        {
            const EVENT_TYPE: &'static str = #event_type;
        }
    })
}
