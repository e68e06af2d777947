use crate::attrs::RequestAttrs;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{DeriveInput, Result};

/// #[derive(Marked)]：只生成标记，常用于处理器返回的业务错误类型
pub(crate) fn expand(input: DeriveInput) -> Result<TokenStream2> {
    let cfg = RequestAttrs::parse(&input.attrs, "marked")?;
    if cfg.name.is_some() || cfg.dto.is_some() || cfg.validate.is_some() {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "#[marked(...)] only accepts 'transactional' | 'log' | 'event_listener'",
        ));
    }

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let markers = cfg.markers();

    Ok(quote! {
        impl #impl_generics ::cqrs_application::markers::Marked
            for #ident #ty_generics #where_clause
        {
            const MARKERS: ::cqrs_application::markers::Markers = #markers;
        }
    })
}
