use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::meta::ParseNestedMeta;
use syn::{Attribute, LitStr, Path, Result, Type};

/// `#[command(...)]` / `#[query(...)]` / `#[marked(...)]` 中解析出的配置
#[derive(Default)]
pub(crate) struct RequestAttrs {
    pub name: Option<LitStr>,
    pub dto: Option<Type>,
    pub validate: Option<Path>,
    pub transactional: Option<Span>,
    pub log: Option<Span>,
    pub event_listener: Option<Span>,
}

impl RequestAttrs {
    /// 解析所有名为 `key` 的属性；同一键重复出现视为错误
    pub(crate) fn parse(attrs: &[Attribute], key: &str) -> Result<Self> {
        let mut out = Self::default();

        for attr in attrs.iter().filter(|a| a.path().is_ident(key)) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let lit: LitStr = meta.value()?.parse()?;
                    set_once(&mut out.name, lit, &meta, "name")
                } else if meta.path.is_ident("dto") {
                    let ty: Type = meta.value()?.parse()?;
                    set_once(&mut out.dto, ty, &meta, "dto")
                } else if meta.path.is_ident("validate") {
                    let path: Path = meta.value()?.parse()?;
                    set_once(&mut out.validate, path, &meta, "validate")
                } else if meta.path.is_ident("transactional") {
                    let span = meta.path.segments[0].ident.span();
                    set_once(&mut out.transactional, span, &meta, "transactional")
                } else if meta.path.is_ident("log") {
                    let span = meta.path.segments[0].ident.span();
                    set_once(&mut out.log, span, &meta, "log")
                } else if meta.path.is_ident("event_listener") {
                    let span = meta.path.segments[0].ident.span();
                    set_once(&mut out.event_listener, span, &meta, "event_listener")
                } else {
                    Err(meta.error(concat!(
                        "unknown key; expected 'name' | 'dto' | 'validate' | ",
                        "'transactional' | 'log' | 'event_listener'",
                    )))
                }
            })?;
        }

        Ok(out)
    }

    /// 生成 `Markers` 常量表达式
    pub(crate) fn markers(&self) -> TokenStream2 {
        let mut flags = Vec::new();
        if self.transactional.is_some() {
            flags.push(quote!(Transactional));
        }
        if self.log.is_some() {
            flags.push(quote!(Log));
        }
        if self.event_listener.is_some() {
            flags.push(quote!(EventListener));
        }

        quote! {
            ::cqrs_application::markers::Markers::NONE
                #( .with(::cqrs_application::markers::Marker::#flags) )*
        }
    }

    /// 生成 `validate` 方法（未指定时沿用 trait 默认实现）
    pub(crate) fn validate_fn(&self) -> TokenStream2 {
        match &self.validate {
            Some(path) => quote! {
                fn validate(
                    &self,
                ) -> ::core::result::Result<(), ::cqrs_application::validation::ValidationError> {
                    #path(self)
                }
            },
            None => TokenStream2::new(),
        }
    }

    /// 拒绝某个派生不支持的键
    pub(crate) fn reject(span: Option<Span>, message: &str) -> Result<()> {
        match span {
            Some(span) => Err(syn::Error::new(span, message)),
            None => Ok(()),
        }
    }
}

fn set_once<T>(slot: &mut Option<T>, value: T, meta: &ParseNestedMeta, key: &str) -> Result<()> {
    if slot.is_some() {
        return Err(meta.error(format!("duplicate key '{key}' in attribute")));
    }
    *slot = Some(value);
    Ok(())
}

/// 未指定 `name` 时使用类型名
pub(crate) fn name_or_ident(name: Option<LitStr>, ident: &syn::Ident) -> LitStr {
    name.unwrap_or_else(|| LitStr::new(&ident.to_string(), ident.span()))
}
