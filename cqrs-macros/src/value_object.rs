use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::meta::ParseNestedMeta;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Attribute, Item, LitBool, Path, Result, Token, parse_quote};

/// `#[value_object(...)]` 的参数
#[derive(Default)]
pub(crate) struct ValueObjectArgs {
    debug: Option<bool>,
    validate: Option<Path>,
}

impl ValueObjectArgs {
    pub(crate) fn parse(&mut self, meta: ParseNestedMeta) -> Result<()> {
        if meta.path.is_ident("debug") {
            if self.debug.is_some() {
                return Err(meta.error("duplicate key 'debug' in attribute"));
            }
            let lit: LitBool = meta.value()?.parse()?;
            self.debug = Some(lit.value);
            Ok(())
        } else if meta.path.is_ident("validate") {
            if self.validate.is_some() {
                return Err(meta.error("duplicate key 'validate' in attribute"));
            }
            self.validate = Some(meta.value()?.parse()?);
            Ok(())
        } else {
            Err(meta.error("unknown key; expected 'debug' | 'validate'"))
        }
    }
}

/// #[value_object] 宏实现
/// - 支持结构体（具名或 tuple）与枚举
/// - 合并/追加派生：(Debug 可控), Clone, PartialEq, Eq, Hash, Serialize, Deserialize
/// - 生成 `::cqrs_domain::value_object::ValueObject`；`validate = path` 指定校验函数
pub(crate) fn expand(args: ValueObjectArgs, mut item: Item) -> Result<TokenStream2> {
    let mut required: Vec<Path> = vec![
        parse_quote!(Clone),
        parse_quote!(PartialEq),
        parse_quote!(Eq),
        parse_quote!(Hash),
        parse_quote!(serde::Serialize),
        parse_quote!(serde::Deserialize),
    ];
    if args.debug.unwrap_or(true) {
        required.insert(0, parse_quote!(Debug));
    }

    let (ident, generics) = match &mut item {
        Item::Struct(st) => {
            merge_derives(&mut st.attrs, required)?;
            (st.ident.clone(), st.generics.clone())
        }
        Item::Enum(en) => {
            merge_derives(&mut en.attrs, required)?;
            (en.ident.clone(), en.generics.clone())
        }
        other => {
            return Err(syn::Error::new(
                other.span(),
                "#[value_object] only supports struct or enum",
            ));
        }
    };

    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let validate = args.validate.map(|path| {
        quote! {
            fn validate(&self) -> ::cqrs_domain::error::DomainResult<()> {
                #path(self)
            }
        }
    });

    Ok(quote! {
        #item

        impl #impl_generics ::cqrs_domain::value_object::ValueObject
            for #ident #ty_generics #where_clause
        {
            #validate
        }
    })
}

/// 把必需派生与已有派生合并为一个 `#[derive(...)]` 并放在最前面（按末段名去重）
fn merge_derives(attrs: &mut Vec<Attribute>, required: Vec<Path>) -> Result<()> {
    let mut derives = required;
    let mut retained = Vec::with_capacity(attrs.len());

    for attr in attrs.drain(..) {
        if !attr.path().is_ident("derive") {
            retained.push(attr);
            continue;
        }
        let listed = attr.parse_args_with(Punctuated::<Path, Token![,]>::parse_terminated)?;
        for path in listed {
            if !derives.iter().any(|p| last_ident(p) == last_ident(&path)) {
                derives.push(path);
            }
        }
    }

    let merged: Attribute = parse_quote!(#[derive(#(#derives),*)]);
    *attrs = std::iter::once(merged).chain(retained).collect();
    Ok(())
}

fn last_ident(path: &Path) -> Option<String> {
    path.segments.last().map(|seg| seg.ident.to_string())
}
