//! cqrs-macros：声明请求、事件与带标记错误类型的派生宏
//!
//! - `#[derive(Command)]`：实现 `Marked` + `Command`，`#[command(name = "...", transactional, log, event_listener, validate = path)]`
//! - `#[derive(Query)]`：实现 `Marked` + `Query`，`#[query(dto = Type, name = "...", log, validate = path)]`
//! - `#[derive(DomainEvent)]`：实现 `DomainEvent`，`#[event(event_type = "...")]`
//! - `#[derive(Marked)]`：只实现 `Marked`（常用于业务错误类型），`#[marked(event_listener, ...)]`
//! - `#[value_object]`：补齐值对象所需派生并实现 `ValueObject`，`#[value_object(debug = false, validate = path)]`
//!
use proc_macro::TokenStream;
use syn::{DeriveInput, Item, parse_macro_input};

mod attrs;
mod command;
mod domain_event;
mod marked;
mod query;
mod value_object;

#[proc_macro_derive(Command, attributes(command))]
pub fn derive_command(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    command::expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

#[proc_macro_derive(Query, attributes(query))]
pub fn derive_query(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    query::expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

#[proc_macro_derive(DomainEvent, attributes(event))]
pub fn derive_domain_event(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    domain_event::expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

#[proc_macro_derive(Marked, attributes(marked))]
pub fn derive_marked(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    marked::expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

#[proc_macro_attribute]
pub fn value_object(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut args = value_object::ValueObjectArgs::default();
    let parser = syn::meta::parser(|meta| args.parse(meta));
    parse_macro_input!(attr with parser);
    let item = parse_macro_input!(item as Item);
    value_object::expand(args, item)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
