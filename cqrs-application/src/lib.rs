//! CQRS 应用层（cqrs-application）
//!
//! - 请求：`Command` / `Query`，通过 `Marked` 声明标记（事务、日志、事件监听）；
//! - 处理器：`CommandHandler` / `QueryHandler`；
//! - 装饰器管道（`pipeline`）：校验、作用域、事件传播、延后动作、事务、日志；
//! - 总线：`InMemoryCommandBus` / `InMemoryQueryBus`，支持同步等待与 `dispatch_async`。
//!
pub mod business_error;
pub mod command;
pub mod command_bus;
pub mod command_handler;
pub mod context;
pub mod dispatch_handle;
pub mod dto;
pub mod error;
pub mod inmemory_command_bus;
pub mod inmemory_query_bus;
pub mod logging;
pub mod markers;
pub mod pipeline;
pub mod query;
pub mod query_bus;
pub mod query_handler;
pub mod scope;
pub mod services;
pub mod unit_of_work;
pub mod validation;

pub use inmemory_command_bus::{InMemoryCommandBus, InMemoryCommandBusBuilder};
pub use inmemory_query_bus::{InMemoryQueryBus, InMemoryQueryBusBuilder};

// 允许派生宏生成的 ::cqrs_application 路径在本 crate 内部（含单元测试）解析
extern crate self as cqrs_application;
