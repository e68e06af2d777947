//! 事件分发子系统（eventing）
//!
//! - `EventHandler`：订阅某一具体事件类型的处理器；
//! - `SubscriptionRegistry`：启动期构建、之后只读的“事件类型 → 有序订阅者”映射；
//! - `EventDispatchEngine`：把事件投递给订阅者，逐个隔离失败，并区分两种策略：
//!   成功路径的事件批次（可后台执行，调用方不等待）与错误事件（同步投递，投递完才返回）。
//!
//! 该模块只做进程内投递，不做持久化、重试或重投。
//!
pub mod engine;
pub mod handler;
pub mod registry;

pub use engine::{DispatchMode, DispatchReport, EventDispatchConfig, EventDispatchEngine};
pub use handler::EventHandler;
pub use registry::{Subscriber, SubscriptionRegistry, SubscriptionRegistryBuilder};
