//! CQRS 领域层基础库（cqrs-domain）
//!
//! 提供命令/查询分发框架在领域侧所需的最小契约：
//! - 领域事件（`domain_event`）：事件载荷标记 `DomainEvent`、类型擦除后的 `EventEnvelope`、
//!   业务上下文与事件元数据；
//! - 事件分发（`eventing`）：订阅者 `EventHandler`、订阅注册表 `SubscriptionRegistry`
//!   以及按“同步/异步”两种策略投递事件的 `EventDispatchEngine`；
//! - 值对象（`value_object`）：以值相等、可哈希、构造时校验的不可变概念；
//! - 统一错误类型（`error`）。
//!
//! 本 crate 不关心请求如何被路由到处理器，只负责“事件如何送达订阅者”。
//! 应用层（cqrs-application）在装饰器管道中调用这里的引擎。
//!
pub mod domain_event;
pub mod error;
#[cfg(feature = "eventing")]
pub mod eventing;
pub mod value_object;

// 允许在本 crate 内部通过 ::cqrs_domain 进行自引用，
// 以便派生宏在本 crate 的单元测试中也能解析到 ::cqrs_domain 路径。
extern crate self as cqrs_domain;
