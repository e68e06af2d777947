//! 装饰器管道（Decorator Pipeline）
//!
//! 每种请求类型在注册时组装一次管道，之后只读复用。由外到内：
//!
//! 命令：Validation → LifetimeScope → EventDispatch → PostAction → Transaction → Logging → Handler
//!
//! 查询：Validation → LifetimeScope → Logging → Handler
//!
//! 各阶段在调用时按请求类型的标记决定是否生效，未生效时原样透传结果与错误。
//! 事件分发阶段包在事务阶段外层，因此事件只会在工作单元提交之后才分发。
//!
mod event_dispatch;
mod handler;
mod lifetime_scope;
mod logging;
mod post_action;
mod transaction;
mod validation;

pub use event_dispatch::EventDispatchStage;
pub use handler::HandlerStage;
pub use lifetime_scope::LifetimeScopeStage;
pub use logging::LoggingStage;
pub use post_action::PostActionStage;
pub use transaction::TransactionStage;
pub use validation::ValidationStage;

use crate::command::Command;
use crate::command_handler::CommandHandler;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::query::Query;
use crate::query_handler::QueryHandler;
use crate::services::PipelineServices;
use async_trait::async_trait;
use cqrs_domain::domain_event::EventEnvelope;
use std::sync::Arc;

/// 命令管道中的一个阶段
///
/// 命令以 `Arc` 传递：携带 EventListener 标记的命令在成功后作为事件载荷共享，无需复制。
#[async_trait]
pub trait CommandStage<C>: Send + Sync
where
    C: Command,
{
    async fn invoke(&self, ctx: &AppContext, cmd: Arc<C>) -> AppResult<Vec<EventEnvelope>>;
}

/// 查询管道中的一个阶段
#[async_trait]
pub trait QueryStage<Q>: Send + Sync
where
    Q: Query,
{
    async fn invoke(&self, ctx: &AppContext, q: &Q) -> AppResult<Q::Dto>;
}

/// 组装命令管道
pub fn command_pipeline<C, H>(
    handler: Arc<H>,
    services: &PipelineServices,
) -> Arc<dyn CommandStage<C>>
where
    C: Command,
    H: CommandHandler<C> + 'static,
{
    let stage = HandlerStage::new(handler);
    let stage = LoggingStage::new(stage, services.logger.clone(), services.serializer.clone());
    let stage = TransactionStage::new(stage);
    let stage = PostActionStage::new(stage);
    let stage = EventDispatchStage::new(stage, services.event_engine.clone());
    let stage = LifetimeScopeStage::new(stage, services.unit_of_work_factory.clone());
    Arc::new(ValidationStage::new(stage))
}

/// 组装查询管道
pub fn query_pipeline<Q, H>(handler: Arc<H>, services: &PipelineServices) -> Arc<dyn QueryStage<Q>>
where
    Q: Query,
    H: QueryHandler<Q> + 'static,
{
    let stage = HandlerStage::new(handler);
    let stage = LoggingStage::new(stage, services.logger.clone(), services.serializer.clone());
    let stage = LifetimeScopeStage::new(stage, services.unit_of_work_factory.clone());
    Arc::new(ValidationStage::new(stage))
}
