use crate::{command::Command, context::AppContext, error::AppResult};
use async_trait::async_trait;
use cqrs_domain::domain_event::EventEnvelope;

/// 命令处理器：执行业务逻辑并返回本次产生的领域事件（按产生顺序）
#[async_trait]
pub trait CommandHandler<C>: Send + Sync
where
    C: Command,
{
    async fn handle(&self, ctx: &AppContext, cmd: &C) -> AppResult<Vec<EventEnvelope>>;
}
