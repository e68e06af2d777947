use super::{CommandStage, QueryStage};
use crate::command::Command;
use crate::command_handler::CommandHandler;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::query::Query;
use crate::query_handler::QueryHandler;
use async_trait::async_trait;
use cqrs_domain::domain_event::EventEnvelope;
use std::sync::Arc;

/// 最内层：调用真实的处理器
pub struct HandlerStage<H> {
    handler: Arc<H>,
}

impl<H> HandlerStage<H> {
    pub fn new(handler: Arc<H>) -> Self {
        Self { handler }
    }
}

#[async_trait]
impl<C, H> CommandStage<C> for HandlerStage<H>
where
    C: Command,
    H: CommandHandler<C>,
{
    async fn invoke(&self, ctx: &AppContext, cmd: Arc<C>) -> AppResult<Vec<EventEnvelope>> {
        self.handler.handle(ctx, &cmd).await
    }
}

#[async_trait]
impl<Q, H> QueryStage<Q> for HandlerStage<H>
where
    Q: Query,
    H: QueryHandler<Q>,
{
    async fn invoke(&self, ctx: &AppContext, q: &Q) -> AppResult<Q::Dto> {
        self.handler.handle(ctx, q).await
    }
}
