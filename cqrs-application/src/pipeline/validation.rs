use super::{CommandStage, QueryStage};
use crate::command::Command;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::query::Query;
use async_trait::async_trait;
use cqrs_domain::domain_event::EventEnvelope;
use std::sync::Arc;

/// 最外层：结构校验失败时直接返回 `ValidationFailed`，内层阶段一个都不执行
pub struct ValidationStage<I> {
    inner: I,
}

impl<I> ValidationStage<I> {
    pub fn new(inner: I) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<C, I> CommandStage<C> for ValidationStage<I>
where
    C: Command,
    I: CommandStage<C>,
{
    async fn invoke(&self, ctx: &AppContext, cmd: Arc<C>) -> AppResult<Vec<EventEnvelope>> {
        cmd.validate()?;
        self.inner.invoke(ctx, cmd).await
    }
}

#[async_trait]
impl<Q, I> QueryStage<Q> for ValidationStage<I>
where
    Q: Query,
    I: QueryStage<Q>,
{
    async fn invoke(&self, ctx: &AppContext, q: &Q) -> AppResult<Q::Dto> {
        q.validate()?;
        self.inner.invoke(ctx, q).await
    }
}
