use super::{CommandStage, QueryStage};
use crate::command::Command;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::query::Query;
use crate::scope::LifetimeScope;
use crate::unit_of_work::UnitOfWorkFactory;
use async_trait::async_trait;
use cqrs_domain::domain_event::EventEnvelope;
use std::sync::Arc;

/// 为内层阶段开启本次调用的作用域（独立的工作单元与延后动作队列）
pub struct LifetimeScopeStage<I> {
    inner: I,
    factory: Arc<dyn UnitOfWorkFactory>,
}

impl<I> LifetimeScopeStage<I> {
    pub fn new(inner: I, factory: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self { inner, factory }
    }

    fn open(&self, ctx: &AppContext, request: &'static str) -> (AppContext, ScopeGuard) {
        let scope = LifetimeScope::open(self.factory.create());
        tracing::debug!(scope_id = %scope.id(), request, "lifetime scope opened");
        (ctx.with_scope(scope.clone()), ScopeGuard { scope, request })
    }
}

/// 离开作用域时关闭（包括 panic 与 future 被丢弃的情况）
struct ScopeGuard {
    scope: LifetimeScope,
    request: &'static str,
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        if self.scope.close() {
            tracing::debug!(
                scope_id = %self.scope.id(),
                request = self.request,
                "lifetime scope closed"
            );
        }
    }
}

#[async_trait]
impl<C, I> CommandStage<C> for LifetimeScopeStage<I>
where
    C: Command,
    I: CommandStage<C>,
{
    async fn invoke(&self, ctx: &AppContext, cmd: Arc<C>) -> AppResult<Vec<EventEnvelope>> {
        let (scoped, _guard) = self.open(ctx, C::NAME);
        self.inner.invoke(&scoped, cmd).await
    }
}

#[async_trait]
impl<Q, I> QueryStage<Q> for LifetimeScopeStage<I>
where
    Q: Query,
    I: QueryStage<Q>,
{
    async fn invoke(&self, ctx: &AppContext, q: &Q) -> AppResult<Q::Dto> {
        let (scoped, _guard) = self.open(ctx, Q::NAME);
        self.inner.invoke(&scoped, q).await
    }
}
