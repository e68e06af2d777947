use super::CommandStage;
use crate::command::Command;
use crate::context::AppContext;
use crate::error::AppResult;
use async_trait::async_trait;
use cqrs_domain::domain_event::EventEnvelope;
use std::sync::Arc;

/// 内层成功后依次执行作用域中登记的延后动作，遇到第一个失败即返回该错误；
/// 内层失败时丢弃所有延后动作。没有作用域时透传。
pub struct PostActionStage<I> {
    inner: I,
}

impl<I> PostActionStage<I> {
    pub fn new(inner: I) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<C, I> CommandStage<C> for PostActionStage<I>
where
    C: Command,
    I: CommandStage<C>,
{
    async fn invoke(&self, ctx: &AppContext, cmd: Arc<C>) -> AppResult<Vec<EventEnvelope>> {
        let Some(post_actions) = ctx.post_actions() else {
            return self.inner.invoke(ctx, cmd).await;
        };

        post_actions.reset();
        let result = self.inner.invoke(ctx, cmd).await;
        let actions = post_actions.take();
        let events = result?;

        tracing::debug!(command = C::NAME, actions = actions.len(), "running post actions");
        for action in actions {
            action().await?;
        }
        Ok(events)
    }
}
