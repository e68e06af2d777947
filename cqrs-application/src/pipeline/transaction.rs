use super::CommandStage;
use crate::command::Command;
use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::markers::{Marker, has_marker};
use async_trait::async_trait;
use cqrs_domain::domain_event::EventEnvelope;
use std::sync::Arc;

/// 事务边界：仅对携带 Transactional 标记的命令生效
///
/// 先 `clear` 再调用内层，内层成功才 `commit`；内层失败时工作单元保持清理后的状态，错误原样返回。
pub struct TransactionStage<I> {
    inner: I,
}

impl<I> TransactionStage<I> {
    pub fn new(inner: I) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<C, I> CommandStage<C> for TransactionStage<I>
where
    C: Command,
    I: CommandStage<C>,
{
    async fn invoke(&self, ctx: &AppContext, cmd: Arc<C>) -> AppResult<Vec<EventEnvelope>> {
        if !has_marker::<C>(Marker::Transactional) {
            return self.inner.invoke(ctx, cmd).await;
        }

        let Some(uow) = ctx.unit_of_work().cloned() else {
            return Err(AppError::Infra(format!(
                "no unit of work in scope for transactional command {}",
                C::NAME
            )));
        };

        uow.clear().await?;
        let events = self.inner.invoke(ctx, cmd).await?;
        uow.commit().await?;
        Ok(events)
    }
}
