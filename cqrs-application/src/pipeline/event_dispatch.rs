use super::CommandStage;
use crate::command::Command;
use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::markers::{Marker, has_marker};
use async_trait::async_trait;
use cqrs_domain::domain_event::EventEnvelope;
use cqrs_domain::eventing::EventDispatchEngine;
use std::sync::Arc;

/// 领域事件传播
///
/// - 成功：处理器产生的事件在前，携带 EventListener 标记的命令本身在后，整批交给引擎的
///   `publish`（默认后台执行，调用方不等待）；
/// - 失败：错误携带 EventListener 标记时先同步分发给该错误类型的订阅者，再原样返回；
///   其他错误不经过引擎。
pub struct EventDispatchStage<I> {
    inner: I,
    engine: Arc<EventDispatchEngine>,
}

impl<I> EventDispatchStage<I> {
    pub fn new(inner: I, engine: Arc<EventDispatchEngine>) -> Self {
        Self { inner, engine }
    }
}

#[async_trait]
impl<C, I> CommandStage<C> for EventDispatchStage<I>
where
    C: Command,
    I: CommandStage<C>,
{
    async fn invoke(&self, ctx: &AppContext, cmd: Arc<C>) -> AppResult<Vec<EventEnvelope>> {
        match self.inner.invoke(ctx, cmd.clone()).await {
            Ok(events) => {
                let mut batch = events.clone();
                if has_marker::<C>(Marker::EventListener) {
                    batch.push(EventEnvelope::from_shared(C::NAME, cmd));
                }
                self.engine.publish(batch).await;
                Ok(events)
            }
            Err(AppError::Business(failure)) if failure.is_event_listener() => {
                let report = self.engine.dispatch_now(&failure.to_envelope()).await;
                tracing::debug!(
                    command = C::NAME,
                    error_type = failure.type_name(),
                    delivered = report.delivered(),
                    failed = report.failures().len(),
                    "dispatched failure as event"
                );
                Err(AppError::Business(failure))
            }
            Err(err) => Err(err),
        }
    }
}
