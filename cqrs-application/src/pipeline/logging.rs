use super::{CommandStage, QueryStage};
use crate::command::Command;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::logging::{LogLevel, Logger, ParameterSerializer};
use crate::markers::{Marked, Marker, has_marker};
use crate::query::Query;
use async_trait::async_trait;
use cqrs_domain::domain_event::EventEnvelope;
use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone, Copy)]
enum RequestKind {
    Command,
    Query,
}

impl RequestKind {
    fn noun(self) -> &'static str {
        match self {
            RequestKind::Command => "command",
            RequestKind::Query => "query",
        }
    }

    fn title(self) -> &'static str {
        match self {
            RequestKind::Command => "Command",
            RequestKind::Query => "Query",
        }
    }
}

/// 执行日志：仅对携带 Log 标记的请求生效
///
/// 记录请求名称与参数（序列化失败降级为警告），失败时记录错误及其 source，
/// 无论成败最后都记录耗时。错误原样返回。
pub struct LoggingStage<I> {
    inner: I,
    logger: Arc<dyn Logger>,
    serializer: Arc<dyn ParameterSerializer>,
}

impl<I> LoggingStage<I> {
    pub fn new(
        inner: I,
        logger: Arc<dyn Logger>,
        serializer: Arc<dyn ParameterSerializer>,
    ) -> Self {
        Self {
            inner,
            logger,
            serializer,
        }
    }

    fn enabled<T: Marked>() -> bool {
        has_marker::<T>(Marker::Log)
    }

    fn log_start(
        &self,
        kind: RequestKind,
        name: &str,
        params: &dyn erased_serde::Serialize,
    ) -> Instant {
        let started = Instant::now();
        self.logger.log(
            LogLevel::Info,
            &format!("Executing {} \"{}\" with the parameters:", kind.noun(), name),
        );

        match self.serializer.serialize(params) {
            Ok(text) => self.logger.log(LogLevel::Info, &text),
            Err(err) => self.logger.log(
                LogLevel::Warn,
                &format!("Could not serialize the parameters: {err}"),
            ),
        }

        started
    }

    fn log_finish<T>(
        &self,
        kind: RequestKind,
        name: &str,
        started: Instant,
        result: &AppResult<T>,
    ) {
        if let Err(err) = result {
            self.logger.log(LogLevel::Error, &format!("Exception caught: {err}"));
            if let Some(source) = err.source() {
                self.logger
                    .log(LogLevel::Error, &format!("Inner exception caught: {source}"));
            }
        }

        self.logger.log(
            LogLevel::Info,
            &format!("{} \"{}\" executed in {:?}.", kind.title(), name, started.elapsed()),
        );
    }
}

#[async_trait]
impl<C, I> CommandStage<C> for LoggingStage<I>
where
    C: Command,
    I: CommandStage<C>,
{
    async fn invoke(&self, ctx: &AppContext, cmd: Arc<C>) -> AppResult<Vec<EventEnvelope>> {
        if !Self::enabled::<C>() {
            return self.inner.invoke(ctx, cmd).await;
        }

        let started = self.log_start(RequestKind::Command, C::NAME, &*cmd);
        let result = self.inner.invoke(ctx, cmd).await;
        self.log_finish(RequestKind::Command, C::NAME, started, &result);
        result
    }
}

#[async_trait]
impl<Q, I> QueryStage<Q> for LoggingStage<I>
where
    Q: Query,
    I: QueryStage<Q>,
{
    async fn invoke(&self, ctx: &AppContext, q: &Q) -> AppResult<Q::Dto> {
        if !Self::enabled::<Q>() {
            return self.inner.invoke(ctx, q).await;
        }

        let started = self.log_start(RequestKind::Query, Q::NAME, q);
        let result = self.inner.invoke(ctx, q).await;
        self.log_finish(RequestKind::Query, Q::NAME, started, &result);
        result
    }
}
