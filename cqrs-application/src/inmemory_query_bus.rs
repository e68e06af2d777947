use crate::{
    context::AppContext,
    dispatch_handle::DispatchHandle,
    error::{AppError, AppResult},
    pipeline::{QueryStage, query_pipeline},
    query::Query,
    query_bus::QueryBus,
    query_handler::QueryHandler,
    services::PipelineServices,
};
use async_trait::async_trait;
use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::Instrument;

/// 类型擦除后的管道：实际类型为 `Arc<dyn QueryStage<Q>>`
type ErasedPipeline = Box<dyn Any + Send + Sync>;

/// 基于内存的 QueryBus 实现
/// - 通过 TypeId 注册不同 Query 对应的 Handler，返回类型由 `Query::Dto` 唯一确定
/// - 以类型擦除方式保存管道，并在调用端还原
pub struct InMemoryQueryBus {
    pipelines: HashMap<TypeId, (&'static str, ErasedPipeline)>,
    services: PipelineServices,
}

/// `InMemoryQueryBus` 的构建器（启动期使用）
pub struct InMemoryQueryBusBuilder {
    pipelines: HashMap<TypeId, (&'static str, ErasedPipeline)>,
    services: PipelineServices,
}

impl InMemoryQueryBus {
    pub fn builder(services: PipelineServices) -> InMemoryQueryBusBuilder {
        InMemoryQueryBusBuilder {
            pipelines: HashMap::new(),
            services,
        }
    }

    pub fn services(&self) -> &PipelineServices {
        &self.services
    }

    /// 异步分发：管道在新的 tokio 任务上执行，句柄完成时给出 DTO
    pub fn dispatch_async<Q>(&self, ctx: AppContext, q: Q) -> DispatchHandle<Q::Dto>
    where
        Q: Query,
    {
        let resolved = ctx.ensure_well_formed().and_then(|()| self.pipeline::<Q>());
        let span = tracing::debug_span!("dispatch_async", query = Q::NAME);

        DispatchHandle::spawn(
            async move {
                let pipeline = resolved?;
                pipeline.invoke(&ctx, &q).await
            }
            .instrument(span),
        )
    }

    /// 获取已注册的查询类型名列表（按名称排序）
    pub fn registered_queries(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.pipelines.values().map(|(name, _)| *name).collect();
        names.sort_unstable();
        names
    }

    pub fn is_registered<Q: Query>(&self) -> bool {
        self.pipelines.contains_key(&TypeId::of::<Q>())
    }

    fn pipeline<Q: Query>(&self) -> AppResult<Arc<dyn QueryStage<Q>>> {
        let Some((_, erased)) = self.pipelines.get(&TypeId::of::<Q>()) else {
            return Err(AppError::HandlerNotFound(Q::NAME));
        };

        (**erased)
            .downcast_ref::<Arc<dyn QueryStage<Q>>>()
            .cloned()
            .ok_or(AppError::TypeMismatch {
                expected: type_name::<Arc<dyn QueryStage<Q>>>(),
                found: "unknown",
            })
    }
}

impl InMemoryQueryBusBuilder {
    /// 注册查询处理器；同一查询类型重复注册返回 `AlreadyRegisteredQuery`
    pub fn register<Q, H>(&mut self, handler: Arc<H>) -> AppResult<&mut Self>
    where
        Q: Query,
        H: QueryHandler<Q> + 'static,
    {
        let key = TypeId::of::<Q>();
        if self.pipelines.contains_key(&key) {
            return Err(AppError::AlreadyRegisteredQuery { query: Q::NAME });
        }

        let pipeline: Arc<dyn QueryStage<Q>> = query_pipeline::<Q, H>(handler, &self.services);
        self.pipelines.insert(key, (Q::NAME, Box::new(pipeline)));

        Ok(self)
    }

    pub fn build(self) -> InMemoryQueryBus {
        InMemoryQueryBus {
            pipelines: self.pipelines,
            services: self.services,
        }
    }
}

#[async_trait]
impl QueryBus for InMemoryQueryBus {
    async fn dispatch<Q: Query>(&self, ctx: &AppContext, q: Q) -> AppResult<Q::Dto> {
        ctx.ensure_well_formed()?;
        let pipeline = self.pipeline::<Q>()?;

        tracing::debug!(query = Q::NAME, "dispatching query");
        pipeline.invoke(ctx, &q).await
    }
}

impl fmt::Debug for InMemoryQueryBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryQueryBus")
            .field("queries", &self.registered_queries())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::Dto;
    use crate::markers::Marked;
    use serde::Serialize;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::task::JoinSet;

    #[derive(Debug, Serialize)]
    struct Get;

    impl Marked for Get {}

    impl Query for Get {
        const NAME: &'static str = "Get";
        type Dto = NumDto;
    }

    #[derive(Debug, Serialize)]
    struct Missing;

    impl Marked for Missing {}

    impl Query for Missing {
        const NAME: &'static str = "Missing";
        type Dto = NumDto;
    }

    #[derive(Debug, Serialize, PartialEq, Eq)]
    struct NumDto(pub usize);

    impl Dto for NumDto {}

    struct GetHandler {
        counter: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl QueryHandler<Get> for GetHandler {
        async fn handle(&self, _ctx: &AppContext, _q: &Get) -> AppResult<NumDto> {
            let v = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(NumDto(v))
        }
    }

    fn bus() -> InMemoryQueryBus {
        let mut builder = InMemoryQueryBus::builder(PipelineServices::default());
        builder
            .register::<Get, _>(Arc::new(GetHandler {
                counter: Arc::new(AtomicUsize::new(0)),
            }))
            .unwrap();
        builder.build()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn register_and_dispatch_works() {
        let bus = bus();

        let NumDto(n) = bus.dispatch(&AppContext::default(), Get).await.unwrap();

        assert_eq!(n, 1);
        assert_eq!(bus.registered_queries(), vec!["Get"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn not_found_error_when_unregistered() {
        let err = bus().dispatch(&AppContext::default(), Missing).await.unwrap_err();

        match err {
            AppError::HandlerNotFound(name) => assert_eq!(name, "Missing"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut builder = InMemoryQueryBus::builder(PipelineServices::default());
        let handler = Arc::new(GetHandler {
            counter: Arc::new(AtomicUsize::new(0)),
        });
        builder.register::<Get, _>(handler.clone()).unwrap();

        let err = builder.register::<Get, _>(handler).err().unwrap();

        assert!(matches!(err, AppError::AlreadyRegisteredQuery { query: "Get" }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_dispatch_is_safe() {
        let bus = Arc::new(bus());

        let mut set = JoinSet::new();
        for _ in 0..100 {
            let bus = bus.clone();
            set.spawn(async move { bus.dispatch(&AppContext::default(), Get).await.unwrap() });
        }
        let mut results = Vec::new();
        while let Some(res) = set.join_next().await {
            results.push(res.unwrap().0);
        }
        results.sort_unstable();
        assert_eq!(results.len(), 100);
        assert_eq!(results[0], 1);
        assert_eq!(results[99], 100);
    }

    #[tokio::test]
    async fn dispatch_async_returns_the_dto() {
        let bus = bus();

        let handle = bus.dispatch_async(AppContext::default(), Get);

        assert_eq!(handle.await.unwrap(), NumDto(1));
    }
}
