use crate::{
    command::Command,
    command_bus::CommandBus,
    command_handler::CommandHandler,
    context::AppContext,
    dispatch_handle::DispatchHandle,
    error::{AppError, AppResult},
    pipeline::{CommandStage, command_pipeline},
    services::PipelineServices,
};
use async_trait::async_trait;
use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::Instrument;

/// 类型擦除后的管道：实际类型为 `Arc<dyn CommandStage<C>>`
type ErasedPipeline = Box<dyn Any + Send + Sync>;

/// 基于内存的 CommandBus 实现
/// - 启动期通过构建器按 TypeId 注册命令处理器，并为每种命令组装一次装饰器管道
/// - 构建完成后只读，可在并发调用间无锁共享
pub struct InMemoryCommandBus {
    pipelines: HashMap<TypeId, (&'static str, ErasedPipeline)>,
    services: PipelineServices,
}

/// `InMemoryCommandBus` 的构建器（启动期使用）
pub struct InMemoryCommandBusBuilder {
    pipelines: HashMap<TypeId, (&'static str, ErasedPipeline)>,
    services: PipelineServices,
}

impl InMemoryCommandBus {
    pub fn builder(services: PipelineServices) -> InMemoryCommandBusBuilder {
        InMemoryCommandBusBuilder {
            pipelines: HashMap::new(),
            services,
        }
    }

    pub fn services(&self) -> &PipelineServices {
        &self.services
    }

    /// 异步分发：管道在新的 tokio 任务上执行，立即返回句柄
    ///
    /// 需要在 tokio 运行时内调用。路由失败同样通过句柄返回。
    pub fn dispatch_async<C>(&self, ctx: AppContext, cmd: C) -> DispatchHandle<()>
    where
        C: Command,
    {
        let resolved = ctx.ensure_well_formed().and_then(|()| self.pipeline::<C>());
        let span = tracing::debug_span!("dispatch_async", command = C::NAME);

        DispatchHandle::spawn(
            async move {
                let pipeline = resolved?;
                pipeline.invoke(&ctx, Arc::new(cmd)).await.map(|_| ())
            }
            .instrument(span),
        )
    }

    /// 获取已注册的命令名列表（按名称排序）
    pub fn registered_commands(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.pipelines.values().map(|(name, _)| *name).collect();
        names.sort_unstable();
        names
    }

    pub fn is_registered<C: Command>(&self) -> bool {
        self.pipelines.contains_key(&TypeId::of::<C>())
    }

    fn pipeline<C: Command>(&self) -> AppResult<Arc<dyn CommandStage<C>>> {
        let Some((_, erased)) = self.pipelines.get(&TypeId::of::<C>()) else {
            return Err(AppError::HandlerNotFound(C::NAME));
        };

        // 键与值由同一个泛型 C 写入，正常情况下不会失败
        (**erased)
            .downcast_ref::<Arc<dyn CommandStage<C>>>()
            .cloned()
            .ok_or(AppError::TypeMismatch {
                expected: type_name::<Arc<dyn CommandStage<C>>>(),
                found: "unknown",
            })
    }
}

impl InMemoryCommandBusBuilder {
    /// 注册命令处理器；同一命令类型重复注册返回 `AlreadyRegisteredCommand`
    pub fn register<C, H>(&mut self, handler: Arc<H>) -> AppResult<&mut Self>
    where
        C: Command,
        H: CommandHandler<C> + 'static,
    {
        let key = TypeId::of::<C>();
        if self.pipelines.contains_key(&key) {
            return Err(AppError::AlreadyRegisteredCommand { command: C::NAME });
        }

        let pipeline: Arc<dyn CommandStage<C>> = command_pipeline::<C, H>(handler, &self.services);
        self.pipelines.insert(key, (C::NAME, Box::new(pipeline)));

        Ok(self)
    }

    pub fn build(self) -> InMemoryCommandBus {
        InMemoryCommandBus {
            pipelines: self.pipelines,
            services: self.services,
        }
    }
}

#[async_trait]
impl CommandBus for InMemoryCommandBus {
    async fn dispatch<C: Command>(&self, ctx: &AppContext, cmd: C) -> AppResult<()> {
        ctx.ensure_well_formed()?;
        let pipeline = self.pipeline::<C>()?;

        tracing::debug!(command = C::NAME, "dispatching command");
        pipeline.invoke(ctx, Arc::new(cmd)).await.map(|_| ())
    }
}

impl fmt::Debug for InMemoryCommandBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryCommandBus")
            .field("commands", &self.registered_commands())
            .finish_non_exhaustive()
    }
}
