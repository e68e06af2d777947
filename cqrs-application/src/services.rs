use crate::logging::{JsonParameterSerializer, Logger, ParameterSerializer, TracingLogger};
use crate::unit_of_work::{NoopUnitOfWork, UnitOfWork, UnitOfWorkFactory};
use bon::Builder;
use cqrs_domain::eventing::EventDispatchEngine;
use std::fmt;
use std::sync::Arc;

/// 管道各阶段共享的协作者，命令总线与查询总线的构建器共用
///
/// 所有字段都有默认值：
/// ```rust
/// use cqrs_application::services::PipelineServices;
///
/// let services = PipelineServices::builder().build();
/// assert!(services.event_engine.registry().is_empty());
/// ```
#[derive(Builder, Clone)]
pub struct PipelineServices {
    #[builder(default = Arc::new(TracingLogger) as Arc<dyn Logger>)]
    pub logger: Arc<dyn Logger>,

    #[builder(default = Arc::new(JsonParameterSerializer) as Arc<dyn ParameterSerializer>)]
    pub serializer: Arc<dyn ParameterSerializer>,

    #[builder(default = Arc::new(noop_unit_of_work) as Arc<dyn UnitOfWorkFactory>)]
    pub unit_of_work_factory: Arc<dyn UnitOfWorkFactory>,

    #[builder(default = Arc::new(EventDispatchEngine::default()))]
    pub event_engine: Arc<EventDispatchEngine>,
}

impl Default for PipelineServices {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for PipelineServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineServices")
            .field("dispatch_mode", &self.event_engine.mode())
            .finish_non_exhaustive()
    }
}

fn noop_unit_of_work() -> Arc<dyn UnitOfWork> {
    Arc::new(NoopUnitOfWork)
}
