use crate::error::{AppError, AppResult};
use crate::scope::{LifetimeScope, PostActions};
use crate::unit_of_work::UnitOfWork;
use cqrs_domain::domain_event::BusinessContext;
use std::sync::Arc;

/// 应用层上下文（Application Context）
///
/// 承载一次应用层调用（命令/查询）所需的横切信息，例如：
/// - 业务语境（`BusinessContext`）：关联追踪 `correlation_id`、因果链 `causation_id`、
///   执行者类型/ID 等；
/// - 幂等键（`idempotency_key`）：用于在基础设施层实现请求幂等（如 API 层重复提交保护）；
/// - 生命周期作用域：由管道的 LifetimeScope 阶段设置，处理器从中取得本次调用的
///   工作单元与延后动作队列。
///
/// 典型用法：
/// ```rust
/// use cqrs_application::context::AppContext;
/// use cqrs_domain::domain_event::BusinessContext;
///
/// let ctx = AppContext::new(
///     BusinessContext::builder()
///         .maybe_correlation_id(Some("cor-123".into()))
///         .maybe_causation_id(Some("cau-abc".into()))
///         .maybe_actor_type(Some("user".into()))
///         .maybe_actor_id(Some("u-1".into()))
///         .build(),
/// )
/// .with_idempotency_key("idem-xyz");
///
/// assert!(ctx.scope().is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct AppContext {
    /// 业务语境（链路追踪、审计主体、操作因果）
    pub biz: BusinessContext,
    /// 幂等键（可选）：为空则由上层或基础设施决定是否参与幂等
    pub idempotency_key: Option<String>,
    scope: Option<LifetimeScope>,
}

impl AppContext {
    pub fn new(biz: BusinessContext) -> Self {
        Self {
            biz,
            idempotency_key: None,
            scope: None,
        }
    }

    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    /// 派生一个绑定了作用域的上下文（原上下文不变）
    pub fn with_scope(&self, scope: LifetimeScope) -> Self {
        Self {
            scope: Some(scope),
            ..self.clone()
        }
    }

    pub fn scope(&self) -> Option<&LifetimeScope> {
        self.scope.as_ref()
    }

    /// 本次调用的工作单元（仅在作用域内可用）
    pub fn unit_of_work(&self) -> Option<&Arc<dyn UnitOfWork>> {
        self.scope.as_ref().map(LifetimeScope::unit_of_work)
    }

    /// 本次调用的延后动作队列（仅在作用域内可用）
    pub fn post_actions(&self) -> Option<&PostActions> {
        self.scope.as_ref().map(LifetimeScope::post_actions)
    }

    /// 分发入口的参数检查：幂等键一旦给出就不能是空白
    pub(crate) fn ensure_well_formed(&self) -> AppResult<()> {
        match &self.idempotency_key {
            Some(key) if key.trim().is_empty() => Err(AppError::InvalidArgument(
                "idempotency_key must not be blank".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit_of_work::NoopUnitOfWork;

    #[test]
    fn blank_idempotency_key_is_rejected() {
        let ctx = AppContext::default().with_idempotency_key("   ");

        assert!(matches!(
            ctx.ensure_well_formed(),
            Err(AppError::InvalidArgument(_))
        ));
        assert!(AppContext::default().ensure_well_formed().is_ok());
        assert!(
            AppContext::default()
                .with_idempotency_key("idem-1")
                .ensure_well_formed()
                .is_ok()
        );
    }

    #[test]
    fn scoped_context_exposes_scope_services() {
        let ctx = AppContext::default();
        assert!(ctx.unit_of_work().is_none());

        let scope = LifetimeScope::open(Arc::new(NoopUnitOfWork));
        let scoped = ctx.with_scope(scope.clone());

        assert_eq!(scoped.scope().map(LifetimeScope::id), Some(scope.id()));
        assert!(scoped.unit_of_work().is_some());
        assert!(scoped.post_actions().is_some_and(PostActions::is_empty));
        assert!(ctx.scope().is_none());
    }
}
