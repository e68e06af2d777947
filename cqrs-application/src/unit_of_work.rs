//! 工作单元（UnitOfWork）
//!
//! 具体的持久化会话由基础设施层提供；管道只在事务阶段调用 `clear` 与 `commit`。
//!
use crate::error::AppResult;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// 丢弃尚未提交的变更
    async fn clear(&self) -> AppResult<()>;

    /// 提交变更；只在内层调用成功后调用
    async fn commit(&self) -> AppResult<()>;
}

/// 为每次调用创建新的工作单元，同一实例不会在并发调用之间共享
pub trait UnitOfWorkFactory: Send + Sync {
    fn create(&self) -> Arc<dyn UnitOfWork>;
}

impl<F> UnitOfWorkFactory for F
where
    F: Fn() -> Arc<dyn UnitOfWork> + Send + Sync,
{
    fn create(&self) -> Arc<dyn UnitOfWork> {
        self()
    }
}

/// 不做任何事的工作单元（未接入持久化时的默认值）
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopUnitOfWork;

#[async_trait]
impl UnitOfWork for NoopUnitOfWork {
    async fn clear(&self) -> AppResult<()> {
        Ok(())
    }

    async fn commit(&self) -> AppResult<()> {
        Ok(())
    }
}
