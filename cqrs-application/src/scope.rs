//! 生命周期作用域（LifetimeScope）
//!
//! 每次分发调用开启一个作用域，持有本次调用专属的工作单元与延后动作队列。
//! 作用域在 LifetimeScope 阶段的所有退出路径上关闭（成功、失败、panic 或被取消）。
//!
use crate::error::AppResult;
use crate::unit_of_work::UnitOfWork;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

pub(crate) type PostAction = Box<dyn FnOnce() -> BoxFuture<'static, AppResult<()>> + Send>;

/// 延后动作队列：处理器成功（且事务已提交）后按登记顺序执行
#[derive(Default)]
pub struct PostActions {
    queue: Mutex<Vec<PostAction>>,
}

impl PostActions {
    /// 登记一个延后动作
    pub fn defer<F, Fut>(&self, action: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = AppResult<()>> + Send + 'static,
    {
        self.lock().push(Box::new(move || action().boxed()));
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub(crate) fn reset(&self) {
        self.lock().clear();
    }

    pub(crate) fn take(&self) -> Vec<PostAction> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<PostAction>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for PostActions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostActions").field("pending", &self.len()).finish()
    }
}

struct ScopeInner {
    id: Uuid,
    unit_of_work: Arc<dyn UnitOfWork>,
    post_actions: PostActions,
    closed: AtomicBool,
}

/// 单次调用的作用域，克隆共享同一份状态
#[derive(Clone)]
pub struct LifetimeScope {
    inner: Arc<ScopeInner>,
}

impl LifetimeScope {
    pub fn open(unit_of_work: Arc<dyn UnitOfWork>) -> Self {
        Self {
            inner: Arc::new(ScopeInner {
                id: Uuid::new_v4(),
                unit_of_work,
                post_actions: PostActions::default(),
                closed: AtomicBool::new(false),
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn unit_of_work(&self) -> &Arc<dyn UnitOfWork> {
        &self.inner.unit_of_work
    }

    pub fn post_actions(&self) -> &PostActions {
        &self.inner.post_actions
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// 关闭作用域并丢弃未执行的延后动作；重复关闭返回 `false`
    pub fn close(&self) -> bool {
        let first = !self.inner.closed.swap(true, Ordering::AcqRel);
        if first {
            self.inner.post_actions.reset();
        }
        first
    }
}

impl fmt::Debug for LifetimeScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifetimeScope")
            .field("id", &self.inner.id)
            .field("closed", &self.is_closed())
            .field("post_actions", &self.inner.post_actions)
            .finish_non_exhaustive()
    }
}
