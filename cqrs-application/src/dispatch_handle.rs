use crate::error::{AppError, AppResult};
use futures_util::FutureExt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::task::JoinHandle;

/// 异步分发的句柄：等待它即可拿到管道的结果
///
/// 管道运行在独立的 tokio 任务上；任务 panic 或被 [`abort`](Self::abort) 时得到 `AppError::Join`。
/// 丢弃句柄不会取消任务。
#[derive(Debug)]
pub struct DispatchHandle<T> {
    task: JoinHandle<AppResult<T>>,
}

impl<T> DispatchHandle<T>
where
    T: Send + 'static,
{
    pub(crate) fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = AppResult<T>> + Send + 'static,
    {
        Self {
            task: tokio::spawn(future),
        }
    }
}

impl<T> DispatchHandle<T> {
    pub fn abort(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl<T> Future for DispatchHandle<T> {
    type Output = AppResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.task.poll_unpin(cx).map(|joined| match joined {
            Ok(result) => result,
            Err(err) => Err(AppError::Join(err.to_string())),
        })
    }
}
