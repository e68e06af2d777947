use crate::business_error::BusinessError;
use crate::markers::Marked;
use crate::validation::ValidationError;
use cqrs_domain::error::DomainError;
use std::error::Error as StdError;

/// 应用层统一错误
///
/// 分发调用方拿到的始终是管道中产生的原始错误值，管道各阶段不做包装或吞没。
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("domain: {0}")]
    Domain(#[from] DomainError),

    /// 调用参数本身不合法（例如幂等键存在但为空白）
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    /// 处理器抛出的业务错误，保留具体类型与标记
    #[error(transparent)]
    Business(BusinessError),

    #[error("infra: {0}")]
    Infra(String),

    #[error("handler not found: {0}")]
    HandlerNotFound(&'static str),

    #[error("handler already registered: command={command}")]
    AlreadyRegisteredCommand { command: &'static str },

    #[error("handler already registered: query={query}")]
    AlreadyRegisteredQuery { query: &'static str },

    #[error("type mismatch: expected={expected}, found={found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// 异步分发任务 panic 或被取消
    #[error("dispatch task failed: {0}")]
    Join(String),
}

/// 统一 Result 类型别名
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// 把任意业务错误包装为 `AppError::Business`
    pub fn business<E>(error: E) -> Self
    where
        E: StdError + Marked + Send + Sync + 'static,
    {
        AppError::Business(BusinessError::new(error))
    }

    pub fn as_business(&self) -> Option<&BusinessError> {
        match self {
            AppError::Business(b) => Some(b),
            _ => None,
        }
    }

    /// 还原业务错误的具体类型
    pub fn downcast_business_ref<E: 'static>(&self) -> Option<&E> {
        self.as_business().and_then(BusinessError::downcast_ref::<E>)
    }
}

impl From<BusinessError> for AppError {
    fn from(value: BusinessError) -> Self {
        AppError::Business(value)
    }
}
