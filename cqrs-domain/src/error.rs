//! 领域层统一错误定义
//!
//! 聚焦事件分发与值校验的最小必要集合，便于在应用层统一转换为 `AppError`。
//!
use thiserror::Error;

/// 统一错误类型（基础库最小必要集）
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DomainError {
    // --- 事件分发 ---
    #[error("event handler error: handler={handler}, reason={reason}")]
    EventHandler { handler: String, reason: String },
    #[error("event handler panicked: handler={handler}")]
    SubscriberPanicked { handler: String },
    #[error("type mismatch: expected={expected}, found={found}")]
    TypeMismatch { expected: String, found: String },

    // --- 领域规则 ---
    #[error("invalid value: {reason}")]
    InvalidValue { reason: String },
}

/// 统一 Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    pub fn invalid_value(reason: impl Into<String>) -> Self {
        DomainError::InvalidValue {
            reason: reason.into(),
        }
    }

    /// 订阅者名称（仅事件分发相关的错误携带）
    pub fn handler(&self) -> Option<&str> {
        match self {
            DomainError::EventHandler { handler, .. }
            | DomainError::SubscriberPanicked { handler } => Some(handler),
            _ => None,
        }
    }
}
