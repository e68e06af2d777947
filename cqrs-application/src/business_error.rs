//! 业务错误（BusinessError）
//!
//! 处理器可以返回任意实现了 `Error + Marked` 的错误类型。包装后仍保留：
//! - 具体类型（可 downcast、可按 `TypeId` 匹配订阅者）；
//! - 该类型声明的标记（携带 EventListener 时作为事件同步分发）；
//! - 原错误的 `Display` 与 `source`。
//!
//! 错误对象与事件载荷共享同一份 `Arc`，克隆只增加引用计数。
//!
use crate::markers::{Marked, Marker, Markers};
use cqrs_domain::domain_event::EventEnvelope;
use std::any::{Any, TypeId, type_name};
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub struct BusinessError {
    error: Arc<dyn StdError + Send + Sync>,
    payload: Arc<dyn Any + Send + Sync>,
    type_id: TypeId,
    type_name: &'static str,
    markers: Markers,
}

impl BusinessError {
    pub fn new<E>(error: E) -> Self
    where
        E: StdError + Marked + Send + Sync + 'static,
    {
        let shared = Arc::new(error);
        Self {
            error: shared.clone(),
            payload: shared,
            type_id: TypeId::of::<E>(),
            type_name: type_name::<E>(),
            markers: E::MARKERS,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn markers(&self) -> Markers {
        self.markers
    }

    pub fn is_event_listener(&self) -> bool {
        self.markers.contains(Marker::EventListener)
    }

    pub fn is<E: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<E>()
    }

    pub fn downcast_ref<E: 'static>(&self) -> Option<&E> {
        (*self.payload).downcast_ref::<E>()
    }

    pub fn error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.error
    }

    /// 以错误本身为载荷的事件信封（订阅者按错误的具体类型匹配）
    pub fn to_envelope(&self) -> EventEnvelope {
        EventEnvelope::from_erased(self.type_id, self.type_name, self.payload.clone())
    }
}

impl fmt::Display for BusinessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.error, f)
    }
}

impl fmt::Debug for BusinessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BusinessError")
            .field("type", &self.type_name)
            .field("markers", &self.markers)
            .field("error", &self.error)
            .finish()
    }
}

impl StdError for BusinessError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.error.source()
    }
}
