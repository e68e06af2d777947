use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use super::domain_event_trait::DomainEvent;
use super::metadata::Metadata;

type SharedPayload = Arc<dyn Any + Send + Sync>;

/// 事件信封：类型擦除后的事件载荷 + 元数据
///
/// - 处理器产生的领域事件、携带 EventListener 标记的命令或错误，都以信封形式交给分发引擎；
/// - `type_id` 记录载荷的具体类型，订阅按该类型精确匹配（不做向上转型）；
/// - 载荷以 `Arc` 共享，克隆信封不会复制事件本身，错误信封与原错误指向同一份数据。
#[derive(Clone)]
pub struct EventEnvelope {
    metadata: Metadata,
    event_type: &'static str,
    type_id: TypeId,
    payload: SharedPayload,
}

impl EventEnvelope {
    /// 封装处理器产生的领域事件
    pub fn new<E: DomainEvent>(event: E) -> Self {
        Self::from_shared(E::EVENT_TYPE, Arc::new(event))
    }

    /// 封装一个已共享的对象（例如执行完成后作为事件传播的命令）
    pub fn from_shared<T>(event_type: &'static str, payload: Arc<T>) -> Self
    where
        T: Any + Send + Sync,
    {
        Self::from_erased(TypeId::of::<T>(), event_type, payload)
    }

    /// 封装已擦除类型的载荷，`type_id` 必须是载荷的具体类型
    pub fn from_erased(type_id: TypeId, event_type: &'static str, payload: SharedPayload) -> Self {
        Self {
            metadata: Metadata::default(),
            event_type,
            type_id,
            payload,
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn event_type(&self) -> &'static str {
        self.event_type
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn payload(&self) -> &SharedPayload {
        &self.payload
    }

    pub fn is<T: Any>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// 还原为具体事件类型
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.payload).downcast_ref::<T>()
    }
}

impl fmt::Debug for EventEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEnvelope")
            .field("event_type", &self.event_type)
            .field("event_id", &self.metadata.event_id())
            .field("occurred_at", self.metadata.occurred_at())
            .finish_non_exhaustive()
    }
}

impl<E: DomainEvent> From<E> for EventEnvelope {
    fn from(event: E) -> Self {
        Self::new(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Deposited {
        amount: u64,
    }

    impl DomainEvent for Deposited {
        const EVENT_TYPE: &'static str = "account.deposited";
    }

    #[derive(Debug)]
    struct Withdrawn;

    impl DomainEvent for Withdrawn {
        const EVENT_TYPE: &'static str = "account.withdrawn";
    }

    #[test]
    fn envelope_keeps_exact_type() {
        let env = EventEnvelope::new(Deposited { amount: 5 });

        assert!(env.is::<Deposited>());
        assert!(!env.is::<Withdrawn>());
        assert_eq!(env.event_type(), "account.deposited");
        assert_eq!(env.downcast_ref::<Deposited>(), Some(&Deposited { amount: 5 }));
        assert!(env.downcast_ref::<Withdrawn>().is_none());
    }

    #[test]
    fn clones_share_payload() {
        let shared = Arc::new(Deposited { amount: 1 });
        let env = EventEnvelope::from_shared("deposit", shared.clone());
        let copy = env.clone();

        assert_eq!(Arc::strong_count(&shared), 3);
        assert_eq!(copy.metadata().event_id(), env.metadata().event_id());
    }

    #[test]
    fn each_envelope_gets_its_own_event_id() {
        let a = EventEnvelope::new(Withdrawn);
        let b = EventEnvelope::new(Withdrawn);

        assert_ne!(a.metadata().event_id(), b.metadata().event_id());
    }
}
