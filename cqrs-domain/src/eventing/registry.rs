//! 订阅注册表（SubscriptionRegistry）
//!
//! 启动期通过 builder 声明“事件类型 → 处理器”的关联，构建完成后只读，
//! 可在并发的分发调用之间无锁共享。
//!
use super::EventHandler;
use crate::error::DomainError;
use futures_util::future::BoxFuture;
use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type SharedPayload = Arc<dyn Any + Send + Sync>;

type SubscriberFuture = BoxFuture<'static, anyhow::Result<()>>;

type SubscriberFn = Arc<dyn Fn(SharedPayload) -> SubscriberFuture + Send + Sync>;

/// 类型擦除后的订阅者
#[derive(Clone)]
pub struct Subscriber {
    name: &'static str,
    call: SubscriberFn,
}

impl Subscriber {
    fn new<E, H>(handler: Arc<H>) -> Self
    where
        E: Send + Sync + 'static,
        H: EventHandler<E> + 'static,
    {
        let name = handler.handler_name();

        let call: SubscriberFn = Arc::new(move |payload: SharedPayload| -> SubscriberFuture {
            let handler = handler.clone();

            Box::pin(async move {
                // 注册表按 TypeId 分桶，正常情况下这里不会失败
                let Some(event) = (*payload).downcast_ref::<E>() else {
                    return Err(DomainError::TypeMismatch {
                        expected: type_name::<E>().to_string(),
                        found: "unknown".to_string(),
                    }
                    .into());
                };
                handler.handle(event).await
            })
        });

        Self { name, call }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn invoke(&self, payload: SharedPayload) -> SubscriberFuture {
        (self.call)(payload)
    }
}

impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber").field("name", &self.name).finish()
    }
}

/// 事件类型到有序订阅者列表的映射（顺序即注册顺序）
#[derive(Clone, Default, Debug)]
pub struct SubscriptionRegistry {
    by_type: HashMap<TypeId, Vec<Subscriber>>,
}

impl SubscriptionRegistry {
    pub fn builder() -> SubscriptionRegistryBuilder {
        SubscriptionRegistryBuilder::default()
    }

    /// 某事件类型的订阅者；没有订阅者时返回空切片
    pub fn subscribers_for(&self, type_id: TypeId) -> &[Subscriber] {
        self.by_type.get(&type_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 按注册顺序列出某事件类型的订阅者名称
    pub fn subscriber_names<E: 'static>(&self) -> Vec<&'static str> {
        self.subscribers_for(TypeId::of::<E>())
            .iter()
            .map(Subscriber::name)
            .collect()
    }

    /// 已有订阅的事件类型数量
    pub fn event_types(&self) -> usize {
        self.by_type.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}

/// 注册表构建器：仅在启动期使用
#[derive(Default)]
pub struct SubscriptionRegistryBuilder {
    by_type: HashMap<TypeId, Vec<Subscriber>>,
}

impl SubscriptionRegistryBuilder {
    /// 为事件类型 `E` 追加一个订阅者；同一处理器可订阅多种事件
    pub fn subscribe<E, H>(mut self, handler: Arc<H>) -> Self
    where
        E: Send + Sync + 'static,
        H: EventHandler<E> + 'static,
    {
        self.by_type
            .entry(TypeId::of::<E>())
            .or_default()
            .push(Subscriber::new::<E, H>(handler));
        self
    }

    pub fn build(self) -> SubscriptionRegistry {
        SubscriptionRegistry {
            by_type: self.by_type,
        }
    }
}
