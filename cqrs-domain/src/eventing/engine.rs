//! 事件分发引擎（EventDispatchEngine）
//!
//! 两种投递策略并存：
//! - `publish`：命令成功后产生的事件批次。`Background` 模式下在独立任务中投递，
//!   调用方立即返回、不保证订阅者已执行；`Inline` 模式下投递完成后才返回（确定性调度）。
//! - `dispatch_now`：携带 EventListener 标记的错误。无论模式如何都同步投递，
//!   返回时该错误的所有订阅者都已执行完毕。
//!
//! 两种策略共享同一条规则：订阅者按注册顺序逐个执行，单个订阅者失败（返回错误或 panic）
//! 只记录在投递报告里，不影响后续订阅者，也不会抛回调用方。
//!
use super::registry::SubscriptionRegistry;
use crate::domain_event::EventEnvelope;
use crate::error::DomainError;
use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio_util::task::TaskTracker;

/// 成功路径事件的调度方式
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DispatchMode {
    /// 在调用方任务内依次投递，返回前所有订阅者已执行
    Inline,
    /// 交给后台任务投递，调用方不等待
    #[default]
    Background,
}

/// 事件分发配置
#[derive(Clone, Copy, Debug, Default)]
pub struct EventDispatchConfig {
    /// 成功路径事件的调度方式（错误事件始终同步投递）
    pub mode: DispatchMode,
}

/// 单个事件的投递结果
#[derive(Debug)]
pub struct DispatchReport {
    event_type: &'static str,
    delivered: usize,
    failures: Vec<DomainError>,
}

impl DispatchReport {
    fn new(event_type: &'static str) -> Self {
        Self {
            event_type,
            delivered: 0,
            failures: Vec::new(),
        }
    }

    pub fn event_type(&self) -> &'static str {
        self.event_type
    }

    /// 成功执行的订阅者数量
    pub fn delivered(&self) -> usize {
        self.delivered
    }

    /// 失败的订阅者（按执行顺序）
    pub fn failures(&self) -> &[DomainError] {
        &self.failures
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// 事件分发引擎：持有只读订阅注册表与后台任务跟踪器
pub struct EventDispatchEngine {
    registry: Arc<SubscriptionRegistry>,
    config: EventDispatchConfig,
    tracker: TaskTracker,
}

impl Default for EventDispatchEngine {
    fn default() -> Self {
        Self::new(SubscriptionRegistry::default(), EventDispatchConfig::default())
    }
}

impl EventDispatchEngine {
    pub fn new(registry: SubscriptionRegistry, config: EventDispatchConfig) -> Self {
        Self {
            registry: Arc::new(registry),
            config,
            tracker: TaskTracker::new(),
        }
    }

    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }

    pub fn mode(&self) -> DispatchMode {
        self.config.mode
    }

    /// 投递成功路径的事件批次
    ///
    /// 批次内事件按顺序投递。`Background` 模式需要在 tokio 运行时内调用，
    /// 返回时不保证任何订阅者已经执行；需要等待时调用 [`wait_idle`](Self::wait_idle)。
    pub async fn publish(&self, events: Vec<EventEnvelope>) {
        if events.is_empty() {
            return;
        }

        match self.config.mode {
            DispatchMode::Inline => {
                deliver_batch(&self.registry, &events).await;
            }
            DispatchMode::Background => {
                tracing::debug!(events = events.len(), "scheduling background event dispatch");
                let registry = self.registry.clone();
                self.tracker.spawn(async move {
                    deliver_batch(&registry, &events).await;
                });
            }
        }
    }

    /// 同步投递单个事件，返回时所有订阅者均已执行
    pub async fn dispatch_now(&self, envelope: &EventEnvelope) -> DispatchReport {
        deliver(&self.registry, envelope).await
    }

    /// 仍在运行的后台批次数量
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }

    /// 等待目前已调度的后台批次全部完成（用于优雅关闭与测试）
    pub async fn wait_idle(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }
}

async fn deliver_batch(
    registry: &SubscriptionRegistry,
    events: &[EventEnvelope],
) -> Vec<DispatchReport> {
    let mut reports = Vec::with_capacity(events.len());
    for envelope in events {
        reports.push(deliver(registry, envelope).await);
    }
    reports
}

async fn deliver(registry: &SubscriptionRegistry, envelope: &EventEnvelope) -> DispatchReport {
    let mut report = DispatchReport::new(envelope.event_type());
    let subscribers = registry.subscribers_for(envelope.type_id());

    if subscribers.is_empty() {
        tracing::debug!(event_type = envelope.event_type(), "no subscribers for event");
        return report;
    }

    for subscriber in subscribers {
        let outcome = AssertUnwindSafe(subscriber.invoke(envelope.payload().clone()))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(())) => report.delivered += 1,
            Ok(Err(err)) => {
                tracing::warn!(
                    event_type = envelope.event_type(),
                    event_id = envelope.metadata().event_id(),
                    handler = subscriber.name(),
                    error = %err,
                    "event handler failed"
                );
                report.failures.push(DomainError::EventHandler {
                    handler: subscriber.name().to_string(),
                    reason: err.to_string(),
                });
            }
            Err(_) => {
                tracing::error!(
                    event_type = envelope.event_type(),
                    event_id = envelope.metadata().event_id(),
                    handler = subscriber.name(),
                    "event handler panicked"
                );
                report.failures.push(DomainError::SubscriberPanicked {
                    handler: subscriber.name().to_string(),
                });
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_event::DomainEvent;
    use crate::eventing::EventHandler;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::Notify;

    #[derive(Debug)]
    struct Shipped(u32);

    impl DomainEvent for Shipped {
        const EVENT_TYPE: &'static str = "order.shipped";
    }

    #[derive(Debug)]
    struct Cancelled;

    impl DomainEvent for Cancelled {
        const EVENT_TYPE: &'static str = "order.cancelled";
    }

    #[derive(Clone, Copy)]
    enum Behaviour {
        Ok,
        Fail,
        Panic,
    }

    struct SpyHandler {
        name: &'static str,
        behaviour: Behaviour,
        journal: Arc<Mutex<Vec<String>>>,
    }

    impl SpyHandler {
        fn record(&self, what: String) -> anyhow::Result<()> {
            match self.behaviour {
                Behaviour::Ok => {
                    self.journal.lock().unwrap().push(what);
                    Ok(())
                }
                Behaviour::Fail => anyhow::bail!("{} refused", self.name),
                Behaviour::Panic => panic!("{} exploded", self.name),
            }
        }
    }

    #[async_trait]
    impl EventHandler<Shipped> for SpyHandler {
        fn handler_name(&self) -> &'static str {
            self.name
        }

        async fn handle(&self, event: &Shipped) -> anyhow::Result<()> {
            self.record(format!("{}:shipped:{}", self.name, event.0))
        }
    }

    #[async_trait]
    impl EventHandler<Cancelled> for SpyHandler {
        fn handler_name(&self) -> &'static str {
            self.name
        }

        async fn handle(&self, _event: &Cancelled) -> anyhow::Result<()> {
            self.record(format!("{}:cancelled", self.name))
        }
    }

    fn spy(
        name: &'static str,
        behaviour: Behaviour,
        journal: &Arc<Mutex<Vec<String>>>,
    ) -> Arc<SpyHandler> {
        Arc::new(SpyHandler {
            name,
            behaviour,
            journal: journal.clone(),
        })
    }

    fn inline(registry: SubscriptionRegistry) -> EventDispatchEngine {
        EventDispatchEngine::new(
            registry,
            EventDispatchConfig {
                mode: DispatchMode::Inline,
            },
        )
    }

    #[tokio::test]
    async fn inline_publish_delivers_events_in_order() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let registry = SubscriptionRegistry::builder()
            .subscribe::<Shipped, _>(spy("h1", Behaviour::Ok, &journal))
            .subscribe::<Shipped, _>(spy("h2", Behaviour::Ok, &journal))
            .subscribe::<Cancelled, _>(spy("h3", Behaviour::Ok, &journal))
            .build();
        let engine = inline(registry);

        engine
            .publish(vec![
                EventEnvelope::new(Shipped(1)),
                EventEnvelope::new(Cancelled),
                EventEnvelope::new(Shipped(2)),
            ])
            .await;

        assert_eq!(
            *journal.lock().unwrap(),
            vec![
                "h1:shipped:1",
                "h2:shipped:1",
                "h3:cancelled",
                "h1:shipped:2",
                "h2:shipped:2",
            ]
        );
    }

    #[tokio::test]
    async fn failing_subscriber_does_not_block_the_next_one() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let registry = SubscriptionRegistry::builder()
            .subscribe::<Shipped, _>(spy("broken", Behaviour::Fail, &journal))
            .subscribe::<Shipped, _>(spy("crashing", Behaviour::Panic, &journal))
            .subscribe::<Shipped, _>(spy("healthy", Behaviour::Ok, &journal))
            .build();
        let engine = inline(registry);

        let report = engine.dispatch_now(&EventEnvelope::new(Shipped(7))).await;

        assert_eq!(report.delivered(), 1);
        assert_eq!(report.failures().len(), 2);
        assert!(matches!(report.failures()[0], DomainError::EventHandler { .. }));
        assert!(matches!(report.failures()[1], DomainError::SubscriberPanicked { .. }));
        assert_eq!(report.failures()[0].handler(), Some("broken"));
        assert_eq!(*journal.lock().unwrap(), vec!["healthy:shipped:7"]);
    }

    #[tokio::test]
    async fn event_without_subscribers_is_a_no_op() {
        let engine = inline(SubscriptionRegistry::default());

        let report = engine.dispatch_now(&EventEnvelope::new(Cancelled)).await;

        assert_eq!(report.delivered(), 0);
        assert!(report.is_clean());
        assert_eq!(report.event_type(), "order.cancelled");
    }

    struct GatedHandler {
        gate: Arc<Notify>,
        executed: Arc<AtomicBool>,
    }

    #[async_trait]
    impl EventHandler<Shipped> for GatedHandler {
        async fn handle(&self, _event: &Shipped) -> anyhow::Result<()> {
            self.gate.notified().await;
            self.executed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn background_publish_returns_before_subscribers_run() {
        let gate = Arc::new(Notify::new());
        let executed = Arc::new(AtomicBool::new(false));
        let registry = SubscriptionRegistry::builder()
            .subscribe::<Shipped, _>(Arc::new(GatedHandler {
                gate: gate.clone(),
                executed: executed.clone(),
            }))
            .build();
        let engine = EventDispatchEngine::new(registry, EventDispatchConfig::default());

        engine.publish(vec![EventEnvelope::new(Shipped(1))]).await;

        assert!(!executed.load(Ordering::SeqCst));
        assert_eq!(engine.pending(), 1);

        gate.notify_one();
        engine.wait_idle().await;

        assert!(executed.load(Ordering::SeqCst));
        assert_eq!(engine.pending(), 0);
    }

    #[tokio::test]
    async fn dispatch_now_is_synchronous_even_in_background_mode() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let registry = SubscriptionRegistry::builder()
            .subscribe::<Cancelled, _>(spy("h", Behaviour::Ok, &journal))
            .build();
        let engine = EventDispatchEngine::new(registry, EventDispatchConfig::default());
        assert_eq!(engine.mode(), DispatchMode::Background);

        let report = engine.dispatch_now(&EventEnvelope::new(Cancelled)).await;

        assert_eq!(report.delivered(), 1);
        assert_eq!(*journal.lock().unwrap(), vec!["h:cancelled"]);
        assert_eq!(engine.pending(), 0);
    }
}
