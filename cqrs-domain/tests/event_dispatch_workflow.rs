use async_trait::async_trait;
use cqrs_domain::domain_event::{DomainEvent, EventEnvelope, Metadata};
use cqrs_domain::error::DomainError;
use cqrs_domain::eventing::{
    DispatchMode, EventDispatchConfig, EventDispatchEngine, EventHandler, SubscriptionRegistry,
};
use cqrs_macros::DomainEvent;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, DomainEvent)]
#[event(event_type = "inventory.reserved")]
struct StockReserved {
    sku: &'static str,
    qty: u32,
}

#[derive(Debug, DomainEvent)]
struct StockReleased {
    sku: &'static str,
}

#[derive(Default)]
struct Projection {
    reserved: AtomicUsize,
    released: Mutex<Vec<&'static str>>,
}

#[async_trait]
impl EventHandler<StockReserved> for Projection {
    fn handler_name(&self) -> &'static str {
        "projection"
    }

    async fn handle(&self, event: &StockReserved) -> anyhow::Result<()> {
        self.reserved.fetch_add(event.qty as usize, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl EventHandler<StockReleased> for Projection {
    fn handler_name(&self) -> &'static str {
        "projection"
    }

    async fn handle(&self, event: &StockReleased) -> anyhow::Result<()> {
        self.released.lock().unwrap().push(event.sku);
        Ok(())
    }
}

struct Crashing;

#[async_trait]
impl EventHandler<StockReleased> for Crashing {
    async fn handle(&self, event: &StockReleased) -> anyhow::Result<()> {
        if event.sku.is_empty() {
            anyhow::bail!("empty sku");
        }
        panic!("cannot release {}", event.sku);
    }
}

#[test]
fn derived_event_types() {
    assert_eq!(StockReserved::EVENT_TYPE, "inventory.reserved");
    assert_eq!(StockReleased::EVENT_TYPE, "StockReleased");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn background_batches_are_all_delivered_after_wait_idle() {
    let projection = Arc::new(Projection::default());
    let registry = SubscriptionRegistry::builder()
        .subscribe::<StockReserved, _>(projection.clone())
        .subscribe::<StockReleased, _>(projection.clone())
        .build();
    let engine = Arc::new(EventDispatchEngine::new(registry, EventDispatchConfig::default()));

    let mut tasks = Vec::new();
    for _ in 0..20 {
        let engine = engine.clone();
        tasks.push(tokio::spawn(async move {
            engine
                .publish(vec![
                    EventEnvelope::new(StockReserved { sku: "a", qty: 2 }),
                    EventEnvelope::new(StockReleased { sku: "a" }),
                ])
                .await;
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }
    engine.wait_idle().await;

    assert_eq!(projection.reserved.load(Ordering::SeqCst), 40);
    assert_eq!(projection.released.lock().unwrap().len(), 20);
    assert_eq!(engine.pending(), 0);

    // wait_idle 之后引擎仍可继续接收批次
    engine
        .publish(vec![EventEnvelope::new(StockReserved { sku: "b", qty: 1 })])
        .await;
    engine.wait_idle().await;
    assert_eq!(projection.reserved.load(Ordering::SeqCst), 41);
}

#[tokio::test]
async fn report_lists_each_failed_subscriber() {
    let projection = Arc::new(Projection::default());
    let registry = SubscriptionRegistry::builder()
        .subscribe::<StockReleased, _>(Arc::new(Crashing))
        .subscribe::<StockReleased, _>(projection.clone())
        .build();
    let engine = EventDispatchEngine::new(
        registry,
        EventDispatchConfig {
            mode: DispatchMode::Inline,
        },
    );

    let report = engine
        .dispatch_now(&EventEnvelope::new(StockReleased { sku: "x" }))
        .await;

    assert_eq!(report.delivered(), 1);
    assert!(matches!(
        report.failures(),
        [DomainError::SubscriberPanicked { handler }] if handler.ends_with("Crashing")
    ));
    assert_eq!(*projection.released.lock().unwrap(), vec!["x"]);

    let report = engine
        .dispatch_now(&EventEnvelope::new(StockReleased { sku: "" }))
        .await;
    assert!(matches!(
        report.failures(),
        [DomainError::EventHandler { reason, .. }] if reason == "empty sku"
    ));
}

#[tokio::test]
async fn envelope_metadata_can_be_supplied() {
    let metadata = Metadata::builder().event_id("evt-1".to_string()).build();
    let envelope = EventEnvelope::new(StockReleased { sku: "m" }).with_metadata(metadata);

    assert_eq!(envelope.metadata().event_id(), "evt-1");
    assert_eq!(envelope.event_type(), "StockReleased");
}
