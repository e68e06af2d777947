/// 领域事件载荷需要满足的能力边界
///
/// 事件在一次分发调用期间由引擎持有（`Arc` 共享），因此要求 `Send + Sync + 'static`。
/// 订阅按事件的具体类型（`TypeId`）匹配，`EVENT_TYPE` 仅用于日志与诊断。
///
/// 通常借助 `#[derive(DomainEvent)]` 实现：
/// ```ignore
/// #[derive(Debug, DomainEvent)]
/// #[event(event_type = "order.placed")]
/// struct OrderPlaced { order_id: String }
/// ```
pub trait DomainEvent: Send + Sync + 'static {
    /// 事件类型名（稳定名称，不随重构变化）
    const EVENT_TYPE: &'static str;
}
