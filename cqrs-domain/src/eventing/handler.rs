//! 事件处理器（EventHandler）
//!
//! 订阅者只面向一种具体的事件类型 `E`；`E` 可以是领域事件，也可以是携带
//! EventListener 标记的命令或错误。
//!
use async_trait::async_trait;

/// 事件处理器：处理某一类型的事件
#[async_trait]
pub trait EventHandler<E>: Send + Sync
where
    E: Send + Sync + 'static,
{
    /// 处理器名称（用于失败日志与投递报告）
    fn handler_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// 处理事件；返回错误只影响当前订阅者，不会中断其他订阅者
    async fn handle(&self, event: &E) -> anyhow::Result<()>;
}
