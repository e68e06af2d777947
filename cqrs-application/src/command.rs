use crate::markers::Marked;
use crate::validation::ValidationError;
use serde::Serialize;

/// 应用层命令（Command）
///
/// 表达“意图”的写操作请求，通常会修改领域状态。
/// - 处理结果只有成功/失败，以及处理过程中产生的领域事件；
/// - 与 [`Query`](crate::query::Query) 相对，`Command` 应避免读写混用；
/// - 建议保持语义化的“动宾结构”命名，如 `CreateUser`、`CloseOrder`。
///
/// 关联常量：
/// - `NAME`：命令的稳定名称，用于日志、追踪与路由。避免依赖 `type_name::<T>()`。
///
/// 命令通过 [`Marked`] 声明标记（Transactional / Log / EventListener），
/// 需要可序列化以便日志阶段记录参数。通常使用 `#[derive(Command)]` 实现。
pub trait Command: Marked + Serialize + Send + Sync + 'static {
    /// 命令的稳定名称（建议常量字符串，不随重构变化）
    const NAME: &'static str;

    /// 结构校验；失败时管道在获取任何资源之前短路
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}
