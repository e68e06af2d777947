//! 值对象（Value Object）
//!
//! 无标识、以值相等为准的对象，用于封装不可变的概念性值与校验逻辑。
//! 相等与哈希覆盖全部字段（由 `PartialEq`/`Eq`/`Hash` 提供），通常借助 `#[value_object]` 生成：
//!
//! ```ignore
//! #[value_object(validate = Self::check)]
//! struct Money {
//!     amount: i64,
//!     currency: String,
//! }
//! ```
//!
use crate::error::DomainResult;
use std::hash::Hash;

/// 值对象抽象
pub trait ValueObject: Clone + Eq + Hash {
    /// 业务约束校验，失败时返回 `DomainError::InvalidValue`
    fn validate(&self) -> DomainResult<()> {
        Ok(())
    }

    /// 校验通过后返回自身，便于在构造函数末尾使用
    fn validated(self) -> DomainResult<Self> {
        self.validate()?;
        Ok(self)
    }
}
