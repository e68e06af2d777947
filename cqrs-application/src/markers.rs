//! 声明式标记（Marker）
//!
//! 标记附着在请求类型或错误类型上，决定管道中哪些阶段生效：
//! - `Transactional`：事务阶段清理并提交工作单元；
//! - `Log`：日志阶段记录参数、异常与耗时；
//! - `EventListener`：命令成功后自身作为事件传播，错误发生时该错误同步传播给订阅者。
//!
//! 标记在编译期确定（关联常量），运行时只做位运算查询。
//!
use std::fmt;

/// 单个标记
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Marker {
    Transactional,
    Log,
    EventListener,
}

impl Marker {
    const ALL: [Marker; 3] = [Marker::Transactional, Marker::Log, Marker::EventListener];

    const fn bit(self) -> u8 {
        match self {
            Marker::Transactional => 1,
            Marker::Log => 1 << 1,
            Marker::EventListener => 1 << 2,
        }
    }
}

/// 标记集合（位集）
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Markers(u8);

impl Markers {
    pub const NONE: Markers = Markers(0);

    pub const fn of(marker: Marker) -> Self {
        Markers(marker.bit())
    }

    pub const fn with(self, marker: Marker) -> Self {
        Markers(self.0 | marker.bit())
    }

    pub const fn contains(self, marker: Marker) -> bool {
        self.0 & marker.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Marker> {
        Marker::ALL.into_iter().filter(move |m| self.contains(*m))
    }
}

impl fmt::Debug for Markers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<Marker> for Markers {
    fn from_iter<I: IntoIterator<Item = Marker>>(iter: I) -> Self {
        iter.into_iter().fold(Markers::NONE, Markers::with)
    }
}

/// 携带标记的类型（命令、查询、业务错误）
///
/// 通常由 `#[derive(Command)]`、`#[derive(Query)]` 或 `#[derive(Marked)]` 生成；
/// 未声明任何标记时使用默认的空集合。
pub trait Marked {
    const MARKERS: Markers = Markers::NONE;
}

/// 查询类型 `T` 是否携带标记 `marker`
pub const fn has_marker<T: Marked + ?Sized>(marker: Marker) -> bool {
    T::MARKERS.contains(marker)
}
