//! 日志阶段依赖的协作者
//!
//! - [`Logger`]：写一条日志，不允许失败；
//! - [`ParameterSerializer`]：把请求参数序列化为文本，失败时日志阶段降级为警告。
//!
use std::fmt;

/// 日志级别
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        f.write_str(s)
    }
}

pub trait Logger: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);
}

/// 默认实现：转发给 `tracing`
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Info => tracing::info!(target: "cqrs::pipeline", "{message}"),
            LogLevel::Warn => tracing::warn!(target: "cqrs::pipeline", "{message}"),
            LogLevel::Error => tracing::error!(target: "cqrs::pipeline", "{message}"),
        }
    }
}

pub trait ParameterSerializer: Send + Sync {
    fn serialize(&self, params: &dyn erased_serde::Serialize) -> anyhow::Result<String>;
}

/// 默认实现：紧凑 JSON
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonParameterSerializer;

impl ParameterSerializer for JsonParameterSerializer {
    fn serialize(&self, params: &dyn erased_serde::Serialize) -> anyhow::Result<String> {
        Ok(serde_json::to_string(params)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use serde::ser::Error as _;

    #[derive(Serialize)]
    struct Rename {
        id: u32,
        name: &'static str,
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("opaque value"))
        }
    }

    #[test]
    fn json_serializer_renders_compact_json() {
        let text = JsonParameterSerializer
            .serialize(&Rename { id: 7, name: "bob" })
            .unwrap();

        assert_eq!(text, r#"{"id":7,"name":"bob"}"#);
    }

    #[test]
    fn json_serializer_reports_failures() {
        let err = JsonParameterSerializer.serialize(&Unserializable).unwrap_err();

        assert!(err.to_string().contains("opaque value"));
    }
}
