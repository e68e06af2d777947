use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 事件元数据
#[derive(Builder, Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    #[builder(default = Uuid::new_v4().to_string())]
    event_id: String,
    #[builder(default = Utc::now())]
    occurred_at: DateTime<Utc>,
}

impl Default for Metadata {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Metadata {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn occurred_at(&self) -> &DateTime<Utc> {
        &self.occurred_at
    }
}
