use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which backend is authoritative for job reads. Last write wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionSetting {
    pub data_base: String,
    pub updated_at: DateTime<Utc>,
}
