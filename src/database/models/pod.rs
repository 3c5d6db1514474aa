use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Parent row of `xti_file_pod_t`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FilePod {
    pub file_id: String,
    pub file_name: Option<String>,
    pub pod_status: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Dependent row of `xti_pod_stamp_reqrd_t`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StampRequirement {
    pub id: i64,
    pub file_id: String,
    pub stamp_type: Option<String>,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePodRecord {
    pub file_pod: FilePod,
    pub stamp_requirements: Vec<StampRequirement>,
}
