use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::database::DatabaseError;

use super::pod_store::PodStore;

/// Progress of one erase. Success runs
/// `Idle → ConnectionOpened → DependentDeleted → ParentDeleted → Committed`;
/// a failed delete runs `… → RolledBack`. The connection is released after
/// either terminal stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraseStage {
    Idle,
    ConnectionOpened,
    DependentDeleted,
    ParentDeleted,
    Committed,
    RolledBack,
}

#[derive(Debug, Error)]
pub enum EraseError {
    #[error("fileId is required")]
    MissingFileId,

    #[error("failed to open transaction: {0}")]
    Begin(#[source] DatabaseError),

    /// `stage` is the last stage reached before the failing delete.
    #[error("delete failed after {stage:?}: {source}")]
    Delete {
        stage: EraseStage,
        #[source]
        source: DatabaseError,
    },

    #[error("commit failed: {0}")]
    Commit(#[source] DatabaseError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EraseOutcome {
    pub file_id: String,
    pub stamp_rows: u64,
    pub pod_rows: u64,
}

impl EraseOutcome {
    /// True when neither table held the identifier
    pub fn was_absent(&self) -> bool {
        self.stamp_rows == 0 && self.pod_rows == 0
    }
}

/// Delete the stamp requirements and then the file-POD row for `file_id`
/// inside one transaction.
pub async fn erase_file_pod(store: &dyn PodStore, file_id: &str) -> Result<EraseOutcome, EraseError> {
    let file_id = file_id.trim();
    if file_id.is_empty() {
        return Err(EraseError::MissingFileId);
    }

    let mut tx = store.begin().await.map_err(EraseError::Begin)?;
    let mut stage = EraseStage::ConnectionOpened;
    debug!(file_id, ?stage, "file-POD erase started");

    let deleted = async {
        let stamp_rows = tx.delete_stamp_requirements(file_id).await?;
        stage = EraseStage::DependentDeleted;
        let pod_rows = tx.delete_file_pod(file_id).await?;
        stage = EraseStage::ParentDeleted;
        Ok::<_, DatabaseError>((stamp_rows, pod_rows))
    }
    .await;

    let (stamp_rows, pod_rows) = match deleted {
        Ok(counts) => counts,
        Err(source) => {
            error!(file_id, ?stage, "file-POD delete failed, rolling back: {}", source);
            if let Err(rollback_err) = tx.rollback().await {
                error!(file_id, "rollback failed: {}", rollback_err);
            } else {
                debug!(file_id, stage = ?EraseStage::RolledBack, "file-POD erase rolled back");
            }
            return Err(EraseError::Delete { stage, source });
        }
    };
    debug!(file_id, ?stage, "file-POD deletes applied");

    tx.commit().await.map_err(EraseError::Commit)?;
    debug!(file_id, stage = ?EraseStage::Committed, "file-POD erase committed");

    let outcome = EraseOutcome {
        file_id: file_id.to_string(),
        stamp_rows,
        pod_rows,
    };
    if outcome.was_absent() {
        warn!(file_id, "file-POD erase matched no rows");
    } else {
        info!(file_id, stamp_rows, pod_rows, "file-POD records deleted");
    }
    Ok(outcome)
}
