pub mod audit;
pub mod files;
pub mod job_store;
pub mod mailer;
pub mod ocr;
pub mod pod_store;
pub mod record_eraser;
pub mod setting_store;
pub mod source_selector;
pub mod user_store;

pub use audit::{AuditEntry, AuditLog, DocumentAuditLog};
pub use files::FileServer;
pub use job_store::{DocumentJobStore, JobStore, RelationalJobStore};
pub use mailer::{HttpMailer, MailMessage, Mailer};
pub use ocr::{HttpOcrClient, OcrService};
pub use pod_store::{PgPodStore, PodStore, PodTransaction};
pub use record_eraser::{erase_file_pod, EraseError, EraseOutcome, EraseStage};
pub use setting_store::{DocumentSettingStore, SettingStore};
pub use source_selector::{fetch_jobs, select_reader, Backend, JobPage, Pagination};
pub use user_store::{DocumentUserStore, UserStore};
