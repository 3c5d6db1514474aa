pub mod job;
pub mod pod;
pub mod setting;
pub mod user;

pub use job::{is_valid_record_id, JobRecord, JobRow, JobUpdate};
pub use pod::{FilePod, FilePodRecord, StampRequirement};
pub use setting::ConnectionSetting;
pub use user::AdminUser;
