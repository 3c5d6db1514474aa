#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    response::Response,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use xti_admin_api::auth::{hash_password, issue_token, Role};
use xti_admin_api::config::AppConfig;
use xti_admin_api::database::models::{
    AdminUser, ConnectionSetting, FilePod, FilePodRecord, JobRecord, StampRequirement,
};
use xti_admin_api::database::DatabaseError;
use xti_admin_api::services::mailer::MailError;
use xti_admin_api::services::ocr::OcrError;
use xti_admin_api::services::{
    AuditEntry, AuditLog, FileServer, JobStore, MailMessage, Mailer, OcrService, PodStore, PodTransaction,
    SettingStore, UserStore,
};
use xti_admin_api::{router, AppState};

// A pool timeout stands in for any backend failure
pub fn backend_down() -> DatabaseError {
    DatabaseError::Sqlx(sqlx::Error::PoolTimedOut)
}

pub fn job(id: &str, minute: i64) -> JobRecord {
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
    JobRecord {
        id: id.to_string(),
        file_id: format!("F-{}", id),
        file_name: Some(format!("{}.pdf", id)),
        status: Some("processed".to_string()),
        quantity: 10,
        processed_quantity: 10,
        stamp_required: true,
        signature_required: false,
        stamp_detected: true,
        signature_detected: false,
        extracted: json!({ "pages": 1 }),
        created_at: base + Duration::minutes(minute),
        updated_at: base + Duration::minutes(minute),
    }
}

/// Jobs kept sorted by (created_at, id)
#[derive(Default)]
pub struct MemoryJobStore {
    pub records: Mutex<Vec<JobRecord>>,
    pub fail: AtomicBool,
    pub reads: AtomicUsize,
}

impl MemoryJobStore {
    pub fn with_jobs(prefix: &str, n: usize) -> Self {
        let store = Self::default();
        {
            let mut records = store.records.lock().unwrap();
            // Insert out of order; reads must still come back sorted
            for i in (1..=n).rev() {
                records.push(job(&format!("{}{:03}", prefix, i), i as i64));
            }
        }
        store
    }

    fn sorted(&self) -> Vec<JobRecord> {
        let mut records = self.records.lock().unwrap().clone();
        records.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
        records
    }

    fn check(&self) -> Result<(), DatabaseError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(backend_down());
        }
        Ok(())
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn count(&self) -> Result<i64, DatabaseError> {
        self.check()?;
        Ok(self.records.lock().unwrap().len() as i64)
    }

    async fn page(&self, offset: i64, limit: i64) -> Result<Vec<JobRecord>, DatabaseError> {
        self.check()?;
        Ok(self.sorted().into_iter().skip(offset as usize).take(limit as usize).collect())
    }

    async fn find(&self, id: &str) -> Result<Option<JobRecord>, DatabaseError> {
        self.check()?;
        Ok(self.records.lock().unwrap().iter().find(|r| r.id == id).cloned())
    }

    async fn replace(&self, record: &JobRecord) -> Result<bool, DatabaseError> {
        self.check()?;
        let mut records = self.records.lock().unwrap();
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        self.check()
    }
}

#[derive(Default)]
pub struct MemorySettingStore {
    pub value: Mutex<Option<ConnectionSetting>>,
    pub fail: AtomicBool,
}

impl MemorySettingStore {
    pub fn set(&self, value: &str) {
        *self.value.lock().unwrap() = Some(ConnectionSetting {
            data_base: value.to_string(),
            updated_at: Utc::now(),
        });
    }
}

#[async_trait]
impl SettingStore for MemorySettingStore {
    async fn connection(&self) -> Result<Option<ConnectionSetting>, DatabaseError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(backend_down());
        }
        Ok(self.value.lock().unwrap().clone())
    }

    async fn set_connection(&self, db_type: &str) -> Result<ConnectionSetting, DatabaseError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(backend_down());
        }
        self.set(db_type);
        Ok(self.value.lock().unwrap().clone().expect("just set"))
    }
}

#[derive(Default, Clone)]
pub struct PodTables {
    pub pods: BTreeMap<String, FilePod>,
    pub stamps: Vec<StampRequirement>,
}

#[derive(Default)]
pub struct PodState {
    pub tables: PodTables,
    pub fail_dependent: bool,
    pub fail_parent: bool,
    pub begin_calls: usize,
    pub open: usize,
    pub log: Vec<&'static str>,
}

/// File-POD tables with transactional staging: a transaction works on a copy
/// that only replaces the committed tables on commit.
#[derive(Default, Clone)]
pub struct MemoryPodStore {
    pub state: Arc<Mutex<PodState>>,
}

impl MemoryPodStore {
    pub fn seed(&self, file_id: &str, stamps: usize) {
        let mut state = self.state.lock().unwrap();
        state.tables.pods.insert(
            file_id.to_string(),
            FilePod {
                file_id: file_id.to_string(),
                file_name: Some(format!("{}.pdf", file_id)),
                pod_status: Some("received".to_string()),
                created_at: Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap(),
            },
        );
        for _ in 0..stamps {
            let id = state.tables.stamps.len() as i64 + 1;
            state.tables.stamps.push(StampRequirement {
                id,
                file_id: file_id.to_string(),
                stamp_type: Some("company".to_string()),
                required: true,
            });
        }
    }

    pub fn tables(&self) -> PodTables {
        self.state.lock().unwrap().tables.clone()
    }
}

pub struct MemoryPodTx {
    state: Arc<Mutex<PodState>>,
    staged: PodTables,
}

impl Drop for MemoryPodTx {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.open -= 1;
        state.log.push("close");
    }
}

#[async_trait]
impl PodStore for MemoryPodStore {
    async fn begin(&self) -> Result<Box<dyn PodTransaction>, DatabaseError> {
        let mut state = self.state.lock().unwrap();
        state.begin_calls += 1;
        state.open += 1;
        state.log.push("begin");
        Ok(Box::new(MemoryPodTx {
            state: self.state.clone(),
            staged: state.tables.clone(),
        }))
    }

    async fn find(&self, file_id: &str) -> Result<Option<FilePodRecord>, DatabaseError> {
        let state = self.state.lock().unwrap();
        Ok(state.tables.pods.get(file_id).map(|pod| FilePodRecord {
            file_pod: pod.clone(),
            stamp_requirements: state
                .tables
                .stamps
                .iter()
                .filter(|s| s.file_id == file_id)
                .cloned()
                .collect(),
        }))
    }
}

#[async_trait]
impl PodTransaction for MemoryPodTx {
    async fn delete_stamp_requirements(&mut self, file_id: &str) -> Result<u64, DatabaseError> {
        {
            let mut state = self.state.lock().unwrap();
            state.log.push("delete_dependent");
            if state.fail_dependent {
                return Err(backend_down());
            }
        }
        let before = self.staged.stamps.len();
        self.staged.stamps.retain(|s| s.file_id != file_id);
        Ok((before - self.staged.stamps.len()) as u64)
    }

    async fn delete_file_pod(&mut self, file_id: &str) -> Result<u64, DatabaseError> {
        {
            let mut state = self.state.lock().unwrap();
            state.log.push("delete_parent");
            if state.fail_parent {
                return Err(backend_down());
            }
        }
        if self.staged.stamps.iter().any(|s| s.file_id == file_id) {
            // Foreign key: dependents must be gone first
            return Err(backend_down());
        }
        Ok(self.staged.pods.remove(file_id).map_or(0, |_| 1))
    }

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
        let mut state = self.state.lock().unwrap();
        state.log.push("commit");
        state.tables = self.staged.clone();
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DatabaseError> {
        self.state.lock().unwrap().log.push("rollback");
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    pub users: Mutex<HashMap<String, AdminUser>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<AdminUser>, DatabaseError> {
        Ok(self.users.lock().unwrap().get(username).cloned())
    }

    async fn upsert(&self, user: &AdminUser) -> Result<(), DatabaseError> {
        self.users.lock().unwrap().insert(user.username.clone(), user.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryAuditLog {
    pub entries: Mutex<Vec<AuditEntry>>,
}

#[async_trait]
impl AuditLog for MemoryAuditLog {
    async fn record(&self, entry: &AuditEntry) -> Result<(), DatabaseError> {
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<MailMessage>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        message.validate()?;
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Answers immediately unless `delay_secs` exceeds `deadline_secs`
pub struct StubOcr {
    pub deadline_secs: u64,
    pub delay_secs: u64,
}

#[async_trait]
impl OcrService for StubOcr {
    async fn invoke(&self, job: &JobRecord) -> Result<Value, OcrError> {
        if self.delay_secs > self.deadline_secs {
            return Err(OcrError::Timeout(self.deadline_secs));
        }
        Ok(json!({ "jobId": job.id, "text": "OCR OK" }))
    }
}

pub struct TestApp {
    pub state: AppState,
    pub config: Arc<AppConfig>,
    pub document_jobs: Arc<MemoryJobStore>,
    pub relational_jobs: Arc<MemoryJobStore>,
    pub settings: Arc<MemorySettingStore>,
    pub pods: MemoryPodStore,
    pub users: Arc<MemoryUserStore>,
    pub audit: Arc<MemoryAuditLog>,
    pub mailer: Arc<RecordingMailer>,
    pub upload_dir: PathBuf,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_ocr(StubOcr { deadline_secs: 30, delay_secs: 0 })
    }

    pub fn with_ocr(ocr: StubOcr) -> Self {
        let upload_dir = std::env::temp_dir().join(format!(
            "xti-admin-test-{}-{}",
            std::process::id(),
            uuid_like()
        ));
        std::fs::create_dir_all(&upload_dir).expect("create upload dir");

        let mut config = AppConfig::development();
        config.security.jwt_secret = "integration-test-secret".to_string();
        config.security.enable_audit_logging = true;
        config.files.upload_dir = upload_dir.display().to_string();
        let config = Arc::new(config);

        let document_jobs = Arc::new(MemoryJobStore::with_jobs("D", 5));
        let relational_jobs = Arc::new(MemoryJobStore::with_jobs("R", 35));
        let settings = Arc::new(MemorySettingStore::default());
        let pods = MemoryPodStore::default();
        let users = Arc::new(MemoryUserStore::default());
        let audit = Arc::new(MemoryAuditLog::default());
        let mailer = Arc::new(RecordingMailer::default());

        let state = AppState {
            config: config.clone(),
            document_jobs: document_jobs.clone(),
            relational_jobs: relational_jobs.clone(),
            settings: settings.clone(),
            pods: Arc::new(pods.clone()),
            users: users.clone(),
            audit: audit.clone(),
            mailer: mailer.clone(),
            ocr: Arc::new(ocr),
            files: Arc::new(FileServer::new(upload_dir.clone())),
        };

        Self {
            state,
            config,
            document_jobs,
            relational_jobs,
            settings,
            pods,
            users,
            audit,
            mailer,
            upload_dir,
        }
    }

    pub fn token(&self, username: &str, role: Role) -> String {
        issue_token(username, role, &self.config.security).expect("issue token")
    }

    pub fn admin(&self) -> String {
        self.token("root", Role::Admin)
    }

    pub fn add_user(&self, username: &str, password: &str, role: Role) {
        self.users.users.lock().unwrap().insert(
            username.to_string(),
            AdminUser {
                username: username.to_string(),
                password_hash: hash_password(password),
                role,
                email: None,
            },
        );
    }

    pub async fn raw(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        router(self.state.clone())
            .oneshot(builder.body(body).expect("failed to build request"))
            .await
            .expect("request failed")
    }

    pub async fn call(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let response = self.raw(method, uri, token, body).await;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        (status, value)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.upload_dir);
    }
}

fn uuid_like() -> u128 {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();
    nanos + COUNTER.fetch_add(1, Ordering::SeqCst) as u128
}

pub fn parse_time(s: &str) -> DateTime<Utc> {
    s.parse().expect("valid timestamp")
}
