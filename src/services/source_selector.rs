use serde::Serialize;
use tracing::debug;

use crate::database::models::JobRecord;
use crate::database::DatabaseError;

use super::job_store::JobStore;

/// Setting value that makes the document store authoritative
pub const LOCAL_SETTING: &str = "local";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Document,
    Relational,
}

impl Backend {
    /// `"local"` selects the document store; anything else, including no
    /// setting at all, selects the relational store.
    pub fn from_setting(value: Option<&str>) -> Self {
        match value {
            Some(LOCAL_SETTING) => Backend::Document,
            _ => Backend::Relational,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    pub const DEFAULT_PAGE: u32 = 1;

    /// Parse raw query values. Missing, non-numeric and non-positive values
    /// fall back to the defaults; `max_limit` clamps the page size.
    pub fn from_query(
        page: Option<&str>,
        limit: Option<&str>,
        default_limit: u32,
        max_limit: Option<u32>,
    ) -> Self {
        let parse = |raw: Option<&str>| raw.and_then(|s| s.trim().parse::<u32>().ok()).filter(|n| *n > 0);

        let page = parse(page).unwrap_or(Self::DEFAULT_PAGE);
        let mut limit = parse(limit).unwrap_or(default_limit.max(1));
        if let Some(max) = max_limit {
            limit = limit.min(max.max(1));
        }

        Self { page, limit }
    }

    /// Saturates at `i64::MAX` for pages far past any real table.
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1).saturating_mul(i64::from(self.limit))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPage {
    pub active_jobs: Vec<JobRecord>,
    pub pagination: PageInfo,
    pub source: Backend,
}

pub fn select_reader<'a>(
    backend: Backend,
    document: &'a dyn JobStore,
    relational: &'a dyn JobStore,
) -> &'a dyn JobStore {
    match backend {
        Backend::Document => document,
        Backend::Relational => relational,
    }
}

/// Read one page of jobs from whichever backend `backend` names.
pub async fn fetch_jobs(
    backend: Backend,
    document: &dyn JobStore,
    relational: &dyn JobStore,
    pagination: Pagination,
) -> Result<JobPage, DatabaseError> {
    let reader = select_reader(backend, document, relational);
    debug!(
        "Fetching jobs from {:?} backend (page {}, limit {})",
        backend, pagination.page, pagination.limit
    );

    let total = reader.count().await?;
    let active_jobs = reader.page(pagination.offset(), i64::from(pagination.limit)).await?;
    let limit = i64::from(pagination.limit);

    Ok(JobPage {
        active_jobs,
        pagination: PageInfo {
            page: pagination.page,
            limit: pagination.limit,
            total,
            total_pages: (total + limit - 1) / limit,
        },
        source: backend,
    })
}
