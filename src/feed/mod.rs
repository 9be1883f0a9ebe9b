//! Client-side incremental project feed.
//!
//! `FeedController` owns the pagination state for one filter selection and
//! is driven by events: mount, filter change, scroll proximity and retry.
//! Each event that should fetch hands back a `PendingFetch`; the caller runs
//! it through a `FeedTransport` (or uses [`FeedController::run`]) and feeds the
//! result to [`FeedController::complete`]. Only one fetch is in flight per
//! filter because every trigger is refused while the controller is loading.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ShowcaseError;
use crate::model::{Category, Project};

pub mod dedup;

pub use dedup::DedupSet;

/// Page size used by the showcase front page.
pub const PROJECTS_PER_PAGE: i64 = 9;

/// Distance from the document bottom, in pixels, that triggers the next page.
pub const SCROLL_THRESHOLD_PX: f64 = 100.0;

/// The only error text ever shown to the user.
pub const FEED_ERROR_MESSAGE: &str = "Failed to load projects. Please try again.";

/// Feed fetch request as sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedRequest {
    pub category: Option<String>,
    pub first: i64,
    pub after: Option<String>,
}

/// Network transport the controller fetches pages through.
#[async_trait]
pub trait FeedTransport: Send + Sync {
    async fn fetch_projects(&self, request: &FeedRequest) -> Result<Vec<Project>, ShowcaseError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    Idle,
    Loading,
    LoadedMoreAvailable,
    LoadedExhausted,
    Error,
}

/// Viewport geometry reported with a scroll event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub viewport_height: f64,
    pub scroll_top: f64,
    pub document_height: f64,
}

impl ScrollMetrics {
    pub fn near_bottom(&self) -> bool {
        self.viewport_height + self.scroll_top >= self.document_height - SCROLL_THRESHOLD_PX
    }
}

/// A fetch the controller has started and is waiting on.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a pending fetch must be run and completed"]
pub struct PendingFetch {
    generation: u64,
    reset: bool,
    request: FeedRequest,
}

impl PendingFetch {
    pub fn request(&self) -> &FeedRequest {
        &self.request
    }

    pub fn is_reset(&self) -> bool {
        self.reset
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Page merged; `appended` novel projects were added.
    Applied { appended: usize },
    /// Fetch failed; the controller is in the error state.
    Failed,
    /// Response belonged to a filter that is no longer active and was dropped.
    Stale,
}

#[derive(Debug)]
pub struct FeedController {
    page_size: i64,
    category: Option<String>,
    status: FeedStatus,
    projects: Vec<Project>,
    seen: DedupSet,
    cursor: Option<String>,
    generation: u64,
    error: Option<&'static str>,
}

impl Default for FeedController {
    fn default() -> Self {
        Self::new(PROJECTS_PER_PAGE)
    }
}

impl FeedController {
    pub fn new(page_size: i64) -> Self {
        Self {
            page_size,
            category: None,
            status: FeedStatus::Idle,
            projects: Vec::new(),
            seen: DedupSet::new(),
            cursor: None,
            generation: 0,
            error: None,
        }
    }

    pub fn status(&self) -> FeedStatus {
        self.status
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    pub fn is_loading(&self) -> bool {
        self.status == FeedStatus::Loading
    }

    pub fn has_more(&self) -> bool {
        self.status != FeedStatus::LoadedExhausted
    }

    pub fn error_message(&self) -> Option<&'static str> {
        self.error
    }

    /// First fetch for the current filter.
    pub fn mount(&mut self) -> PendingFetch {
        let category = self.category.clone();
        self.select_category(category.as_deref())
    }

    /// Activate a filter. `All` or blank clears it. The accumulated list, the
    /// de-duplication set and the cursor are dropped before the fetch starts,
    /// and any response still in flight for the previous filter goes stale.
    pub fn select_category(&mut self, category: Option<&str>) -> PendingFetch {
        self.category = Category::filter_from_label(category);
        self.projects.clear();
        self.seen.clear();
        self.cursor = None;
        self.error = None;
        self.status = FeedStatus::Idle;
        self.generation += 1;
        debug!(category = ?self.category, generation = self.generation, "feed reset");
        self.begin(true)
    }

    /// Next page, only when the last one was full and nothing is in flight.
    pub fn load_more(&mut self) -> Option<PendingFetch> {
        match self.status {
            FeedStatus::LoadedMoreAvailable => Some(self.begin(false)),
            _ => None,
        }
    }

    pub fn on_scroll(&mut self, metrics: ScrollMetrics) -> Option<PendingFetch> {
        if !metrics.near_bottom() {
            return None;
        }
        self.load_more()
    }

    /// Re-run the failed fetch from the same cursor.
    pub fn retry(&mut self) -> Option<PendingFetch> {
        match self.status {
            FeedStatus::Error => Some(self.begin(false)),
            _ => None,
        }
    }

    fn begin(&mut self, reset: bool) -> PendingFetch {
        self.status = FeedStatus::Loading;
        self.error = None;
        PendingFetch {
            generation: self.generation,
            reset,
            request: FeedRequest {
                category: self.category.clone(),
                first: self.page_size,
                after: if reset { None } else { self.cursor.clone() },
            },
        }
    }

    /// Merge the result of `pending` into the feed.
    pub fn complete(
        &mut self,
        pending: PendingFetch,
        result: Result<Vec<Project>, ShowcaseError>,
    ) -> FetchOutcome {
        if pending.generation != self.generation || self.status != FeedStatus::Loading {
            debug!(
                generation = pending.generation,
                current = self.generation,
                "dropping stale feed response"
            );
            return FetchOutcome::Stale;
        }

        let page = match result {
            Ok(page) => page,
            Err(err) => {
                warn!(?err, request = ?pending.request, "feed fetch failed");
                self.status = FeedStatus::Error;
                self.error = Some(FEED_ERROR_MESSAGE);
                return FetchOutcome::Failed;
            }
        };

        let returned = page.len();
        let survivors = self.seen.admit(page);
        let appended = survivors.len();
        if let Some(last) = survivors.last() {
            self.cursor = Some(last.id.clone());
        }
        if pending.reset {
            self.projects = survivors;
        } else {
            self.projects.extend(survivors);
        }

        self.status = if (returned as i64) < self.page_size {
            FeedStatus::LoadedExhausted
        } else {
            FeedStatus::LoadedMoreAvailable
        };
        debug!(returned, appended, status = ?self.status, cursor = ?self.cursor, "feed page merged");
        FetchOutcome::Applied { appended }
    }

    /// Perform `pending` through `transport` and merge the result.
    pub async fn run<T>(&mut self, transport: &T, pending: PendingFetch) -> FetchOutcome
    where
        T: FeedTransport + ?Sized,
    {
        let result = transport.fetch_projects(pending.request()).await;
        self.complete(pending, result)
    }
}
