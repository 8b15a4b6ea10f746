//! Background poster prefetch
//!
//! Walks the popular catalog page by page and fills the asset cache with every
//! poster it does not already hold. At most one run is active at a time, and a
//! completed run blocks new ones until the cool-down has passed.

use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::{
    cache::AssetCache,
    models::Movie,
    services::providers::{CatalogClient, PosterSource},
};

pub mod state;

pub use state::{PrefetchRunState, RunStateStore};

/// Tunables for a prefetch run
#[derive(Debug, Clone, Copy)]
pub struct PrefetchSettings {
    /// Last page fetched, inclusive
    pub max_pages: u32,
    /// Minimum time between the end of one run and the start of the next
    pub cooldown: Duration,
}

impl Default for PrefetchSettings {
    fn default() -> Self {
        Self {
            max_pages: 50,
            cooldown: Duration::days(7),
        }
    }
}

#[derive(Default)]
struct RunSlot {
    active: bool,
    last_completed_at: Option<DateTime<Utc>>,
    task: Option<JoinHandle<()>>,
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunOutcome {
    /// Every page was walked, the catalog ran out, or a page fetch failed
    Completed,
    /// The cancellation token fired between pages
    Cancelled,
}

pub struct PosterPrefetcher {
    catalog: Arc<dyn CatalogClient>,
    posters: Arc<dyn PosterSource>,
    cache: AssetCache,
    state_store: RunStateStore,
    settings: PrefetchSettings,
    cancel: CancellationToken,
    slot: Mutex<RunSlot>,
}

impl PosterPrefetcher {
    /// Creates the prefetcher, seeding the cool-down from the persisted state
    pub async fn new(
        catalog: Arc<dyn CatalogClient>,
        posters: Arc<dyn PosterSource>,
        cache: AssetCache,
        state_store: RunStateStore,
        settings: PrefetchSettings,
        cancel: CancellationToken,
    ) -> Self {
        let persisted = state_store.load().await;

        tracing::info!(
            last_completed_at = ?persisted.last_completed_at,
            max_pages = settings.max_pages,
            "Poster prefetcher ready"
        );

        Self {
            catalog,
            posters,
            cache,
            state_store,
            settings,
            cancel,
            slot: Mutex::new(RunSlot {
                last_completed_at: persisted.last_completed_at,
                ..RunSlot::default()
            }),
        }
    }

    /// Starts a run unless one is active or the last one finished within the
    /// cool-down. Returns immediately either way.
    pub fn start_if_needed(self: &Arc<Self>) {
        let mut slot = self.lock_slot();

        if slot.active {
            tracing::debug!("Poster prefetch already running");
            return;
        }

        if let Some(last) = slot.last_completed_at {
            let elapsed = Utc::now().signed_duration_since(last);
            // abs() so a clock moved backwards does not block prefetch forever
            if elapsed.abs() <= self.settings.cooldown {
                tracing::debug!(last_completed_at = %last, "Poster prefetch within cool-down");
                return;
            }
        }

        slot.active = true;
        let prefetcher = Arc::clone(self);
        slot.task = Some(tokio::spawn(async move { prefetcher.run().await }));

        tracing::info!("Poster prefetch started");
    }

    pub fn is_running(&self) -> bool {
        self.lock_slot().active
    }

    pub fn last_completed_at(&self) -> Option<DateTime<Utc>> {
        self.lock_slot().last_completed_at
    }

    /// Waits for the run started by the last `start_if_needed`, if any
    pub async fn wait(&self) {
        let task = self.lock_slot().task.take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Poster prefetch task failed");
                self.lock_slot().active = false;
            }
        }
    }

    fn lock_slot(&self) -> MutexGuard<'_, RunSlot> {
        // The slot holds plain data, so a poisoned lock is still usable
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn run(self: Arc<Self>) {
        let outcome = self.walk_pages().await;
        let finished_at = Utc::now();

        if outcome == RunOutcome::Completed {
            self.state_store
                .save(&PrefetchRunState {
                    last_completed_at: Some(finished_at),
                })
                .await;
        }

        let mut slot = self.lock_slot();
        slot.active = false;
        match outcome {
            RunOutcome::Completed => {
                slot.last_completed_at = Some(finished_at);
                tracing::info!("Poster prefetch completed");
            }
            RunOutcome::Cancelled => {
                tracing::info!("Poster prefetch cancelled, will restart from page 1 next launch");
            }
        }
    }

    async fn walk_pages(&self) -> RunOutcome {
        for page in 1..=self.settings.max_pages {
            if self.cancel.is_cancelled() {
                return RunOutcome::Cancelled;
            }

            let movies = match self.catalog.fetch_page(page).await {
                Ok(movies) => movies,
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        page,
                        provider = self.catalog.name(),
                        "Poster prefetch page failed, ending run"
                    );
                    return RunOutcome::Completed;
                }
            };

            if movies.is_empty() {
                tracing::debug!(page, "Catalog exhausted");
                return RunOutcome::Completed;
            }

            if self.cancel.is_cancelled() {
                return RunOutcome::Cancelled;
            }

            self.cache_posters(page, movies).await;
        }

        RunOutcome::Completed
    }

    /// Fetches and stores every uncached poster of one page concurrently.
    ///
    /// A failed poster is logged and left uncached.
    async fn cache_posters(&self, page: u32, movies: Vec<Movie>) {
        let mut tasks = JoinSet::new();

        for movie in movies {
            let Some(path) = movie.poster_path else {
                continue;
            };
            if self.cache.has(&path).await {
                continue;
            }

            let posters = Arc::clone(&self.posters);
            let cache = self.cache.clone();
            tasks.spawn(async move {
                match posters.fetch_poster(&path).await {
                    Ok(bytes) => {
                        cache.store(&path, bytes).await;
                        true
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, path = %path, "Poster prefetch failed");
                        false
                    }
                }
            });
        }

        let (mut stored, mut failed) = (0usize, 0usize);
        while let Some(result) = tasks.join_next().await {
            match result {
                Ok(true) => stored += 1,
                Ok(false) => failed += 1,
                Err(e) => {
                    tracing::error!(error = %e, "Poster prefetch task join error");
                    failed += 1;
                }
            }
        }

        tracing::info!(page, stored, failed, "Poster prefetch page done");
    }
}
