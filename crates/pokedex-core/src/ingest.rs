//! The ingestion pass: list one catalog page, resolve each entry's detail,
//! and commit the assembled creatures as a single batch.
//!
//! A pass is all-or-nothing. The first failure (listing, any detail fetch,
//! or the commit) aborts it and nothing from the pass becomes visible.

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, error, info, warn};

use crate::config::IngestConfig;
use crate::error::AppError;
use crate::models::{CatalogEntry, NewPokemon};
use crate::store::{CatalogSource, PokemonStore};

/// Progress of a single pass. `*Failed` and `Committed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PassState {
    NotStarted,
    Listing,
    Listed,
    ListingFailed,
    FetchingDetails,
    AllFetched,
    DetailFailed,
    Committing,
    Committed,
    CommitFailed,
}

impl PassState {
    fn is_terminal(self) -> bool {
        matches!(
            self,
            PassState::ListingFailed
                | PassState::DetailFailed
                | PassState::CommitFailed
                | PassState::Committed
        )
    }

    fn is_failure(self) -> bool {
        matches!(
            self,
            PassState::ListingFailed | PassState::DetailFailed | PassState::CommitFailed
        )
    }

    /// Whether `next` is a legal successor of `self`.
    fn can_advance_to(self, next: PassState) -> bool {
        use PassState::*;
        matches!(
            (self, next),
            (NotStarted, Listing)
                | (Listing, Listed)
                | (Listing, ListingFailed)
                | (Listed, FetchingDetails)
                | (FetchingDetails, AllFetched)
                | (FetchingDetails, DetailFailed)
                | (AllFetched, Committing)
                | (Committing, Committed)
                | (Committing, CommitFailed)
        )
    }
}

/// Records the state transitions of one pass and logs each of them.
///
/// A terminal state is final; failures are logged with the step they
/// interrupted.
#[derive(Debug)]
struct PassTracker {
    state: PassState,
}

impl PassTracker {
    fn new() -> Self {
        Self {
            state: PassState::NotStarted,
        }
    }

    fn advance(&mut self, next: PassState) {
        debug_assert!(
            !self.state.is_terminal(),
            "pass already ended in {:?}",
            self.state
        );
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal pass transition {:?} -> {:?}",
            self.state,
            next
        );
        if next.is_failure() {
            warn!("Ingestion pass aborted during {:?}: {:?}", self.state, next);
        } else {
            debug!("Ingestion pass: {:?} -> {:?}", self.state, next);
        }
        self.state = next;
    }

}

/// Summary of a committed pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Entries returned by the listing call.
    pub listed: usize,
    /// Entities committed to the store.
    pub stored: usize,
    /// Store-assigned ids, in listing order.
    pub ids: Vec<i32>,
}

/// Runs one ingestion pass against `source` and commits into `store`.
///
/// # Errors
///
/// Returns the first error encountered. Whatever the failing step, the store
/// is left exactly as it was before the call.
pub async fn run_pass<C, S>(
    source: &C,
    store: &S,
    config: &IngestConfig,
) -> Result<PassReport, AppError>
where
    C: CatalogSource + ?Sized,
    S: PokemonStore + ?Sized,
{
    let mut tracker = PassTracker::new();

    tracker.advance(PassState::Listing);
    info!("Fetching catalog listing (limit: {})...", config.limit);
    let entries = match list_entries(source, config.limit).await {
        Ok(entries) => entries,
        Err(e) => {
            tracker.advance(PassState::ListingFailed);
            return Err(e);
        }
    };
    tracker.advance(PassState::Listed);
    let listed = entries.len();
    info!("Found {} entries. Fetching details...", listed);

    tracker.advance(PassState::FetchingDetails);
    let batch = match fetch_details(source, entries, config.effective_concurrency()).await {
        Ok(batch) => batch,
        Err(e) => {
            tracker.advance(PassState::DetailFailed);
            return Err(e);
        }
    };
    tracker.advance(PassState::AllFetched);

    tracker.advance(PassState::Committing);
    let ids = match store.insert_batch(&batch).await {
        Ok(ids) => ids,
        Err(e) => {
            tracker.advance(PassState::CommitFailed);
            return Err(e);
        }
    };
    tracker.advance(PassState::Committed);

    info!("Pokemon data fetched and stored successfully ({} stored).", ids.len());
    Ok(PassReport {
        listed,
        stored: ids.len(),
        ids,
    })
}

/// Runs a pass at process startup, logging and swallowing any failure.
///
/// The caller keeps serving whatever was committed before; a failed pass is
/// only retried by restarting the process.
pub async fn run_startup_pass<C, S>(
    source: &C,
    store: &S,
    config: &IngestConfig,
) -> Option<PassReport>
where
    C: CatalogSource + ?Sized,
    S: PokemonStore + ?Sized,
{
    match run_pass(source, store, config).await {
        Ok(report) => Some(report),
        Err(e) => {
            error!("Ingestion pass failed, nothing stored: {}", e);
            None
        }
    }
}

async fn list_entries<C>(source: &C, limit: u32) -> Result<Vec<CatalogEntry>, AppError>
where
    C: CatalogSource + ?Sized,
{
    let mut entries = source.list_page(limit).await?;
    entries.truncate(limit as usize);

    if let Some(pos) = entries.iter().position(|e| e.name.trim().is_empty()) {
        return Err(AppError::InvalidRecord(format!(
            "listing entry {} has an empty name",
            pos + 1
        )));
    }

    Ok(entries)
}

/// Resolves every entry's detail, at most `concurrency` at a time.
///
/// `buffered` yields results in listing order, and `try_collect` drops the
/// remaining in-flight fetches as soon as one fails.
async fn fetch_details<C>(
    source: &C,
    entries: Vec<CatalogEntry>,
    concurrency: usize,
) -> Result<Vec<NewPokemon>, AppError>
where
    C: CatalogSource + ?Sized,
{
    let total = entries.len();

    stream::iter(entries.into_iter().enumerate())
        .map(move |(i, entry)| async move {
            match source.fetch_detail(&entry.url).await {
                Ok(detail) => {
                    debug!("[{}/{}] Fetched {}", i + 1, total, entry.name);
                    Ok(NewPokemon::from_parts(entry, detail))
                }
                Err(e) => {
                    error!("[{}/{}] Failed to fetch {}: {}", i + 1, total, entry.name, e);
                    Err(e)
                }
            }
        })
        .buffered(concurrency)
        .try_collect()
        .await
}
