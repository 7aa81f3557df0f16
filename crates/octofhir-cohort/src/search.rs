//! Entry point of the cohort search.

use crate::accumulator::BoundedAccumulator;
use crate::client::ResourceClient;
use crate::cursor::PageCursor;
use crate::enrichment::EncounterFilter;
use crate::error::Result;
use crate::model::{PATIENT, Patient, SearchCriteria};
use crate::observer::SearchObserver;

/// Default upper bound on the number of returned patients.
pub const DEFAULT_MAX_COUNT: usize = 20;

/// Tuning for [`find_patients`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Maximum number of patients to return; `0` returns nothing.
    pub max_count: usize,
    /// Drop patients whose encounter search reports zero encounters.
    pub only_with_encounters: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_count: DEFAULT_MAX_COUNT,
            only_with_encounters: false,
        }
    }
}

impl SearchOptions {
    #[must_use]
    pub fn with_max_count(mut self, max_count: usize) -> Self {
        self.max_count = max_count;
        self
    }

    #[must_use]
    pub fn with_only_with_encounters(mut self, only_with_encounters: bool) -> Self {
        self.only_with_encounters = only_with_encounters;
        self
    }
}

/// Finds up to `options.max_count` patients matching `criteria`.
///
/// Every patient entry gets its own encounter search, issued only after the
/// previous patient was decided. Pages are followed until the bound is met or
/// the server runs out of results.
///
/// # Errors
///
/// Any failed request aborts the search; patients gathered so far are dropped.
pub async fn find_patients<C>(
    client: &C,
    criteria: &SearchCriteria,
    options: &SearchOptions,
    observer: &mut dyn SearchObserver,
) -> Result<Vec<Patient>>
where
    C: ResourceClient + ?Sized,
{
    if options.max_count == 0 {
        return Ok(Vec::new());
    }

    tracing::debug!(
        criteria = ?criteria.expressions(),
        max_count = options.max_count,
        only_with_encounters = options.only_with_encounters,
        "starting patient search"
    );

    let first = client.search(PATIENT, criteria).await?;
    let mut cursor = PageCursor::new(client, first);
    let filter = EncounterFilter::new(client, options.only_with_encounters);
    let mut accumulator = BoundedAccumulator::new(options.max_count);

    accumulator.run(&mut cursor, &filter, observer).await?;

    tracing::info!(
        found = accumulator.len(),
        pages = cursor.pages_fetched(),
        "patient search finished"
    );
    Ok(accumulator.into_patients())
}
