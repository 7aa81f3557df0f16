//! Progress hooks for the cohort search.

use crate::enrichment::EnrichmentDecision;
use crate::model::{BundleEntry, Patient, ResultPage};

/// Receives progress events while a cohort search runs.
///
/// All hooks default to doing nothing.
pub trait SearchObserver: Send {
    /// A page of patients is about to be processed. `page_number` starts at 1.
    fn page_fetched(&mut self, _page_number: usize, _page: &ResultPage) {}

    /// The encounter lookup for `patient` finished.
    fn entry_decided(&mut self, _patient: &Patient, _decision: &EnrichmentDecision) {}

    /// `patient` joined the cohort at `position` (1-based).
    fn patient_accepted(
        &mut self,
        _position: usize,
        _entry: &BundleEntry,
        _patient: &Patient,
        _decision: &EnrichmentDecision,
    ) {
    }
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SearchObserver for NoopObserver {}

/// Observer that forwards progress to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl SearchObserver for TracingObserver {
    fn page_fetched(&mut self, page_number: usize, page: &ResultPage) {
        tracing::info!(
            page = page_number,
            total = ?page.total,
            entries = page.len(),
            "patient page fetched"
        );
    }

    fn patient_accepted(
        &mut self,
        position: usize,
        entry: &BundleEntry,
        patient: &Patient,
        decision: &EnrichmentDecision,
    ) {
        tracing::info!(
            position,
            full_url = entry.full_url.as_deref().unwrap_or("-"),
            id = patient.id().unwrap_or("-"),
            name = patient.display_name().as_deref().unwrap_or("-"),
            encounters = decision.encounter_total,
            "patient accepted"
        );
    }
}
