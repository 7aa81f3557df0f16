//! Bounded collection of patients that pass the encounter filter.

use crate::client::ResourceClient;
use crate::cursor::PageCursor;
use crate::enrichment::EncounterFilter;
use crate::error::Result;
use crate::model::Patient;
use crate::observer::SearchObserver;

/// Collects accepted patients in discovery order, up to `max_count`.
///
/// Patients are not de-duplicated; a server that reorders results between
/// pages can hand out the same patient twice and both copies count.
#[derive(Debug, Clone)]
pub struct BoundedAccumulator {
    max_count: usize,
    patients: Vec<Patient>,
}

impl BoundedAccumulator {
    pub fn new(max_count: usize) -> Self {
        Self {
            max_count,
            patients: Vec::with_capacity(max_count.min(64)),
        }
    }

    pub fn max_count(&self) -> usize {
        self.max_count
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.patients.len() >= self.max_count
    }

    pub fn into_patients(self) -> Vec<Patient> {
        self.patients
    }

    /// Pulls pages from `cursor` and accepts patients until full or exhausted.
    ///
    /// Entries are evaluated strictly in (page, position) order. Filling the
    /// bound stops evaluation at once: later entries of the same page get no
    /// encounter lookup and no further page is requested.
    ///
    /// # Errors
    ///
    /// The first failed page fetch or encounter lookup aborts the run.
    pub async fn run<C>(
        &mut self,
        cursor: &mut PageCursor<'_, C>,
        filter: &EncounterFilter<'_, C>,
        observer: &mut dyn SearchObserver,
    ) -> Result<()>
    where
        C: ResourceClient + ?Sized,
    {
        if self.is_full() {
            return Ok(());
        }

        let mut page_number = 0;
        while let Some(page) = cursor.next_page().await? {
            page_number += 1;
            observer.page_fetched(page_number, page);

            for entry in &page.entries {
                let Some(patient) = entry.patient() else {
                    tracing::debug!(
                        full_url = entry.full_url.as_deref().unwrap_or("-"),
                        "skipping entry without patient payload"
                    );
                    continue;
                };
                let Some(id) = patient.id() else {
                    tracing::warn!(
                        full_url = entry.full_url.as_deref().unwrap_or("-"),
                        "skipping patient without id"
                    );
                    continue;
                };

                let decision = filter.decide(id).await?;
                observer.entry_decided(patient, &decision);
                if !decision.included {
                    continue;
                }

                self.patients.push(patient.clone());
                observer.patient_accepted(self.patients.len(), entry, patient, &decision);
                if self.is_full() {
                    break;
                }
            }

            if self.is_full() {
                tracing::debug!(max_count = self.max_count, "cohort bound reached");
                break;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_bound_starts_full() {
        let acc = BoundedAccumulator::new(0);
        assert!(acc.is_full());
        assert!(acc.is_empty());
    }

    #[test]
    fn not_full_below_bound() {
        let acc = BoundedAccumulator::new(3);
        assert!(!acc.is_full());
        assert_eq!(acc.max_count(), 3);
    }
}
