//! Per-patient encounter lookup deciding cohort membership.

use crate::client::ResourceClient;
use crate::error::Result;
use crate::model::{ENCOUNTER, SearchCriteria};

/// Outcome of the encounter lookup for one patient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichmentDecision {
    pub included: bool,
    /// Encounters the server reports for the patient.
    pub encounter_total: u64,
    /// Encounters present on the first returned page.
    pub encounter_entries: usize,
}

/// Issues one encounter search per patient and applies the inclusion rule.
///
/// Nothing is cached: asking twice for the same patient sends two searches.
pub struct EncounterFilter<'a, C: ?Sized> {
    client: &'a C,
    only_with_encounters: bool,
}

impl<'a, C> EncounterFilter<'a, C>
where
    C: ResourceClient + ?Sized,
{
    pub fn new(client: &'a C, only_with_encounters: bool) -> Self {
        Self {
            client,
            only_with_encounters,
        }
    }

    /// Looks up the encounters of `patient_id` and decides inclusion.
    ///
    /// When the server omits `total`, the entries on the returned page stand
    /// in for it.
    ///
    /// # Errors
    ///
    /// A failed encounter search is returned as-is, never read as zero.
    pub async fn decide(&self, patient_id: &str) -> Result<EnrichmentDecision> {
        let criteria = SearchCriteria::for_patient_encounters(patient_id);
        let page = self.client.search(ENCOUNTER, &criteria).await?;

        let encounter_entries = page.as_ref().map_or(0, |p| p.len());
        let encounter_total = page
            .as_ref()
            .and_then(|p| p.total)
            .unwrap_or(encounter_entries as u64);
        let included = !(self.only_with_encounters && encounter_total == 0);

        tracing::debug!(
            patient_id,
            encounter_total,
            encounter_entries,
            included,
            "encounter lookup"
        );

        Ok(EnrichmentDecision {
            included,
            encounter_total,
            encounter_entries,
        })
    }
}
