//! Scripted in-memory `ResourceClient` that records every call.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use octofhir_cohort::{
    BundleEntry, CohortError, ENCOUNTER, Patient, Resource, ResourceClient, Result, ResultPage,
    SearchCriteria,
};
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Search {
        resource_type: String,
        criteria: Vec<String>,
    },
    Continue {
        next: String,
    },
    Create {
        resource_type: String,
    },
    Read {
        id: String,
    },
    Delete {
        id: String,
    },
}

#[derive(Default)]
pub struct ScriptedClient {
    patient_pages: Vec<ResultPage>,
    empty_first_page: bool,
    encounter_totals: HashMap<String, Option<u64>>,
    encounter_entries: HashMap<String, usize>,
    failing_encounter_for: Option<String>,
    failing_continue: bool,
    stored: Mutex<HashMap<String, Value>>,
    next_id: Mutex<u32>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Patient pages in server order; continuation handles are wired up.
    pub fn with_patient_pages(mut self, pages: Vec<Vec<BundleEntry>>) -> Self {
        let count = pages.len();
        self.patient_pages = pages
            .into_iter()
            .enumerate()
            .map(|(i, entries)| ResultPage {
                total: Some(0),
                entries,
                next: (i + 1 < count).then(|| format!("page-{}", i + 1)),
            })
            .collect();
        let total: usize = self.patient_pages.iter().map(ResultPage::len).sum();
        for page in &mut self.patient_pages {
            page.total = Some(total as u64);
        }
        self
    }

    pub fn with_empty_first_page(mut self) -> Self {
        self.empty_first_page = true;
        self
    }

    pub fn with_encounters(mut self, patient_id: &str, total: u64) -> Self {
        self.encounter_totals
            .insert(patient_id.to_string(), Some(total));
        self
    }

    /// Encounter page without `total`, carrying `entries` encounters.
    pub fn with_untotalled_encounters(mut self, patient_id: &str, entries: usize) -> Self {
        self.encounter_totals.insert(patient_id.to_string(), None);
        self.encounter_entries.insert(patient_id.to_string(), entries);
        self
    }

    pub fn with_failing_encounter_search(mut self, patient_id: &str) -> Self {
        self.failing_encounter_for = Some(patient_id.to_string());
        self
    }

    pub fn with_failing_continue(mut self) -> Self {
        self.failing_continue = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn encounter_lookups(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Search {
                    resource_type,
                    criteria,
                } if resource_type == ENCOUNTER => criteria
                    .first()
                    .and_then(|c| c.strip_prefix("patient=Patient/"))
                    .map(str::to_string),
                _ => None,
            })
            .collect()
    }

    pub fn patient_page_fetches(&self) -> usize {
        self.calls()
            .into_iter()
            .filter(|call| match call {
                Call::Search { resource_type, .. } => resource_type == "Patient",
                Call::Continue { .. } => true,
                _ => false,
            })
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn encounter_page(&self, patient_id: &str) -> ResultPage {
        let total = self.encounter_totals.get(patient_id).copied().unwrap_or(Some(0));
        let entries = match total {
            Some(total) => total.min(10) as usize,
            None => self.encounter_entries.get(patient_id).copied().unwrap_or(0),
        };
        ResultPage {
            total,
            entries: (0..entries)
                .map(|i| BundleEntry {
                    full_url: Some(format!("http://test/Encounter/{patient_id}-{i}")),
                    resource: Some(
                        Resource::from_json(json!({
                            "resourceType": "Encounter",
                            "id": format!("{patient_id}-{i}"),
                            "subject": {"reference": format!("Patient/{patient_id}")}
                        }))
                        .unwrap(),
                    ),
                })
                .collect(),
            next: None,
        }
    }
}

#[async_trait]
impl ResourceClient for ScriptedClient {
    async fn search(
        &self,
        resource_type: &str,
        criteria: &SearchCriteria,
    ) -> Result<Option<ResultPage>> {
        self.record(Call::Search {
            resource_type: resource_type.to_string(),
            criteria: criteria.expressions().to_vec(),
        });

        if resource_type == ENCOUNTER {
            let patient_id = criteria
                .pairs()
                .find(|(k, _)| *k == "patient")
                .and_then(|(_, v)| v.strip_prefix("Patient/"))
                .unwrap_or_default()
                .to_string();
            if self.failing_encounter_for.as_deref() == Some(patient_id.as_str()) {
                return Err(CohortError::request(500, "encounter search failed"));
            }
            return Ok(Some(self.encounter_page(&patient_id)));
        }

        if self.empty_first_page {
            return Ok(None);
        }
        Ok(self.patient_pages.first().cloned())
    }

    async fn continue_search(&self, previous: &ResultPage) -> Result<Option<ResultPage>> {
        let Some(next) = previous.next.clone() else {
            return Ok(None);
        };
        self.record(Call::Continue { next: next.clone() });
        if self.failing_continue {
            return Err(CohortError::transport("connection reset"));
        }
        let index: usize = next
            .strip_prefix("page-")
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| CohortError::invalid_response("bad continuation handle"))?;
        Ok(self.patient_pages.get(index).cloned())
    }

    async fn create(&self, resource_type: &str, body: &Value) -> Result<Value> {
        self.record(Call::Create {
            resource_type: resource_type.to_string(),
        });
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let id = format!("created-{next_id}");
        let mut stored = body.clone();
        stored["id"] = json!(id);
        self.stored.lock().unwrap().insert(id, stored.clone());
        Ok(stored)
    }

    async fn read(&self, resource_type: &str, id: &str) -> Result<Value> {
        self.record(Call::Read { id: id.to_string() });
        self.stored
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| CohortError::not_found(resource_type, id))
    }

    async fn delete(&self, resource_type: &str, id: &str) -> Result<()> {
        self.record(Call::Delete { id: id.to_string() });
        match self.stored.lock().unwrap().remove(id) {
            Some(_) => Ok(()),
            None => Err(CohortError::not_found(resource_type, id)),
        }
    }
}

pub fn patient_entry(id: &str) -> BundleEntry {
    BundleEntry {
        full_url: Some(format!("http://test/Patient/{id}")),
        resource: Some(Resource::Patient(Patient {
            id: Some(id.to_string()),
            ..Default::default()
        })),
    }
}

pub fn reference_only_entry(id: &str) -> BundleEntry {
    BundleEntry {
        full_url: Some(format!("http://test/Patient/{id}")),
        resource: None,
    }
}

pub fn ids(patients: &[Patient]) -> Vec<&str> {
    patients.iter().filter_map(Patient::id).collect()
}
