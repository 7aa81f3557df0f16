//! Creation, retrieval and deletion of single patients.

use crate::client::ResourceClient;
use crate::error::{CohortError, Result};
use crate::model::{NewPatient, PATIENT, Patient, Resource};

/// Patient operations outside of the search pipeline.
pub struct PatientLifecycle<'a, C: ?Sized> {
    client: &'a C,
}

impl<'a, C> PatientLifecycle<'a, C>
where
    C: ResourceClient + ?Sized,
{
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Creates a patient and returns it as stored by the server, id included.
    ///
    /// # Errors
    ///
    /// Returns `CohortError::InvalidResponse` when the server does not echo a
    /// patient back, e.g. when it was asked for a minimal return.
    pub async fn create(&self, new: &NewPatient) -> Result<Patient> {
        let body = new.to_resource()?;
        let created = self.client.create(PATIENT, &body).await?;
        let patient = into_patient(created)?;
        tracing::info!(id = patient.id().unwrap_or("-"), "patient created");
        Ok(patient)
    }

    /// Reads a patient by id.
    pub async fn read(&self, id: &str) -> Result<Patient> {
        let id = validate_id(id)?;
        let value = self.client.read(PATIENT, id).await?;
        into_patient(value)
    }

    /// Deletes a patient by id without checking that it exists first.
    ///
    /// # Errors
    ///
    /// A blank id fails with `CohortError::Validation` before any request.
    /// A missing patient surfaces as the server reports it.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let id = validate_id(id)?;
        self.client.delete(PATIENT, id).await?;
        tracing::info!(id, "patient deleted");
        Ok(())
    }

    /// Deletes the given patient, which must carry an id.
    pub async fn delete_patient(&self, patient: &Patient) -> Result<()> {
        let id = patient
            .id
            .as_deref()
            .ok_or_else(|| CohortError::validation("Patient id is required"))?;
        self.delete(id).await
    }
}

fn validate_id(id: &str) -> Result<&str> {
    let id = id.trim();
    if id.is_empty() {
        return Err(CohortError::validation("Patient id is required"));
    }
    Ok(id)
}

fn into_patient(value: serde_json::Value) -> Result<Patient> {
    if value.is_null() {
        return Err(CohortError::invalid_response(
            "server returned no patient representation",
        ));
    }
    match Resource::from_json(value)? {
        Resource::Patient(patient) => Ok(patient),
        other => Err(CohortError::invalid_response(format!(
            "expected Patient, got {}",
            other.resource_type()
        ))),
    }
}
