//! The contract the cohort pipeline consumes from a FHIR server client.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::model::{ResultPage, SearchCriteria};

/// Access to a remote FHIR resource repository.
///
/// The pipeline awaits every call before issuing the next, so an
/// implementation never sees more than one request in flight from a single
/// search.
///
/// # Example
///
/// ```ignore
/// use octofhir_cohort::{ResourceClient, SearchCriteria};
///
/// async fn count_patients(client: &dyn ResourceClient) -> octofhir_cohort::Result<Option<u64>> {
///     let page = client.search("Patient", &SearchCriteria::all()).await?;
///     Ok(page.and_then(|p| p.total))
/// }
/// ```
#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// Runs a search and returns its first page.
    ///
    /// Returns `None` when the server answers without a page at all.
    async fn search(
        &self,
        resource_type: &str,
        criteria: &SearchCriteria,
    ) -> Result<Option<ResultPage>>;

    /// Fetches the page following `previous`.
    ///
    /// Returns `None` at the end of the result set. Only a failed fetch is an
    /// error.
    async fn continue_search(&self, previous: &ResultPage) -> Result<Option<ResultPage>>;

    /// Creates a resource and returns the representation assigned by the server.
    async fn create(&self, resource_type: &str, body: &Value) -> Result<Value>;

    /// Reads a resource by id.
    ///
    /// # Errors
    ///
    /// Returns `CohortError::NotFound` when the server reports the id as missing.
    async fn read(&self, resource_type: &str, id: &str) -> Result<Value>;

    /// Deletes a resource by id.
    ///
    /// # Errors
    ///
    /// Returns `CohortError::NotFound` when the server reports the id as missing.
    async fn delete(&self, resource_type: &str, id: &str) -> Result<()>;
}
