//! `ResourceClient` over the FHIR REST API.

use async_trait::async_trait;
use octofhir_cohort::{CohortError, ResourceClient, Result, ResultPage, SearchCriteria};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use url::Url;

use crate::bundle::decode_page;
use crate::config::{AuthHeader, ClientConfig};

const FHIR_JSON: &str = "application/fhir+json";

/// FHIR REST client speaking JSON.
pub struct HttpResourceClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl HttpResourceClient {
    /// Builds a client for the server described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `CohortError::Request` when the HTTP stack cannot be set up.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(transport_error)?;
        Ok(Self { http, config })
    }

    fn resource_url(&self, resource_type: &str, id: Option<&str>) -> Result<Url> {
        match id {
            Some(id) => self.config.resolve(&format!("{resource_type}/{id}")),
            None => self.config.resolve(resource_type),
        }
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        tracing::debug!(%method, %url, "FHIR request");
        // Credentials only go to the configured server.
        let same_origin = url.origin() == self.config.base_url().origin();
        if self.config.auth.is_some() && !same_origin {
            tracing::warn!(%url, "link leaves the configured server, sending without credentials");
        }
        let auth = self.config.auth.as_ref().filter(|_| same_origin);
        let mut req = self.http.request(method, url);
        match auth {
            Some(AuthHeader::Basic { username, password }) => {
                req = req.basic_auth(username, Some(password));
            }
            Some(AuthHeader::Bearer { token }) => {
                req = req.bearer_auth(token);
            }
            None => {}
        }
        req.header("Accept", FHIR_JSON)
    }

    async fn fetch_page(&self, req: RequestBuilder) -> Result<Option<ResultPage>> {
        let resp = req.send().await.map_err(transport_error)?;
        let body = handle_response(resp, None).await?;
        decode_page(body)
    }
}

#[async_trait]
impl ResourceClient for HttpResourceClient {
    async fn search(
        &self,
        resource_type: &str,
        criteria: &SearchCriteria,
    ) -> Result<Option<ResultPage>> {
        let url = self.resource_url(resource_type, None)?;
        let mut params: Vec<(String, String)> = criteria
            .pairs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        if let Some(page_size) = self.config.page_size
            && !params.iter().any(|(k, _)| k == "_count")
        {
            params.push(("_count".to_string(), page_size.to_string()));
        }

        let req = self.request(Method::GET, url).query(&params);
        self.fetch_page(req).await
    }

    async fn continue_search(&self, previous: &ResultPage) -> Result<Option<ResultPage>> {
        let Some(next) = previous.next.as_deref() else {
            return Ok(None);
        };
        let url = self.config.resolve(next)?;
        let req = self.request(Method::GET, url);
        self.fetch_page(req).await
    }

    async fn create(&self, resource_type: &str, body: &Value) -> Result<Value> {
        let url = self.resource_url(resource_type, None)?;
        let resp = self
            .request(Method::POST, url)
            .header("Content-Type", FHIR_JSON)
            .header("Prefer", self.config.prefer.header_value())
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        handle_response(resp, None).await
    }

    async fn read(&self, resource_type: &str, id: &str) -> Result<Value> {
        let url = self.resource_url(resource_type, Some(id))?;
        let resp = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(transport_error)?;
        handle_response(resp, Some((resource_type, id))).await
    }

    async fn delete(&self, resource_type: &str, id: &str) -> Result<()> {
        let url = self.resource_url(resource_type, Some(id))?;
        let resp = self
            .request(Method::DELETE, url)
            .send()
            .await
            .map_err(transport_error)?;
        handle_response(resp, Some((resource_type, id))).await?;
        Ok(())
    }
}

fn transport_error(err: reqwest::Error) -> CohortError {
    CohortError::transport(err.to_string())
}

/// Maps a response to its JSON body. 404/410 become `NotFound` when `target`
/// names the addressed resource.
async fn handle_response(resp: Response, target: Option<(&str, &str)>) -> Result<Value> {
    let status = resp.status();
    let body = resp.text().await.map_err(transport_error)?;

    if !status.is_success() {
        if let Some((resource_type, id)) = target
            && matches!(status, StatusCode::NOT_FOUND | StatusCode::GONE)
        {
            return Err(CohortError::not_found(resource_type, id));
        }
        return Err(CohortError::request(status.as_u16(), error_message(&body)));
    }

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(&body)
        .map_err(|e| CohortError::invalid_response(format!("Failed to parse response JSON: {e}")))
}

/// Diagnostics of an `OperationOutcome` body, or the raw body otherwise.
fn error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body)
        && json.get("resourceType").and_then(|v| v.as_str()) == Some("OperationOutcome")
        && let Some(issues) = json.get("issue").and_then(|v| v.as_array())
    {
        let msgs: Vec<&str> = issues
            .iter()
            .filter_map(|i| i.get("diagnostics").and_then(|d| d.as_str()))
            .collect();
        if !msgs.is_empty() {
            return msgs.join("; ");
        }
    }
    body.to_string()
}
