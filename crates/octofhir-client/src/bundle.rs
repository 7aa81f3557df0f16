//! Decoding of FHIR search Bundles into result pages.

use octofhir_cohort::{BundleEntry, CohortError, Resource, Result, ResultPage};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Bundle {
    resource_type: String,
    #[serde(default)]
    total: Option<u64>,
    #[serde(default)]
    link: Vec<BundleLink>,
    #[serde(default)]
    entry: Vec<RawEntry>,
}

#[derive(Debug, Deserialize)]
struct BundleLink {
    relation: String,
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntry {
    #[serde(default)]
    full_url: Option<String>,
    #[serde(default)]
    resource: Option<Value>,
}

/// Turns a search response body into a page; `null` means no page.
pub fn decode_page(body: Value) -> Result<Option<ResultPage>> {
    if body.is_null() {
        return Ok(None);
    }

    let bundle: Bundle = serde_json::from_value(body)
        .map_err(|e| CohortError::invalid_response(format!("malformed Bundle: {e}")))?;
    if bundle.resource_type != "Bundle" {
        return Err(CohortError::invalid_response(format!(
            "expected Bundle, got {}",
            bundle.resource_type
        )));
    }

    let next = bundle
        .link
        .into_iter()
        .find(|link| link.relation == "next")
        .map(|link| link.url);

    let entries = bundle
        .entry
        .into_iter()
        .map(|raw| {
            let resource = raw.resource.map(Resource::from_json).transpose()?;
            Ok(BundleEntry {
                full_url: raw.full_url,
                resource,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(ResultPage {
        total: bundle.total,
        entries,
        next,
    }))
}
