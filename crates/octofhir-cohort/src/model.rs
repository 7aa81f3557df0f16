//! Resource and search types shared by the cohort pipeline.
//!
//! Payloads arrive as FHIR JSON. Only the fields the pipeline reads are typed;
//! everything else rides along untouched in the `other` maps so that a resource
//! can be handed back to the server without losing attributes.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use time::Date;
use time::macros::format_description;

use crate::error::{CohortError, Result};

/// Resource type searched and managed by the pipeline.
pub const PATIENT: &str = "Patient";

/// Resource type used to decide whether a patient has encounters.
pub const ENCOUNTER: &str = "Encounter";

/// Ordered `key=value` filter expressions passed verbatim to the server.
///
/// An empty criteria set matches every resource of the searched type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    expressions: Vec<String>,
}

impl SearchCriteria {
    /// Criteria that match every resource.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Builds criteria from `key=value` expressions, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns `CohortError::Validation` when an expression has no `=` or an
    /// empty key.
    pub fn parse<I, S>(expressions: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let expressions = expressions
            .into_iter()
            .map(Into::into)
            .map(|expr: String| {
                let valid = expr
                    .split_once('=')
                    .is_some_and(|(key, _)| !key.trim().is_empty());
                if valid {
                    Ok(expr)
                } else {
                    Err(CohortError::validation(format!(
                        "Invalid search criterion \"{expr}\". Expected format: key=value"
                    )))
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { expressions })
    }

    /// Criteria selecting the encounters that reference the given patient.
    #[must_use]
    pub fn for_patient_encounters(patient_id: &str) -> Self {
        Self {
            expressions: vec![format!("patient={PATIENT}/{patient_id}")],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }

    pub fn expressions(&self) -> &[String] {
        &self.expressions
    }

    /// The expressions split into query parameter pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.expressions.iter().filter_map(|e| e.split_once('='))
    }
}

/// A FHIR `Reference` datatype.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// A FHIR `HumanName` datatype.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HumanName {
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub name_use: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub given: Vec<String>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl fmt::Display for HumanName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(text) = self.text.as_deref().filter(|t| !t.trim().is_empty()) {
            return f.write_str(text);
        }
        let parts: Vec<&str> = self
            .given
            .iter()
            .map(String::as_str)
            .chain(self.family.as_deref())
            .collect();
        f.write_str(&parts.join(" "))
    }
}

/// The primary resource of a cohort search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<HumanName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Patient {
    /// Server-assigned id, if the payload carries a usable one.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.trim().is_empty())
    }

    /// The first name, rendered for display.
    pub fn display_name(&self) -> Option<String> {
        self.name.first().map(ToString::to_string)
    }

}

/// Related resource whose per-patient count drives inclusion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Encounter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<Reference>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// An embedded resource payload, tagged by its `resourceType`.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    Patient(Patient),
    Encounter(Encounter),
    Other { resource_type: String, body: Value },
}

impl Resource {
    /// Decodes a FHIR JSON resource.
    ///
    /// # Errors
    ///
    /// Returns `CohortError::InvalidResponse` when `resourceType` is missing or
    /// when a known type does not match its shape.
    pub fn from_json(value: Value) -> Result<Self> {
        let resource_type = value
            .get("resourceType")
            .and_then(Value::as_str)
            .ok_or_else(|| CohortError::invalid_response("resource without resourceType"))?
            .to_string();

        match resource_type.as_str() {
            PATIENT => serde_json::from_value(value)
                .map(Self::Patient)
                .map_err(|e| malformed(&resource_type, e)),
            ENCOUNTER => serde_json::from_value(value)
                .map(Self::Encounter)
                .map_err(|e| malformed(&resource_type, e)),
            _ => Ok(Self::Other {
                resource_type,
                body: value,
            }),
        }
    }

    pub fn resource_type(&self) -> &str {
        match self {
            Self::Patient(_) => PATIENT,
            Self::Encounter(_) => ENCOUNTER,
            Self::Other { resource_type, .. } => resource_type,
        }
    }
}

fn malformed(resource_type: &str, err: serde_json::Error) -> CohortError {
    CohortError::invalid_response(format!("malformed {resource_type}: {err}"))
}

/// One entry of a search result page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BundleEntry {
    pub full_url: Option<String>,
    /// `None` for reference-only entries.
    pub resource: Option<Resource>,
}

impl BundleEntry {
    /// The embedded patient, if this entry carries one.
    pub fn patient(&self) -> Option<&Patient> {
        match &self.resource {
            Some(Resource::Patient(patient)) => Some(patient),
            _ => None,
        }
    }
}

/// A single page of search results as returned by the server.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultPage {
    /// Server's count of all matches; may exceed the page size.
    pub total: Option<u64>,
    pub entries: Vec<BundleEntry>,
    /// Opaque continuation handle (the Bundle's `next` link).
    pub next: Option<String>,
}

impl ResultPage {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

/// Minimal identity attributes for creating a patient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPatient {
    pub family: String,
    pub given: Vec<String>,
    pub birth_date: Date,
}

impl NewPatient {
    pub fn new(family: impl Into<String>, given: Vec<String>, birth_date: Date) -> Self {
        Self {
            family: family.into(),
            given,
            birth_date,
        }
    }

    /// Renders the FHIR `Patient` body sent on creation.
    ///
    /// # Errors
    ///
    /// Returns `CohortError::Validation` when no name part is present.
    pub fn to_resource(&self) -> Result<Value> {
        let given: Vec<&str> = self
            .given
            .iter()
            .map(|g| g.trim())
            .filter(|g| !g.is_empty())
            .collect();
        if self.family.trim().is_empty() && given.is_empty() {
            return Err(CohortError::validation("Patient name must not be empty"));
        }

        let birth_date = self
            .birth_date
            .format(format_description!("[year]-[month]-[day]"))
            .map_err(|e| CohortError::validation(format!("Invalid birth date: {e}")))?;

        let mut name = json!({ "use": "official" });
        if !self.family.trim().is_empty() {
            name["family"] = json!(self.family.trim());
        }
        if !given.is_empty() {
            name["given"] = json!(given);
        }

        Ok(json!({
            "resourceType": PATIENT,
            "name": [name],
            "birthDate": birth_date,
        }))
    }
}
