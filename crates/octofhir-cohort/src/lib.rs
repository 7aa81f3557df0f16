//! Bounded patient cohort search over a FHIR server.
//!
//! A cohort search runs a `Patient` search, follows the server's paging links
//! and asks the server for each patient's encounters before accepting it,
//! stopping as soon as enough patients have been collected.
//!
//! # Example
//!
//! ```ignore
//! use octofhir_cohort::{SearchCriteria, SearchOptions, TracingObserver, find_patients};
//!
//! let options = SearchOptions::default().with_only_with_encounters(true);
//! let patients = find_patients(&client, &SearchCriteria::all(), &options, &mut TracingObserver).await?;
//! ```

pub mod accumulator;
pub mod client;
pub mod cursor;
pub mod enrichment;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod observer;
pub mod search;

pub use accumulator::BoundedAccumulator;
pub use client::ResourceClient;
pub use cursor::PageCursor;
pub use enrichment::{EncounterFilter, EnrichmentDecision};
pub use error::{CohortError, Result};
pub use lifecycle::PatientLifecycle;
pub use model::{
    BundleEntry, ENCOUNTER, Encounter, HumanName, NewPatient, PATIENT, Patient, Reference,
    Resource, ResultPage, SearchCriteria,
};
pub use observer::{NoopObserver, SearchObserver, TracingObserver};
pub use search::{DEFAULT_MAX_COUNT, SearchOptions, find_patients};
