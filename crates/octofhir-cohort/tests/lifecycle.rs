//! Patient create/read/delete against a scripted server.

mod common;

use common::{Call, ScriptedClient};
use octofhir_cohort::{CohortError, NewPatient, Patient, PatientLifecycle};
use time::macros::date;

fn sample() -> NewPatient {
    NewPatient::new("Chalmers", vec!["Peter".to_string()], date!(1974 - 12 - 25))
}

#[tokio::test]
async fn create_then_delete_round_trip() {
    let client = ScriptedClient::new();
    let lifecycle = PatientLifecycle::new(&client);

    let created = lifecycle.create(&sample()).await.unwrap();
    let id = created.id().expect("server assigns an id").to_string();
    assert_eq!(created.birth_date.as_deref(), Some("1974-12-25"));
    assert_eq!(created.display_name().as_deref(), Some("Peter Chalmers"));

    lifecycle.delete(&id).await.unwrap();

    assert_eq!(
        client.calls(),
        [
            Call::Create {
                resource_type: "Patient".to_string()
            },
            Call::Delete { id }
        ]
    );
}

#[tokio::test]
async fn read_returns_created_patient() {
    let client = ScriptedClient::new();
    let lifecycle = PatientLifecycle::new(&client);

    let created = lifecycle.create(&sample()).await.unwrap();
    let read = lifecycle.read(created.id().unwrap()).await.unwrap();

    assert_eq!(read.id, created.id);
    assert_eq!(read.name, created.name);
}

#[tokio::test]
async fn blank_ids_fail_before_any_request() {
    let client = ScriptedClient::new();
    let lifecycle = PatientLifecycle::new(&client);

    for id in ["", "   "] {
        let err = lifecycle.delete(id).await.unwrap_err();
        assert!(err.is_validation(), "{id:?} should be rejected");
    }
    let err = lifecycle
        .delete_patient(&Patient::default())
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert!(lifecycle.read("").await.unwrap_err().is_validation());

    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn deleting_unknown_patient_reports_not_found() {
    let client = ScriptedClient::new();
    let lifecycle = PatientLifecycle::new(&client);

    let err = lifecycle.delete("missing").await.unwrap_err();

    assert!(matches!(
        err,
        CohortError::NotFound { ref resource_type, ref id }
            if resource_type == "Patient" && id == "missing"
    ));
    assert_eq!(client.calls(), [Call::Delete { id: "missing".to_string() }]);
}

#[tokio::test]
async fn delete_patient_uses_its_id() {
    let client = ScriptedClient::new();
    let lifecycle = PatientLifecycle::new(&client);

    let created = lifecycle.create(&sample()).await.unwrap();
    lifecycle.delete_patient(&created).await.unwrap();

    assert!(lifecycle.read(created.id().unwrap()).await.unwrap_err().is_not_found());
}
