use httpmock::prelude::*;
use serde_json::json;

use mdk_registry::{HttpRegistryClient, RegistryClient, RegistryError, Stage};

/// The HTTP client resolves the latest staging version from an MLflow-style
/// get-latest-versions response, including the capitalized wire stage.
#[tokio::test]
async fn latest_version_decodes_wire_response() {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/2.0/mlflow/registered-models/get-latest-versions")
                .json_body(json!({ "name": "churn_model", "stages": ["staging"] }));
            then.status(200).json_body(json!({
                "model_versions": [
                    { "name": "churn_model", "version": "12", "current_stage": "Staging" }
                ]
            }));
        })
        .await;

    let client = HttpRegistryClient::new(server.base_url());
    let v = client
        .latest_version("churn_model", Stage::Staging)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(v.name, "churn_model");
    assert_eq!(v.version, "12");
    assert_eq!(v.stage, Stage::Staging);
}

/// An empty model_versions list means no version sits in the requested stage.
#[tokio::test]
async fn empty_stage_maps_to_not_found() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/2.0/mlflow/registered-models/get-latest-versions");
            then.status(200).json_body(json!({ "model_versions": [] }));
        })
        .await;

    let client = HttpRegistryClient::new(server.base_url());
    let err = client
        .latest_version("churn_model", Stage::Production)
        .await
        .unwrap_err();

    match err {
        RegistryError::NotFound { name, stage } => {
            assert_eq!(name, "churn_model");
            assert_eq!(stage, Stage::Production);
        }
        other => panic!("expected NotFound, got: {other}"),
    }
}

/// Promotion transitions carry archive_existing_versions so the registry
/// archives the prior production version in the same call.
#[tokio::test]
async fn transition_sends_archive_existing_flag() {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/2.0/mlflow/model-versions/transition-stage")
                .json_body(json!({
                    "name": "churn_model",
                    "version": "12",
                    "stage": "production",
                    "archive_existing_versions": true,
                }));
            then.status(200).json_body(json!({}));
        })
        .await;

    let client = HttpRegistryClient::new(server.base_url());
    client
        .transition_stage("churn_model", "12", Stage::Production, true)
        .await
        .unwrap();

    mock.assert_async().await;
}

/// A rejected transition surfaces the registry's status code and leaves no
/// doubt that nothing was changed.
#[tokio::test]
async fn rejected_transition_is_an_api_error() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/2.0/mlflow/model-versions/transition-stage");
            then.status(409).body("concurrent modification");
        })
        .await;

    let client = HttpRegistryClient::new(server.base_url());
    let err = client
        .transition_stage("churn_model", "12", Stage::Production, true)
        .await
        .unwrap_err();

    match err {
        RegistryError::Api { code, message } => {
            assert_eq!(code, Some(409));
            assert_eq!(message, "concurrent modification");
        }
        other => panic!("expected Api error, got: {other}"),
    }
}
