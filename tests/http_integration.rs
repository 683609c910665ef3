//! Integration tests for the elastic pool resource using wiremock
//!
//! These tests drive the real ARM client against mocked endpoints, covering
//! long-running operation polling, not-found handling and error bodies.

use azsqlpool::azure::auth::AzureCredentials;
use azsqlpool::azure::client::AzureClient;
use azsqlpool::azure::elastic_pools::{ElasticPoolsApi, ElasticPoolsClient};
use azsqlpool::azure::http::ApiError;
use azsqlpool::resource::{ElasticPoolResource, ResourceData};
use azsqlpool::{Operation, ResourceError};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{bearer_token, body_json, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SUBSCRIPTION: &str = "00000000-0000-0000-0000-000000000000";
const POOL_PATH: &str = "/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/rg1/providers/Microsoft.Sql/servers/srv1/elasticPools/pool1";

fn pools(server: &MockServer) -> ElasticPoolsClient {
    let client = AzureClient::new(AzureCredentials::from_token("test-token"), SUBSCRIPTION)
        .expect("client should build")
        .with_endpoint(&server.uri())
        .with_poll_interval(Duration::from_millis(10));
    ElasticPoolsClient::new(client)
}

fn pool_body(creation_date: &str) -> Value {
    json!({
        "id": POOL_PATH,
        "name": "pool1",
        "type": "Microsoft.Sql/servers/elasticPools",
        "location": "West US",
        "properties": {
            "creationDate": creation_date,
            "state": "Ready",
            "edition": "Standard",
            "dtu": 100,
            "databaseDtuMin": 0,
            "databaseDtuMax": 100,
            "storageMB": 102400
        }
    })
}

fn minimal_attributes() -> ResourceData {
    ResourceData::from_attributes(
        json!({
            "name": "pool1",
            "server_name": "srv1",
            "resource_group_name": "rg1",
            "location": "westus",
            "edition": "Standard",
            "dtu": 100
        })
        .as_object()
        .cloned()
        .unwrap(),
    )
}

/// Create against a server that answers with an async operation
mod lifecycle_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_waits_for_operation_then_reads() {
        let server = MockServer::start().await;
        let operation_url = format!("{}/operations/op-1", server.uri());

        Mock::given(method("PUT"))
            .and(path(POOL_PATH))
            .and(query_param("api-version", "2015-05-01-preview"))
            .and(bearer_token("test-token"))
            .and(header_exists("x-ms-client-request-id"))
            .and(body_json(json!({
                "name": "pool1",
                "location": "westus",
                "tags": {},
                "properties": {"edition": "Standard", "dtu": 100}
            })))
            .respond_with(
                ResponseTemplate::new(202)
                    .insert_header("Azure-AsyncOperation", operation_url.as_str())
                    .insert_header("Retry-After", "0"),
            )
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/operations/op-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "InProgress"})))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/operations/op-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "Succeeded"})))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(POOL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(pool_body("2024-01-01T00:00:00Z")))
            .expect(2)
            .mount(&server)
            .await;

        let client = pools(&server);
        let mut data = minimal_attributes();

        ElasticPoolResource::new()
            .create(&mut data, &client)
            .await
            .expect("create should succeed");

        assert_eq!(data.id(), POOL_PATH);
        assert_eq!(data.get_str("creation_date"), Some("2024-01-01T00:00:00Z"));
        assert_eq!(data.get_str("location"), Some("westus"));
        assert_eq!(data.get_i32("db_dtu_max"), Some(100));
        assert!(data.get_string_map("tags").is_empty());
    }

    #[tokio::test]
    async fn test_failed_operation_surfaces_as_api_error() {
        let server = MockServer::start().await;
        let operation_url = format!("{}/operations/op-2", server.uri());

        Mock::given(method("PUT"))
            .and(path(POOL_PATH))
            .respond_with(
                ResponseTemplate::new(201).insert_header("Azure-AsyncOperation", operation_url.as_str()),
            )
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/operations/op-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "Failed",
                "error": {"code": "ElasticPoolDtuLimit", "message": "DTU limit exceeded"}
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(POOL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(pool_body("2024-01-01T00:00:00Z")))
            .expect(0)
            .mount(&server)
            .await;

        let client = pools(&server);
        let mut data = minimal_attributes();

        let err = ElasticPoolResource::new()
            .create(&mut data, &client)
            .await
            .expect_err("create should fail");

        match err {
            ResourceError::Api {
                operation: Operation::Create,
                source: ApiError::OperationFailed { message, .. },
                ..
            } => assert_eq!(message, "DTU limit exceeded"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!data.has_id());
    }

    #[tokio::test]
    async fn test_location_polling_until_done() {
        let server = MockServer::start().await;
        let location_url = format!("{}/operationResults/op-3", server.uri());

        Mock::given(method("PUT"))
            .and(path(POOL_PATH))
            .respond_with(ResponseTemplate::new(202).insert_header("Location", location_url.as_str()))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/operationResults/op-3"))
            .respond_with(ResponseTemplate::new(202))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/operationResults/op-3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(pool_body("2024-01-01T00:00:00Z")))
            .expect(1)
            .mount(&server)
            .await;

        let client = pools(&server);
        let operation = client
            .create_or_update("rg1", "srv1", "pool1", &Default::default())
            .await
            .expect("put should be accepted");
        assert!(!operation.is_done());

        client
            .wait_for_completion(&operation)
            .await
            .expect("operation should complete");
    }

    #[tokio::test]
    async fn test_read_not_found_clears_id() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(POOL_PATH))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"code": "ResourceNotFound", "message": "The Resource was not found."}
            })))
            .mount(&server)
            .await;

        let client = pools(&server);
        let mut data = ResourceData::new();
        data.set_id(POOL_PATH);

        ElasticPoolResource::new()
            .read(&mut data, &client)
            .await
            .expect("not found is not an error");
        assert!(!data.has_id());
    }

    #[tokio::test]
    async fn test_read_server_error_keeps_id() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(POOL_PATH))
            .respond_with(ResponseTemplate::new(503).set_body_json(json!({
                "error": {"code": "ServerBusy", "message": "try later"}
            })))
            .mount(&server)
            .await;

        let client = pools(&server);
        let mut data = ResourceData::new();
        data.set_id(POOL_PATH);

        let err = ElasticPoolResource::new()
            .read(&mut data, &client)
            .await
            .expect_err("503 should propagate");

        match err.api_error() {
            Some(ApiError::Status { status, code, message }) => {
                assert_eq!(status.as_u16(), 503);
                assert_eq!(code, "ServerBusy");
                assert_eq!(message, "try later");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(data.id(), POOL_PATH);
    }

    #[tokio::test]
    async fn test_delete_issues_exactly_one_call() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path(POOL_PATH))
            .and(query_param("api-version", "2015-05-01-preview"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = pools(&server);
        let mut data = ResourceData::new();
        data.set_id(POOL_PATH);

        ElasticPoolResource::new()
            .delete(&mut data, &client)
            .await
            .expect("delete should succeed");
        assert!(!data.has_id());
    }

    #[tokio::test]
    async fn test_delete_accepted_is_not_awaited() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path(POOL_PATH))
            .respond_with(
                ResponseTemplate::new(202)
                    .insert_header("Location", format!("{}/never-polled", server.uri()).as_str()),
            )
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = pools(&server);
        let mut data = ResourceData::new();
        data.set_id(POOL_PATH);

        ElasticPoolResource::new()
            .delete(&mut data, &client)
            .await
            .expect("delete should succeed");
    }

    #[tokio::test]
    async fn test_import_populates_state() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(POOL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(pool_body("2023-05-06T07:08:09.123Z")))
            .mount(&server)
            .await;

        let client = pools(&server);
        let data = ElasticPoolResource::new()
            .import(POOL_PATH, &client)
            .await
            .expect("import should succeed");

        assert_eq!(data.get_str("server_name"), Some("srv1"));
        assert_eq!(data.get_str("resource_group_name"), Some("rg1"));
        assert_eq!(data.get_str("creation_date"), Some("2023-05-06T07:08:09Z"));
        assert_eq!(data.get_i32("pool_size"), Some(102400));
    }
}

/// Raw HTTP behaviour of the client
mod http_client_tests {
    use super::*;

    #[tokio::test]
    async fn test_401_returns_status_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(POOL_PATH))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"code": "InvalidAuthenticationToken", "message": "expired"}
            })))
            .mount(&server)
            .await;

        let err = pools(&server)
            .get("rg1", "srv1", "pool1")
            .await
            .expect_err("401 should fail");

        assert!(!err.is_not_found());
        assert_eq!(err.status().map(|s| s.as_u16()), Some(401));
    }

    #[tokio::test]
    async fn test_malformed_json_is_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(POOL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
            .mount(&server)
            .await;

        let err = pools(&server)
            .get("rg1", "srv1", "pool1")
            .await
            .expect_err("bad JSON should fail");

        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_read_tolerates_unparseable_creation_date() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(POOL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(pool_body("not-a-date")))
            .mount(&server)
            .await;

        let mut data = ResourceData::new();
        data.set_id(POOL_PATH);
        ElasticPoolResource::new()
            .read(&mut data, &pools(&server))
            .await
            .expect("read should succeed");

        assert_eq!(data.id(), POOL_PATH);
        assert!(!data.get_ok("creation_date"));
        assert_eq!(data.get_i32("pool_size"), Some(102400));
    }

    #[tokio::test]
    async fn test_update_with_mismatched_id_sends_nothing() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200).set_body_json(pool_body("2024-01-01T00:00:00Z")))
            .expect(0)
            .mount(&server)
            .await;

        let mut data = minimal_attributes();
        data.set("server_name", "srv2");
        data.set_id(POOL_PATH);

        let err = ElasticPoolResource::new()
            .update(&mut data, &pools(&server))
            .await
            .expect_err("mismatched server should fail");

        assert!(matches!(err, ResourceError::Validation(ref e) if e[0].field == "server_name"));
    }

    #[tokio::test]
    async fn test_accepted_without_poll_header_is_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path(POOL_PATH))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;

        let err = pools(&server)
            .create_or_update("rg1", "srv1", "pool1", &Default::default())
            .await
            .expect_err("202 without header should fail");

        assert!(matches!(err, ApiError::MissingPollUrl));
    }
}
