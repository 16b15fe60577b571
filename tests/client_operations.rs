// End-to-end resource calls against a mock RDS host
use nhncloud_rds::auth::{MemoryTokenStore, RefreshingTokenAuthenticator};
use nhncloud_rds::rds::schema::{
    AuthenticationPlugin, AuthorityType, BackupPolicy, CreateDbInstanceRequest,
    CreateDbUserRequest, DbInstanceStatus, Network, Storage,
};
use nhncloud_rds::rds::{ApplyType, CreateDbSchemaRequest, CreateHbaRuleRequest, HbaAuthMethod};
use nhncloud_rds::{
    ClientConfig, Credentials, MariaDbClient, MySqlClient, PostgresClient, RdsApi, RdsError,
    SchemaApi, TransportConfig,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ok_header() -> Value {
    json!({ "resultCode": 0, "resultMessage": "SUCCESS", "isSuccessful": true })
}

fn envelope(fields: Value) -> Value {
    let mut body = json!({ "header": ok_header() });
    if let (Some(body), Some(fields)) = (body.as_object_mut(), fields.as_object()) {
        body.extend(fields.clone());
    }
    body
}

fn bearer_config() -> ClientConfig {
    ClientConfig::new(
        "kr1",
        "app-key",
        Credentials::Bearer {
            token: "tok".to_string(),
        },
    )
}

fn transport_for(server: &MockServer) -> TransportConfig {
    TransportConfig::default()
        .with_base_url(server.uri())
        .with_timeout(Duration::from_secs(5))
}

fn instance_json(id: &str, status: &str) -> Value {
    json!({
        "dbInstanceId": id,
        "dbInstanceName": format!("{id}-name"),
        "dbVersion": "MYSQL_V8032",
        "dbPort": 3306,
        "dbInstanceStatus": status
    })
}

fn create_request(port: u16, password: &str) -> CreateDbInstanceRequest {
    CreateDbInstanceRequest {
        db_instance_name: "orders".to_string(),
        db_flavor_id: "flavor-1".to_string(),
        db_version: "MYSQL_V8032".to_string(),
        db_user_name: "admin".to_string(),
        db_password: password.to_string(),
        db_port: Some(port),
        parameter_group_id: "pg-1".to_string(),
        network: Network {
            subnet_id: "subnet-1".to_string(),
            ..Network::default()
        },
        storage: Storage {
            storage_type: "General SSD".to_string(),
            storage_size: 20,
        },
        backup: BackupPolicy {
            backup_period: 1,
            ..BackupPolicy::default()
        },
        ..CreateDbInstanceRequest::default()
    }
}

#[tokio::test]
async fn test_mysql_list_instances_sends_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3.0/db-instances"))
        .and(header("x-tc-app-key", "app-key"))
        .and(header("x-nhn-authorization", "Bearer tok"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "dbInstances": [instance_json("a", "AVAILABLE"), instance_json("b", "SHUTDOWN")]
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let client = MySqlClient::with_transport_config(&bearer_config(), &transport_for(&server))
        .unwrap();
    let instances = client.list_db_instances().await.unwrap();

    assert_eq!(instances.len(), 2);
    assert_eq!(instances[0].db_instance_id, "a");
    assert_eq!(instances[1].db_instance_status, DbInstanceStatus::Shutdown);
}

#[tokio::test]
async fn test_postgres_uses_its_own_api_version() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/db-versions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "dbVersions": [{ "dbVersion": "POSTGRESQL_V146", "dbVersionName": "PostgreSQL 14.6" }]
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let client = PostgresClient::with_transport_config(&bearer_config(), &transport_for(&server))
        .unwrap();
    let versions = client.list_db_versions().await.unwrap();
    assert_eq!(versions[0].db_version, "POSTGRESQL_V146");
}

#[tokio::test]
async fn test_invalid_password_never_reaches_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = MySqlClient::with_transport_config(&bearer_config(), &transport_for(&server))
        .unwrap();
    for password in ["abc", "abcdefghijklmnopq"] {
        let err = client
            .create_db_instance(&create_request(3306, password))
            .await
            .unwrap_err();
        assert!(err.is_validation(), "{password}: {err}");
    }
}

#[tokio::test]
async fn test_create_instance_returns_job_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3.0/db-instances"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope(json!({ "jobId": "job-42" }))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = MySqlClient::with_transport_config(&bearer_config(), &transport_for(&server))
        .unwrap();
    let job = client
        .create_db_instance(&create_request(3306, "abcdefghijklmnop"))
        .await
        .unwrap();
    assert_eq!(job, "job-42");
}

#[tokio::test]
async fn test_failed_result_header_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3.0/db-instances/missing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "header": { "resultCode": 404, "resultMessage": "Not found", "isSuccessful": false }
        })))
        .mount(&server)
        .await;

    let client = MySqlClient::with_transport_config(&bearer_config(), &transport_for(&server))
        .unwrap();
    match client.get_db_instance("missing").await.unwrap_err() {
        RdsError::Api { code, message } => {
            assert_eq!(code, 404);
            assert_eq!(message, "Not found");
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_is_http_error_and_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3.0/db-flavors"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let client = MariaDbClient::with_transport_config(&bearer_config(), &transport_for(&server))
        .unwrap();
    let err = client.list_db_flavors().await.unwrap_err();
    assert!(err.is_retryable());
    match err {
        RdsError::Http { status, body, .. } => {
            assert_eq!(status.as_u16(), 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("expected HTTP error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_backups_filter_by_instance() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3.0/backups"))
        .and(query_param("dbInstanceId", "db-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "backups": [{
                "backupId": "bk-1",
                "backupName": "nightly",
                "backupStatus": "COMPLETED",
                "dbInstanceId": "db-1"
            }]
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let client = MySqlClient::with_transport_config(&bearer_config(), &transport_for(&server))
        .unwrap();
    let backups = client.list_backups(Some("db-1")).await.unwrap();
    assert_eq!(backups.len(), 1);
    assert_eq!(backups[0].backup_name, "nightly");
}

#[tokio::test]
async fn test_instance_actions_post_to_action_path() {
    let server = MockServer::start().await;
    for action in ["start", "stop", "restart"] {
        Mock::given(method("POST"))
            .and(path(format!("/v3.0/db-instances/db-1/{action}")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(envelope(json!({ "jobId": format!("job-{action}") }))),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = MySqlClient::with_transport_config(&bearer_config(), &transport_for(&server))
        .unwrap();
    assert_eq!(client.start_db_instance("db-1").await.unwrap(), "job-start");
    assert_eq!(client.stop_db_instance("db-1").await.unwrap(), "job-stop");
    assert_eq!(client.restart_db_instance("db-1").await.unwrap(), "job-restart");
}

#[tokio::test]
async fn test_user_auth_plugins_follow_the_family() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3.0/db-instances/db-1/db-users"))
        .and(body_json(json!({
            "dbUserName": "app",
            "password": "pa55word",
            "host": "%",
            "authorityType": "CRUD",
            "authenticationPlugin": "ED25519"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope(json!({ "jobId": "job-u" }))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let request = CreateDbUserRequest {
        db_user_name: "app".to_string(),
        password: "pa55word".to_string(),
        host: Some("%".to_string()),
        authority_type: AuthorityType::Crud,
        authentication_plugin: Some(AuthenticationPlugin::Ed25519),
    };

    let mariadb = MariaDbClient::with_transport_config(&bearer_config(), &transport_for(&server))
        .unwrap();
    assert_eq!(mariadb.create_db_user("db-1", &request).await.unwrap(), "job-u");

    let mysql = MySqlClient::with_transport_config(&bearer_config(), &transport_for(&server))
        .unwrap();
    let err = mysql.create_db_user("db-1", &request).await.unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn test_mysql_schema_lifecycle() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3.0/db-instances/db-1/db-schemas"))
        .and(body_json(json!({ "dbSchemaName": "orders" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope(json!({ "jobId": "job-s" }))),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3.0/db-instances/db-1/db-schemas"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "dbSchemas": [{ "dbSchemaId": "s-1", "dbSchemaName": "orders" }]
        }))))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v3.0/db-instances/db-1/db-schemas/s-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope(json!({ "jobId": "job-d" }))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = MySqlClient::with_transport_config(&bearer_config(), &transport_for(&server))
        .unwrap();
    let job = client
        .create_db_schema("db-1", &CreateDbSchemaRequest::new("orders"))
        .await
        .unwrap();
    assert_eq!(job, "job-s");

    let schemas = client.list_db_schemas("db-1").await.unwrap();
    assert_eq!(schemas[0].db_schema_id, "s-1");

    assert_eq!(client.delete_db_schema("db-1", "s-1").await.unwrap(), "job-d");
}

#[tokio::test]
async fn test_postgres_hba_rules() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1.0/db-instances/db-1/hba-rules"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope(json!({ "jobId": "job-h" }))),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1.0/db-instances/db-1/hba-rules/apply"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope(json!({ "jobId": "job-a" }))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = PostgresClient::with_transport_config(&bearer_config(), &transport_for(&server))
        .unwrap();

    let mut invalid = CreateHbaRuleRequest::entire("10.0.0.0/24", HbaAuthMethod::Md5);
    invalid.user.applicable_type = ApplyType::UserDefined;
    assert!(client.create_hba_rule("db-1", &invalid).await.unwrap_err().is_validation());

    let rule = CreateHbaRuleRequest::entire("10.0.0.0/24", HbaAuthMethod::ScramSha256);
    assert_eq!(client.create_hba_rule("db-1", &rule).await.unwrap(), "job-h");
    assert_eq!(client.apply_hba_rules("db-1").await.unwrap(), "job-a");
}

#[tokio::test]
async fn test_refreshing_credentials_mint_once_for_many_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token/create"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "minted",
            "token_type": "Bearer",
            "expires_in": 86400
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3.0/storage-types"))
        .and(header("x-nhn-authorization", "Bearer minted"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "storageTypes": ["General SSD", "General HDD"]
        }))))
        .expect(3)
        .mount(&server)
        .await;

    let config = ClientConfig::new(
        "kr1",
        "app-key",
        Credentials::RefreshingBearer {
            access_key: "access".to_string(),
            secret_key: "secret".to_string(),
        },
    );
    let authenticator = RefreshingTokenAuthenticator::new(
        "app-key",
        "access",
        "secret",
        Arc::new(MemoryTokenStore::new()),
    )
    .unwrap()
    .with_token_endpoint(format!("{}/oauth2/token/create", server.uri()));

    let client =
        MySqlClient::with_authenticator(&config, &transport_for(&server), Arc::new(authenticator))
            .unwrap();
    for _ in 0..3 {
        let types = client.list_storage_types().await.unwrap();
        assert_eq!(types, ["General SSD", "General HDD"]);
    }
}

#[tokio::test]
async fn test_missing_app_key_fails_before_any_request() {
    let config = ClientConfig::new(
        "kr1",
        "",
        Credentials::Bearer {
            token: "tok".to_string(),
        },
    );
    let err = PostgresClient::new(&config).unwrap_err();
    assert!(err.is_validation());
}
