//! Contract tests for HttpRepositoryClient against the Artifactory REST API.
//!
//! ## Endpoints Tested
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | GET    | `/api/repositories` | `list_repositories_*` |
//! | GET    | `/api/storage/{path}` | `list_children_*`, `item_info_*` |
//! | GET    | `/api/search/artifact?name=` | `search_by_name_*` |
//! | GET    | `/api/search/prop?k=v&...` | `search_by_property_*` |
//! | GET    | `/api/storage/{path}?properties[=names]` | `properties_*` |
//! | PUT    | `/api/storage/{path}?properties=k=v;...` | `set_properties_*` |
//! | DELETE | `/api/storage/{path}?properties=k,...` | `delete_properties_*` |
//! | PUT    | `/{repo}/{path}` | `put_file_*` |
//! | GET    | download URI | `check_exists_*`, `fetch_bytes_*`, `fetch_to_file_*` |

use rusty_artifactory_storage::{
    get_image_details, PropertyPair, RepositoryClient, RepositoryEntry, RepositoryError,
    RepositorySettings, RequestStatus,
};
use rusty_artifactory_storage_http::HttpRepositoryClient;
use wiremock::matchers::{body_bytes, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(mock_server: &MockServer) -> HttpRepositoryClient {
    let settings = RepositorySettings::new(
        format!("{}/artifactory/api", mock_server.uri()),
        "test-token",
    )
    .with_timeout_secs(5);
    HttpRepositoryClient::new(settings).unwrap()
}

fn storage_uri(mock_server: &MockServer, item: &str) -> String {
    format!("{}/artifactory/api/storage/{}", mock_server.uri(), item)
}

// ── GET /api/repositories ────────────────────────────────────────────

#[tokio::test]
async fn list_repositories_sends_bearer_token_and_returns_keys() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/artifactory/api/repositories"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "key": "libs-local", "type": "LOCAL" },
            { "key": "templates", "type": "LOCAL" }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let repositories: Vec<String> = client.list_repositories().await.unwrap();
    assert_eq!(repositories, vec!["libs-local", "templates"]);
}

#[tokio::test]
async fn list_repositories_server_error_keeps_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/artifactory/api/repositories"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = client.list_repositories().await.unwrap_err();
    assert!(matches!(
        err,
        RepositoryError::Transport {
            status: Some(503),
            ..
        }
    ));
}

// ── GET /api/storage/{path} ─────────────────────────────────────────

#[tokio::test]
async fn list_children_maps_folder_flags() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/artifactory/api/storage/templates/win"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "repo": "templates",
            "path": "/win",
            "children": [
                { "uri": "/2022", "folder": true },
                { "uri": "/win22.vmtx", "folder": false }
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let children: Vec<RepositoryEntry> = client.list_children("templates/win").await.unwrap();
    assert_eq!(
        children,
        vec![
            RepositoryEntry::folder("/2022"),
            RepositoryEntry::file("/win22.vmtx"),
        ]
    );
}

#[tokio::test]
async fn list_children_without_children_is_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/artifactory/api/storage/empty"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "repo": "empty",
            "path": "/"
        })))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    assert!(client.list_children("empty").await.unwrap().is_empty());
}

#[tokio::test]
async fn item_info_returns_created_and_download_uri() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/artifactory/api/storage/templates/win/win22.vmxt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "repo": "templates",
            "created": "2024-06-01T10:00:00.000Z",
            "downloadUri": "https://acme.jfrog.io/artifactory/templates/win/win22.vmxt"
        })))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let uri: String = storage_uri(&mock_server, "templates/win/win22.vmxt");
    assert_eq!(
        client.get_created_date(&uri).await.unwrap(),
        "2024-06-01T10:00:00.000Z"
    );
    assert_eq!(
        client.get_download_uri(&uri).await.unwrap(),
        "https://acme.jfrog.io/artifactory/templates/win/win22.vmxt"
    );
}

#[tokio::test]
async fn item_info_missing_field_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/artifactory/api/storage/templates/win/old.vmxt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "created": "2020-01-01T00:00:00.000Z"
        })))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let uri: String = storage_uri(&mock_server, "templates/win/old.vmxt");
    assert!(client.get_download_uri(&uri).await.unwrap_err().is_not_found());
}

// ── Search ──────────────────────────────────────────────────────────

#[tokio::test]
async fn search_by_name_sends_name_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/artifactory/api/search/artifact"))
        .and(query_param("name", "W22"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [
                { "uri": "https://acme.jfrog.io/artifactory/api/storage/templates/W22-a.vmxt" },
                { "uri": "https://acme.jfrog.io/artifactory/api/storage/templates/W22-a.ovf" }
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let uris: Vec<String> = client.search_by_name("W22").await.unwrap();
    assert_eq!(uris.len(), 2);
    assert!(uris[0].ends_with("W22-a.vmxt"));
}

#[tokio::test]
async fn search_by_name_encodes_reserved_characters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/artifactory/api/search/artifact"))
        .and(query_param("name", "R&D+lab#2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [
                { "uri": "https://acme.jfrog.io/artifactory/api/storage/templates/R&D+lab#2.ova" }
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let uris: Vec<String> = client.search_by_name("R&D+lab#2").await.unwrap();
    assert_eq!(uris.len(), 1);
}

#[tokio::test]
async fn search_by_property_joins_pairs() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/artifactory/api/search/prop"))
        .and(query_param("release", "stable"))
        .and(query_param("testing", "passed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [
                { "uri": "https://acme.jfrog.io/artifactory/api/storage/templates/W22-b.vmxt" }
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let uris: Vec<String> = client
        .search_by_property(&["release=stable".into(), "testing=passed".into()])
        .await
        .unwrap();
    assert_eq!(
        uris,
        vec!["https://acme.jfrog.io/artifactory/api/storage/templates/W22-b.vmxt"]
    );
}

// ── Properties ──────────────────────────────────────────────────────

#[tokio::test]
async fn properties_are_flattened() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/artifactory/api/storage/templates/a.ova"))
        .and(query_param("properties", ""))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "properties": {
                "release": ["stable"],
                "os": ["windows", "server"]
            },
            "uri": "https://acme.jfrog.io/artifactory/api/storage/templates/a.ova"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let properties: Vec<PropertyPair> = client
        .get_all_properties(&storage_uri(&mock_server, "templates/a.ova"))
        .await
        .unwrap();
    assert_eq!(
        properties,
        vec![
            PropertyPair::new("os", "windows,server"),
            PropertyPair::new("release", "stable"),
        ]
    );
}

#[tokio::test]
async fn properties_missing_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/artifactory/api/storage/templates/bare.ova"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "errors": [{ "status": 404, "message": "No properties could be found." }]
        })))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = client
        .get_all_properties(&storage_uri(&mock_server, "templates/bare.ova"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn properties_selected_names_are_comma_joined() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/artifactory/api/storage/templates/a.ova"))
        .and(query_param("properties", "release,testing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "properties": { "release": ["stable"], "testing": ["passed"] }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let values: Vec<PropertyPair> = client
        .get_property_values(
            &storage_uri(&mock_server, "templates/a.ova"),
            &["release".into(), "testing".into()],
        )
        .await
        .unwrap();
    assert_eq!(values.len(), 2);
}

#[tokio::test]
async fn set_properties_semicolon_joined_returns_completed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/artifactory/api/storage/templates/a.ova"))
        .and(query_param("properties", "release=stable;testing=passed"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let status: RequestStatus = client
        .set_properties(
            &storage_uri(&mock_server, "templates/a.ova"),
            &["release=stable".into(), "testing=passed".into()],
        )
        .await
        .unwrap();
    assert_eq!(status, RequestStatus::Completed { status: 204 });
}

#[tokio::test]
async fn set_properties_rejects_forbidden_characters_without_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let result = client
        .set_properties(
            &storage_uri(&mock_server, "templates/a.ova"),
            &["release=my value".into()],
        )
        .await;
    assert!(matches!(result, Err(RepositoryError::InvalidArgument { .. })));
}

#[tokio::test]
async fn delete_properties_comma_joined() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/artifactory/api/storage/templates/a.ova"))
        .and(query_param("properties", "release,nonexistent"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let status: RequestStatus = client
        .delete_properties(
            &storage_uri(&mock_server, "templates/a.ova"),
            &["release".into(), "nonexistent".into()],
        )
        .await
        .unwrap();
    assert!(status.is_success());
}

#[tokio::test]
async fn delete_artifact_reports_rejection() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/artifactory/templates/gone.ova"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let status: RequestStatus = client
        .delete_artifact(&format!("{}/artifactory/templates/gone.ova", mock_server.uri()))
        .await
        .unwrap();
    assert_eq!(status, RequestStatus::Rejected { status: 404 });
}

// ── Content ─────────────────────────────────────────────────────────

#[tokio::test]
async fn check_exists_distinguishes_200_and_404() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/artifactory/templates/web/web-disk1.vmdk"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 16]))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/artifactory/templates/web/web-disk2.vmdk"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/artifactory/templates/web/web-disk3.vmdk"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let base: String = format!("{}/artifactory/templates/web", mock_server.uri());
    assert!(client.check_exists(&format!("{}/web-disk1.vmdk", base)).await.unwrap());
    assert!(!client.check_exists(&format!("{}/web-disk2.vmdk", base)).await.unwrap());
    assert!(matches!(
        client.check_exists(&format!("{}/web-disk3.vmdk", base)).await,
        Err(RepositoryError::Transport {
            status: Some(500),
            ..
        })
    ));
}

#[tokio::test]
async fn fetch_bytes_returns_body_or_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/artifactory/templates/web/web.ovf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"<Envelope/>".to_vec()))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let base: String = format!("{}/artifactory/templates/web", mock_server.uri());
    assert_eq!(
        client.fetch_bytes(&format!("{}/web.ovf", base)).await.unwrap(),
        b"<Envelope/>".to_vec()
    );
    assert!(client
        .fetch_bytes(&format!("{}/web.mf", base))
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn fetch_to_file_streams_body_to_disk() {
    let mock_server = MockServer::start().await;
    let disk: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();

    Mock::given(method("GET"))
        .and(path("/artifactory/templates/web/web-disk1.vmdk"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(disk.clone()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let out = tempfile::TempDir::new().unwrap();
    let local = out.path().join("web-disk1.vmdk");
    let written: u64 = client
        .fetch_to_file(
            &format!("{}/artifactory/templates/web/web-disk1.vmdk", mock_server.uri()),
            &local,
        )
        .await
        .unwrap();

    assert_eq!(written, disk.len() as u64);
    assert_eq!(std::fs::read(&local).unwrap(), disk);
}

#[tokio::test]
async fn fetch_to_file_not_found_creates_nothing() {
    let mock_server = MockServer::start().await;

    let client = test_client(&mock_server);
    let out = tempfile::TempDir::new().unwrap();
    let local = out.path().join("web.mf");
    let err = client
        .fetch_to_file(
            &format!("{}/artifactory/templates/web/web.mf", mock_server.uri()),
            &local,
        )
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(!local.exists());
}

#[tokio::test]
async fn put_file_uploads_content_below_repository_root() {
    let mock_server = MockServer::start().await;
    let source_dir = tempfile::TempDir::new().unwrap();
    let source = source_dir.path().join("build.txt");
    std::fs::write(&source, b"build 42").unwrap();

    Mock::given(method("PUT"))
        .and(path("/artifactory/libs-local/tools/build-1.2.txt"))
        .and(body_bytes(b"build 42".to_vec()))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "repo": "libs-local",
            "path": "/tools/build-1.2.txt",
            "downloadUri": "https://acme.jfrog.io/artifactory/libs-local/tools/build-1.2.txt"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let download_uri: String = client
        .put_file("/libs-local/tools/build-1.2.txt", &source)
        .await
        .unwrap();
    assert_eq!(
        download_uri,
        "https://acme.jfrog.io/artifactory/libs-local/tools/build-1.2.txt"
    );
}

#[tokio::test]
async fn unreachable_server_is_network_failure() {
    let settings = RepositorySettings::new("http://127.0.0.1:1/artifactory/api", "test-token")
        .with_timeout_secs(2);
    let client = HttpRepositoryClient::new(settings).unwrap();

    let err = client.list_repositories().await.unwrap_err();
    assert!(err.is_network_failure());
}

// ── Image details over HTTP ─────────────────────────────────────────

#[tokio::test]
async fn image_details_resolve_through_http() {
    let mock_server = MockServer::start().await;
    let uri_of = |name: &str| storage_uri(&mock_server, &format!("templates/win/{}.vmxt", name));

    Mock::given(method("GET"))
        .and(path("/artifactory/api/search/artifact"))
        .and(query_param("name", "W22"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [
                { "uri": uri_of("W22-a") },
                { "uri": uri_of("W22-b") },
                { "uri": uri_of("W22-c") }
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/artifactory/api/storage/templates/win/W22-a.vmxt"))
        .and(query_param("properties", ""))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/artifactory/api/storage/templates/win/W22-b.vmxt"))
        .and(query_param("properties", ""))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "properties": { "release": ["stable"], "testing": ["passed"] }
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/artifactory/api/storage/templates/win/W22-c.vmxt"))
        .and(query_param("properties", ""))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "properties": { "release": ["beta"] }
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/artifactory/api/storage/templates/win/W22-b.vmxt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "created": "2024-02-01T00:00:00.000Z",
            "downloadUri": "https://acme.jfrog.io/artifactory/templates/win/W22-b.vmxt"
        })))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let details = get_image_details(&client, "W22", "vmxt", &["release=stable".into()])
        .await
        .unwrap();

    assert_eq!(details.uri, uri_of("W22-b"));
    assert_eq!(details.name, "W22-b");
    assert_eq!(details.created_date, "2024-02-01T00:00:00.000Z");
    assert_eq!(
        details.download_uri,
        "https://acme.jfrog.io/artifactory/templates/win/W22-b.vmxt"
    );
}
