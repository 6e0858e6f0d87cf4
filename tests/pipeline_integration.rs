//! Integration tests for the catalog pipeline against mocked MDBList and TMDB servers.

mod support;
use support::socket_guard::start_mock_server_or_skip;

use catalog_core::{
    AppConfig, CatalogAssembler, CatalogRequest, CategoryMap, ExternalSource, SortKey,
};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const POSTER_BASE: &str = "https://img.test/w500";

fn config_for(lists: &MockServer, tmdb: &MockServer) -> AppConfig {
    let raw = format!(
        r#"
        [mdblist]
        base_url = "{}"

        [tmdb]
        base_url = "{}"
        api_key = "test-key"
        poster_base_url = "{POSTER_BASE}"

        [enrichment]
        concurrency = 2
        "#,
        lists.uri(),
        tmdb.uri()
    );
    AppConfig::from_toml_str(&raw).unwrap()
}

fn assembler_for(lists: &MockServer, tmdb: &MockServer) -> CatalogAssembler {
    config_for(lists, tmdb).build_assembler().unwrap()
}

fn horror_map() -> CategoryMap {
    CategoryMap::from_entries([("halloween", vec!["halloween"]), ("scream", vec!["scream"])])
        .unwrap()
}

fn two_item_list() -> serde_json::Value {
    json!([
        {"imdb_id": "tt001", "title": "Halloween Ends", "release_year": 2022, "mediatype": "movie"},
        {"imdb_id": "tt002", "title": "Scream VI", "release_year": 2023, "mediatype": "movie"}
    ])
}

async fn mount_list(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/lists/owner/horror/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_poster(server: &MockServer, imdb_id: &str, poster_path: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/find/{imdb_id}")))
        .and(query_param("api_key", "test-key"))
        .and(query_param("external_source", "imdb_id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "movie_results": [{"id": 1, "title": "x", "poster_path": poster_path}],
            "tv_results": []
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_catalog_single_category_keeps_matching_items_only() {
    let Some(lists) = start_mock_server_or_skip().await else {
        return;
    };
    let Some(tmdb) = start_mock_server_or_skip().await else {
        return;
    };
    mount_list(&lists, two_item_list()).await;
    mount_poster(&tmdb, "tt001", "/halloween.jpg").await;

    let request = CatalogRequest::new("owner", "horror")
        .with_category("halloween")
        .with_categories(horror_map());
    let catalog = assembler_for(&lists, &tmdb)
        .assemble(&request, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(catalog.ids(), vec!["tt001"]);
    let item = &catalog.metas[0];
    assert_eq!(item.name, "Halloween Ends");
    assert_eq!(item.kind, "movie");
    assert_eq!(item.year, 2022);
    assert_eq!(item.poster, format!("{POSTER_BASE}/halloween.jpg"));
}

#[tokio::test]
async fn test_catalog_all_orders_by_category_map_and_skips_sort() {
    let Some(lists) = start_mock_server_or_skip().await else {
        return;
    };
    let Some(tmdb) = start_mock_server_or_skip().await else {
        return;
    };
    mount_list(
        &lists,
        json!([
            {"imdb_id": "tt002", "title": "Scream VI", "release_year": 2023},
            {"imdb_id": "tt003", "title": "Unrelated", "release_year": 1990},
            {"imdb_id": "tt001", "title": "Halloween Ends", "release_year": 2022}
        ]),
    )
    .await;

    let request = CatalogRequest::new("owner", "horror")
        .with_category("ALL")
        .with_categories(horror_map())
        .with_sort(SortKey::NameDescending);
    let catalog = assembler_for(&lists, &tmdb)
        .assemble(&request, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(catalog.ids(), vec!["tt001", "tt002"]);
}

#[tokio::test]
async fn test_catalog_unknown_category_is_rejected() {
    let Some(lists) = start_mock_server_or_skip().await else {
        return;
    };
    let Some(tmdb) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/lists/owner/horror/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(two_item_list()))
        .expect(0)
        .mount(&lists)
        .await;

    let request = CatalogRequest::new("owner", "horror")
        .with_category("zombie")
        .with_categories(horror_map());
    let err = assembler_for(&lists, &tmdb)
        .assemble(&request, &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 400);
    assert_eq!(err.to_string(), "Invalid filter value: zombie");
}

#[tokio::test]
async fn test_catalog_empty_or_private_list_is_not_found() {
    let Some(lists) = start_mock_server_or_skip().await else {
        return;
    };
    let Some(tmdb) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/lists/owner/horror/json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"error":"empty or private list"}"#),
        )
        .mount(&lists)
        .await;

    let err = assembler_for(&lists, &tmdb)
        .assemble(
            &CatalogRequest::new("owner", "horror"),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 404);
    assert_eq!(err.to_string(), "MDBList is empty or does not exist.");
}

#[tokio::test]
async fn test_catalog_upstream_failure_passes_status_and_body_through() {
    let Some(lists) = start_mock_server_or_skip().await else {
        return;
    };
    let Some(tmdb) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path_regex(r"^/lists/.*"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance window"))
        .mount(&lists)
        .await;

    let err = assembler_for(&lists, &tmdb)
        .assemble(
            &CatalogRequest::new("owner", "horror"),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 503);
    assert_eq!(err.to_string(), "maintenance window");
}

#[tokio::test]
async fn test_catalog_malformed_list_is_server_error() {
    let Some(lists) = start_mock_server_or_skip().await else {
        return;
    };
    let Some(tmdb) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/lists/owner/horror/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&lists)
        .await;

    let err = assembler_for(&lists, &tmdb)
        .assemble(
            &CatalogRequest::new("owner", "horror"),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 500);
    assert!(
        err.to_string().starts_with("Failed to deserialize MDBList JSON"),
        "got: {err}"
    );
}

#[tokio::test]
async fn test_catalog_poster_failures_leave_items_unenriched() {
    let Some(lists) = start_mock_server_or_skip().await else {
        return;
    };
    let Some(tmdb) = start_mock_server_or_skip().await else {
        return;
    };
    mount_list(&lists, two_item_list()).await;
    mount_poster(&tmdb, "tt001", "/one.jpg").await;
    Mock::given(method("GET"))
        .and(path("/find/tt002"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&tmdb)
        .await;

    let request = CatalogRequest::new("owner", "horror").with_sort(SortKey::YearDescending);
    let catalog = assembler_for(&lists, &tmdb)
        .assemble(&request, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(catalog.ids(), vec!["tt002", "tt001"]);
    assert_eq!(catalog.metas[0].poster, "");
    assert_eq!(catalog.metas[1].poster, format!("{POSTER_BASE}/one.jpg"));
}

#[tokio::test]
async fn test_catalog_cancelled_before_fetch_reports_cancellation() {
    let Some(lists) = start_mock_server_or_skip().await else {
        return;
    };
    let Some(tmdb) = start_mock_server_or_skip().await else {
        return;
    };
    mount_list(&lists, two_item_list()).await;

    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = assembler_for(&lists, &tmdb)
        .assemble(&CatalogRequest::new("owner", "horror"), &cancel)
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 499);
}

#[tokio::test]
async fn test_list_mode_without_posters_skips_metadata_calls() {
    let Some(lists) = start_mock_server_or_skip().await else {
        return;
    };
    let Some(tmdb) = start_mock_server_or_skip().await else {
        return;
    };
    mount_list(&lists, two_item_list()).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/find/.*"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&tmdb)
        .await;

    let list = assembler_for(&lists, &tmdb)
        .fetch_list("owner", "horror", false, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(list.owner, "owner");
    assert_eq!(list.name, "horror");
    assert_eq!(list.items.len(), 2);
    assert!(list.items.iter().all(|item| item.poster.is_none()));
}

#[tokio::test]
async fn test_list_mode_with_posters_enriches_every_eligible_item() {
    let Some(lists) = start_mock_server_or_skip().await else {
        return;
    };
    let Some(tmdb) = start_mock_server_or_skip().await else {
        return;
    };
    mount_list(
        &lists,
        json!([
            {"imdb_id": "tt001", "title": "Halloween Ends"},
            {"imdb_id": "nm999", "title": "Not A Title"},
            {"title": "No Id"}
        ]),
    )
    .await;
    mount_poster(&tmdb, "tt001", "/a.jpg").await;

    let list = assembler_for(&lists, &tmdb)
        .fetch_list("owner", "horror", true, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(list.items.len(), 2, "entries without an id are dropped");
    assert_eq!(
        list.items[0].poster.as_deref(),
        Some(format!("{POSTER_BASE}/a.jpg").as_str())
    );
    assert!(list.items[1].poster.is_none());
}

#[tokio::test]
async fn test_poster_lookup_falls_back_to_tv_results() {
    let Some(lists) = start_mock_server_or_skip().await else {
        return;
    };
    let Some(tmdb) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/find/tt0944947"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "movie_results": [],
            "tv_results": [{"id": 1399, "name": "Game of Thrones", "poster_path": "/got.jpg"}]
        })))
        .mount(&tmdb)
        .await;

    let assembler = assembler_for(&lists, &tmdb);
    let poster = assembler.metadata().poster("tt0944947").await.unwrap();
    assert_eq!(poster.imdb_id, "tt0944947");
    assert_eq!(poster.poster_path, format!("{POSTER_BASE}/got.jpg"));
}

#[tokio::test]
async fn test_poster_lookup_without_results_is_not_found() {
    let Some(lists) = start_mock_server_or_skip().await else {
        return;
    };
    let Some(tmdb) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/find/tt404"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "movie_results": [],
            "tv_results": []
        })))
        .mount(&tmdb)
        .await;

    let err = assembler_for(&lists, &tmdb)
        .metadata()
        .poster("tt404")
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 404);
    assert_eq!(err.to_string(), "Poster not found for IMDB ID tt404");
}

#[tokio::test]
async fn test_details_lookup_uses_requested_external_source() {
    let Some(lists) = start_mock_server_or_skip().await else {
        return;
    };
    let Some(tmdb) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/find/81189"))
        .and(query_param("external_source", "tvdb_id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "movie_results": [],
            "tv_results": [{"id": 1396, "name": "Breaking Bad", "poster_path": "/bb.jpg"}]
        })))
        .mount(&tmdb)
        .await;

    let details = assembler_for(&lists, &tmdb)
        .metadata()
        .details("81189", ExternalSource::Tvdb)
        .await
        .unwrap();
    assert_eq!(details.id(), 1396);
    assert_eq!(details.display_title(), Some("Breaking Bad"));
}
