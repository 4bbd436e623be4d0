//! End-to-end tests: the full router over an in-memory seeded catalog.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use shelf_app::modules::books::{
    filters::BookFilter,
    models::{BookDetail, BookSummary, Link},
    repository::CatalogStore,
    testing::seeded_database,
    BooksModule,
};
use shelf_db::DbError;
use shelf_kernel::{settings::Settings, ModuleRegistry};

async fn create_test_app() -> Router {
    let db = seeded_database().await;
    let mut registry = ModuleRegistry::new();
    shelf_app::register_all(&mut registry, &db);
    shelf_http::build_router(&registry, &Settings::default()).unwrap()
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn item_ids(body: &Value) -> Vec<i64> {
    body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_list_books_default_page() {
    let (status, body) = get_json(create_test_app().await, "/books").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 8);
    assert_eq!(body["page"], 1);
    assert_eq!(body["pageSize"], 24);
    assert_eq!(body["tags"], serde_json::json!([]));
    assert_eq!(item_ids(&body), vec![8, 7, 1, 2, 3, 4, 5, 6]);

    let first = &body["items"][2];
    assert_eq!(first["title"], "Memórias Póstumas de Brás Cubas");
    assert_eq!(first["year"], 1881);
    assert_eq!(first["slug"], "memorias-postumas");
    assert_eq!(first["cover_url"], "https://covers.example/1.jpg");
    assert_eq!(first["is_public_domain"], true);
    assert_eq!(first["author"], "Machado de Assis");
    assert!(body["items"][0]["year"].is_null());
}

#[tokio::test]
async fn test_tag_filter_uses_and_semantics() {
    let (status, body) =
        get_json(create_test_app().await, "/books?tags=romance,brazil").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(item_ids(&body), vec![1, 3]);
    assert_eq!(body["total"], 2);
    assert_eq!(body["tags"], serde_json::json!(["romance", "brazil"]));
}

#[tokio::test]
async fn test_tag_echo_is_trimmed_and_deduplicated() {
    let (_, body) = get_json(
        create_test_app().await,
        "/books?tags=%20classic%20,,classic,%20",
    )
    .await;

    assert_eq!(body["tags"], serde_json::json!(["classic"]));
    assert_eq!(item_ids(&body), vec![7, 1, 2]);
}

#[tokio::test]
async fn test_tag_slugs_match_case_insensitively() {
    let (status, body) =
        get_json(create_test_app().await, "/books?tags=Romance,BRAZIL,romance").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(item_ids(&body), vec![1, 3]);
    assert_eq!(body["tags"], serde_json::json!(["Romance", "BRAZIL"]));
}

#[tokio::test]
async fn test_long_tag_list_is_an_empty_result() {
    // the request line must stay under the URI length cap
    let tags: Vec<String> = (0..5_000).map(|i| format!("t{i}")).collect();
    let uri = format!("/books?tags={}", tags.join(","));

    let (status, body) = get_json(create_test_app().await, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
    assert_eq!(body["items"], serde_json::json!([]));
    assert_eq!(body["tags"].as_array().unwrap().len(), 5_000);
}

#[tokio::test]
async fn test_domain_filter() {
    let app = create_test_app().await;

    let (_, public) = get_json(app.clone(), "/books?domain=public").await;
    assert_eq!(item_ids(&public), vec![7, 1, 2, 3]);
    assert!(public["items"]
        .as_array()
        .unwrap()
        .iter()
        .all(|item| item["is_public_domain"] == true));

    let (_, non_public) = get_json(app.clone(), "/books?domain=non-public").await;
    assert_eq!(item_ids(&non_public), vec![8, 4, 5, 6]);

    let (_, unknown) = get_json(app, "/books?domain=whatever").await;
    assert_eq!(unknown["total"], 8);
}

#[tokio::test]
async fn test_text_search_is_accent_insensitive() {
    let app = create_test_app().await;

    let (_, body) = get_json(app.clone(), "/books?q=%20agua%20").await;
    assert_eq!(item_ids(&body), vec![4]);

    let (_, body) = get_json(app, "/books?q=ZOLA").await;
    assert_eq!(item_ids(&body), vec![2]);
}

#[tokio::test]
async fn test_year_range_is_inclusive() {
    let (_, body) = get_json(create_test_app().await, "/books?yearFrom=1881&yearTo=1899").await;
    assert_eq!(item_ids(&body), vec![1, 2, 3]);

    let (_, body) = get_json(create_test_app().await, "/books?yearFrom=1950&yearTo=1900").await;
    assert_eq!(body["total"], 0);
    assert_eq!(item_ids(&body), Vec::<i64>::new());
}

#[tokio::test]
async fn test_invalid_pagination_is_normalized() {
    let app = create_test_app().await;
    let (_, baseline) = get_json(app.clone(), "/books?page=1").await;

    for uri in ["/books", "/books?page=0", "/books?page=-5", "/books?page=abc"] {
        let (status, body) = get_json(app.clone(), uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body, baseline, "{uri}");
    }

    let (_, clamped) = get_json(app, "/books?pageSize=500").await;
    assert_eq!(clamped["pageSize"], 100);
    assert_eq!(item_ids(&clamped).len(), 8);
}

#[tokio::test]
async fn test_page_beyond_results_is_empty() {
    let (status, body) = get_json(create_test_app().await, "/books?page=4&pageSize=3").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 8);
    assert_eq!(body["page"], 4);
    assert!(body["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_pages_partition_the_result_set() {
    let app = create_test_app().await;
    let mut seen = Vec::new();

    for page in 1..=3 {
        let (_, body) = get_json(app.clone(), &format!("/books?pageSize=3&page={page}")).await;
        assert!(body["items"].as_array().unwrap().len() <= 3);
        assert_eq!(body["total"], 8);
        seen.extend(item_ids(&body));
    }

    assert_eq!(seen, vec![8, 7, 1, 2, 3, 4, 5, 6]);
}

#[tokio::test]
async fn test_get_book_detail() {
    let (status, body) = get_json(create_test_app().await, "/books/3").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 3);
    assert_eq!(body["title"], "Dom Casmurro");
    assert_eq!(body["author"], "Machado de Assis");
    assert_eq!(body["author_id"], 1);
}

#[tokio::test]
async fn test_get_missing_book_is_not_found() {
    let app = create_test_app().await;

    for uri in ["/books/999999", "/books/abc", "/books/0"] {
        let (status, body) = get_json(app.clone(), uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body["error"]["code"], "not_found");
        assert!(body.get("id").is_none());
    }
}

#[tokio::test]
async fn test_book_links() {
    let app = create_test_app().await;

    let (status, body) = get_json(app.clone(), "/books/1/links").await;
    assert_eq!(status, StatusCode::OK);
    let kinds: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|link| link["kind"].as_str().unwrap())
        .collect();
    assert_eq!(
        kinds,
        vec!["source", "read_online", "read_online", "library", "buy", "other"]
    );
    assert_eq!(body[1]["label"], "Gutenberg");
    assert_eq!(body[1]["url"], "https://gutenberg.example/brascubas");

    let (status, body) = get_json(app, "/books/2/links").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!([]));
}

#[tokio::test]
async fn test_list_tags() {
    let (status, body) = get_json(create_test_app().await, "/tags").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0], serde_json::json!({ "name": "Brasil", "slug": "brazil" }));
    assert_eq!(body.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_health_and_unknown_route() {
    let app = create_test_app().await;

    let (status, body) = get_json(app.clone(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);

    let (status, body) = get_json(app, "/authors").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Route not found");
}

#[tokio::test]
async fn test_openapi_document_lists_catalog_routes() {
    let (status, body) = get_json(create_test_app().await, "/docs/openapi.json").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/books"]["get"].is_object());
    assert!(body["paths"]["/books/{id}/links"]["get"].is_object());
    assert!(body["paths"]["/tags"]["get"].is_object());
}

struct FailingStore;

#[async_trait]
impl CatalogStore for FailingStore {
    async fn candidate_books(&self, _filter: &BookFilter) -> Result<Vec<BookSummary>, DbError> {
        Err(DbError::Internal("disk I/O error".to_string()))
    }

    async fn count_books(&self, _filter: &BookFilter) -> Result<u64, DbError> {
        Err(DbError::Internal("disk I/O error".to_string()))
    }

    async fn page_books(
        &self,
        _filter: &BookFilter,
        _limit: u64,
        _offset: u64,
    ) -> Result<Vec<BookSummary>, DbError> {
        Err(DbError::Internal("disk I/O error".to_string()))
    }

    async fn find_book(&self, _id: i64) -> Result<Option<BookDetail>, DbError> {
        Err(DbError::Internal("disk I/O error".to_string()))
    }

    async fn book_links(&self, _book_id: i64) -> Result<Vec<Link>, DbError> {
        Err(DbError::Internal("disk I/O error".to_string()))
    }
}

#[tokio::test]
async fn test_store_failure_is_generic_500() {
    let mut registry = ModuleRegistry::new();
    registry.register(Arc::new(BooksModule::new(Arc::new(FailingStore))));
    let app = shelf_http::build_router(&registry, &Settings::default()).unwrap();

    for uri in ["/books?tags=a", "/books?q=assis", "/books/1", "/books/1/links"] {
        let (status, body) = get_json(app.clone(), uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(body["error"]["code"], "internal_error");
        assert!(body.get("items").is_none());
        assert!(!body.to_string().contains("disk I/O"));
    }
}
