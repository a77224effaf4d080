//! API integration tests.
//!
//! These drive the full router (auth middleware included) against a mocked
//! database connection.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::redundant_clone)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    middleware,
    response::Response,
};
use chrono::Utc;
use foodgram_api::{AppState, middleware::auth_middleware, router, short_link_router};
use foodgram_common::{
    LocalStorage,
    config::{Config, DatabaseConfig, MediaConfig, ServerConfig},
};
use foodgram_db::entities::{ingredient, recipe, recipe_ingredient, user};
use maplit::btreemap;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
use serde_json::Value as Json;
use tower::ServiceExt;

/// Create a test configuration.
fn create_test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            url: "https://foodgram.example".to_string(),
        },
        database: DatabaseConfig {
            url: "postgres://localhost/test".to_string(),
            max_connections: 10,
            min_connections: 1,
        },
        media: MediaConfig::default(),
        limits: foodgram_common::Limits::default(),
        pagination: foodgram_common::PaginationConfig::default(),
    }
}

/// Build the application the way the server does, over a mock database.
fn create_test_app(db: MockDatabase) -> Router {
    let storage = Arc::new(LocalStorage::new(
        std::env::temp_dir().join("foodgram-api-tests"),
        "/media".to_string(),
    ));
    let state = AppState::new(Arc::new(db.into_connection()), create_test_config(), storage);

    Router::new()
        .nest("/api", router())
        .merge(short_link_router())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

fn mock_db() -> MockDatabase {
    MockDatabase::new(DatabaseBackend::Postgres)
}

fn create_test_user(id: i32, username: &str, token: Option<&str>) -> user::Model {
    user::Model {
        id,
        email: format!("{username}@example.com"),
        username: username.to_string(),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        avatar: None,
        password: String::new(),
        auth_token: token.map(ToString::to_string),
        is_staff: false,
        is_superuser: false,
        date_joined: Utc::now().into(),
    }
}

fn create_test_recipe(id: i32, author_id: i32) -> recipe::Model {
    recipe::Model {
        id,
        author_id,
        name: "Блины".to_string(),
        image: "recipes/bliny.png".to_string(),
        text: "Смешать и жарить".to_string(),
        cooking_time: 30,
        pub_date: Utc::now().into(),
        short_link: "abcd1234".to_string(),
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn with_token(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Token {token}"))
        .body(Body::empty())
        .unwrap()
}

async fn json_body(response: Response) -> Json {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_anonymous_recipe_has_false_flags() {
    let db = mock_db()
        .append_query_results([[create_test_recipe(3, 1)]])
        .append_query_results([[create_test_user(1, "chef", None)]])
        .append_query_results([Vec::<recipe_ingredient::Model>::new()]);

    let response = create_test_app(db)
        .oneshot(get("/api/recipes/3/"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["is_favorited"], false);
    assert_eq!(body["is_in_shopping_cart"], false);
    assert_eq!(body["author"]["username"], "chef");
    assert_eq!(body["author"]["is_subscribed"], false);
    assert_eq!(
        body["image"],
        "https://foodgram.example/media/recipes/bliny.png"
    );
}

#[tokio::test]
async fn test_create_recipe_requires_auth() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/recipes/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"name":"Суп"}"#))
        .unwrap();

    let response = create_test_app(mock_db()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_download_shopping_cart_requires_auth() {
    let response = create_test_app(mock_db())
        .oneshot(get("/api/recipes/download_shopping_cart/"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_download_shopping_cart_is_text_attachment() {
    let row = |name: &str, unit: &str, amount: i32| {
        btreemap! {
            "name" => Value::String(Some(Box::new(name.to_string()))),
            "measurement_unit" => Value::String(Some(Box::new(unit.to_string()))),
            "amount" => Value::Int(Some(amount)),
        }
    };
    let db = mock_db()
        .append_query_results([[create_test_user(2, "cook", Some("secret"))]])
        .append_query_results([[
            row("мука", "г", 200),
            row("яйцо", "шт", 2),
            row("мука", "г", 300),
        ]]);

    let response = create_test_app(db)
        .oneshot(with_token(
            "GET",
            "/api/recipes/download_shopping_cart/",
            "secret",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"shopping_list.txt\""
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert_eq!(text, "Список покупок:\n\nмука (г) — 500\nяйцо (шт) — 2\n");
}

#[tokio::test]
async fn test_remove_absent_favorite_is_bad_request() {
    let db = mock_db()
        .append_query_results([[create_test_user(2, "cook", Some("secret"))]])
        .append_query_results([[create_test_recipe(3, 1)]])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }]);

    let response = create_test_app(db)
        .oneshot(with_token("DELETE", "/api/recipes/3/favorite/", "secret"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_link_returns_absolute_short_link() {
    let db = mock_db().append_query_results([[create_test_recipe(3, 1)]]);

    let response = create_test_app(db)
        .oneshot(get("/api/recipes/3/get-link/"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["short-link"], "https://foodgram.example/s/abcd1234");
}

#[tokio::test]
async fn test_short_link_redirects_to_recipe_page() {
    let db = mock_db().append_query_results([[create_test_recipe(3, 1)]]);

    let response = create_test_app(db)
        .oneshot(get("/s/abcd1234"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::LOCATION], "/recipes/3/");
}

#[tokio::test]
async fn test_unknown_short_link_is_not_found() {
    let db = mock_db().append_query_results([Vec::<recipe::Model>::new()]);

    let response = create_test_app(db)
        .oneshot(get("/s/deadbeef"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_numeric_id_is_json_not_found() {
    for uri in ["/api/recipes/abc/", "/api/ingredients/x1/", "/api/users/-/"] {
        let response = create_test_app(mock_db()).oneshot(get(uri)).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "NOT_FOUND", "{uri}");
    }
}

#[tokio::test]
async fn test_ingredient_search_lists_matches() {
    let db = mock_db().append_query_results([[
        ingredient::Model {
            id: 1,
            name: "молоко".to_string(),
            measurement_unit: "мл".to_string(),
        },
        ingredient::Model {
            id: 2,
            name: "мороженое".to_string(),
            measurement_unit: "г".to_string(),
        },
    ]]);

    let response = create_test_app(db)
        .oneshot(get("/api/ingredients/?name=%D0%BC%D0%BE"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["молоко", "мороженое"]);
}

#[tokio::test]
async fn test_users_page_out_of_range_is_not_found() {
    let db = mock_db()
        .append_query_results([[btreemap! { "num_items" => Value::BigInt(Some(2)) }]]);

    let response = create_test_app(db)
        .oneshot(get("/api/users/?page=9"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_max_page_number_is_not_found() {
    let db = mock_db()
        .append_query_results([[btreemap! { "num_items" => Value::BigInt(Some(40)) }]]);

    let response = create_test_app(db)
        .oneshot(get("/api/recipes/?page=18446744073709551615"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_json_body_above_extractor_default_is_accepted() {
    // No such user, so a body that got through is rejected as bad credentials.
    let db = mock_db().append_query_results([Vec::<user::Model>::new()]);
    let padding = "A".repeat(3 * 1024 * 1024);
    let body = serde_json::json!({
        "email": "ghost@example.com",
        "password": "secret",
        "padding": padding,
    });

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/token/login/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = create_test_app(db).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_json_body_above_upload_limit_is_rejected() {
    let body = format!(
        r#"{{"email":"a@example.com","password":"x","padding":"{}"}}"#,
        "A".repeat(foodgram_api::MAX_BODY_BYTES)
    );

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/token/login/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap();

    let response = create_test_app(mock_db()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_users_list_envelope_has_links() {
    let db = mock_db()
        .append_query_results([[btreemap! { "num_items" => Value::BigInt(Some(3)) }]])
        .append_query_results([[
            create_test_user(1, "alice", None),
            create_test_user(2, "bob", None),
        ]]);

    let response = create_test_app(db)
        .oneshot(get("/api/users/?limit=2"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["count"], 3);
    assert_eq!(
        body["next"],
        "https://foodgram.example/api/users/?limit=2&page=2"
    );
    assert!(body["previous"].is_null());
    assert_eq!(body["results"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_me_requires_auth() {
    let response = create_test_app(mock_db())
        .oneshot(get("/api/users/me/"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_self_subscription_is_bad_request() {
    let me = create_test_user(2, "cook", Some("secret"));
    let db = mock_db()
        .append_query_results([[me.clone()]])
        .append_query_results([[me]]);

    let response = create_test_app(db)
        .oneshot(with_token("POST", "/api/users/2/subscribe/", "secret"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_bad_recipes_limit_is_rejected() {
    let db = mock_db().append_query_results([[create_test_user(2, "cook", Some("secret"))]]);

    let response = create_test_app(db)
        .oneshot(with_token(
            "GET",
            "/api/users/subscriptions/?recipes_limit=many",
            "secret",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"]["fields"]["recipes_limit"].is_array());
}
