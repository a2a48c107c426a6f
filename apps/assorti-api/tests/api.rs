//! End-to-end tests driving the router with `oneshot` against an in-memory
//! database.

use assorti_api::auth::{sign_init_data, INIT_DATA_HEADER};
use assorti_api::{router, AppState};
use assorti_core::{Money, NewCategory, NewProduct};
use assorti_db::{Database, DbConfig};
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

const BOT_TOKEN: &str = "123456:TEST-TOKEN";

async fn app() -> Router {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    router(AppState::new(db, Some(BOT_TOKEN.to_string())), None)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn with_json(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn init_data(user_id: i64) -> String {
    let user = json!({ "id": user_id, "first_name": "Test" }).to_string();
    sign_init_data(&[("auth_date", "1700000000"), ("user", &user)], BOT_TOKEN).unwrap()
}

async fn create_category(app: &Router, name: &str) -> Value {
    let (status, body) = send(
        app,
        with_json(Method::POST, "/api/categories", json!({ "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"].clone()
}

async fn create_product(app: &Router, category_id: &str, name: &str, price: f64, stock: i64) -> Value {
    let (status, body) = send(
        app,
        with_json(
            Method::POST,
            "/api/products",
            json!({ "name": name, "price": price, "stock": stock, "categoryId": category_id }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"].clone()
}

#[tokio::test]
async fn health_reports_database() {
    let app = app().await;
    let (status, body) = send(&app, get("/api/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert_eq!(body["database"], "connected");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn sale_scenario_keeps_stock_consistent() {
    let app = app().await;

    let category = create_category(&app, "Электроника").await;
    assert_eq!(category["slug"], "электроника");

    let product = create_product(&app, category["id"].as_str().unwrap(), "Phone", 100.0, 5).await;
    let product_id = product["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        with_json(
            Method::POST,
            "/api/sales",
            json!({ "productId": product_id, "quantity": 3 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Продажа успешно зарегистрирована");
    assert_eq!(body["data"]["sale"]["quantity"], 3);
    assert_eq!(body["data"]["sale"]["price"], 100);
    assert_eq!(body["data"]["product"]["stock"], 2);

    let (status, body) = send(
        &app,
        with_json(
            Method::POST,
            "/api/sales",
            json!({ "productId": product_id, "quantity": 3 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Недостаточно товара на складе"));

    let (_, body) = send(&app, get(&format!("/api/products/{product_id}"))).await;
    assert_eq!(body["data"]["stock"], 2);

    let (_, body) = send(&app, get("/api/sales")).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["data"][0]["productName"], "Phone");
}

#[tokio::test]
async fn sale_of_unknown_product_is_not_found() {
    let app = app().await;
    let (status, body) = send(
        &app,
        with_json(Method::POST, "/api/sales", json!({ "productId": "999", "quantity": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Продукт с ID 999 не найден");
}

#[tokio::test]
async fn missing_product_returns_error_envelope() {
    let app = app().await;
    let (status, body) = send(&app, get("/api/products/999")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "success": false, "error": "Продукт с ID 999 не найден" }));
}

#[tokio::test]
async fn pagination_is_validated_and_clamped() {
    let app = app().await;
    let category = create_category(&app, "Одежда").await;
    let category_id = category["id"].as_str().unwrap();
    for i in 0..3 {
        create_product(&app, category_id, &format!("Item {i}"), 10.5, 1).await;
    }

    let (status, body) = send(&app, get("/api/products?page=0&limit=10")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Page и limit должны быть больше 0");

    let (status, body) = send(&app, get("/api/products?page=1&limit=2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["total"], 3);
    assert_eq!(body["data"]["totalPages"], 2);

    let (_, body) = send(&app, get("/api/products?limit=1000")).await;
    assert_eq!(body["data"]["limit"], 100);

    let (_, body) = send(&app, get(&format!("/api/products/category/{category_id}"))).await;
    assert_eq!(body["data"]["total"], 3);
}

#[tokio::test]
async fn product_validation_errors() {
    let app = app().await;

    let (status, _) = send(
        &app,
        with_json(Method::POST, "/api/products", json!({ "name": "Phone", "price": 10 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        with_json(
            Method::POST,
            "/api/products",
            json!({ "name": "Phone", "price": 10, "categoryId": "missing" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = Request::post("/api/products")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn update_stock_and_barcode_lookup() {
    let app = app().await;
    let category = create_category(&app, "Дом").await;
    let product = create_product(&app, category["id"].as_str().unwrap(), "Lamp", 1999.99, 1).await;
    let id = product["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        with_json(
            Method::PUT,
            &format!("/api/products/{id}"),
            json!({ "name": "Desk Lamp", "barcode": "4600000000001" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["slug"], "desk-lamp");
    assert_eq!(body["data"]["price"], 1999.99);

    let (_, body) = send(&app, get("/api/products/barcode/4600000000001")).await;
    assert_eq!(body["data"]["id"], id);

    let (status, body) = send(
        &app,
        with_json(Method::PUT, &format!("/api/products/{id}/stock"), json!({ "stock": -1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (_, body) = send(
        &app,
        with_json(Method::PUT, &format!("/api/products/{id}/stock"), json!({ "stock": 40 })),
    )
    .await;
    assert_eq!(body["data"]["stock"], 40);
}

#[tokio::test]
async fn category_with_products_cannot_be_deleted() {
    let app = app().await;
    let category = create_category(&app, "Книги").await;
    let category_id = category["id"].as_str().unwrap();
    let product = create_product(&app, category_id, "Novel", 500.0, 2).await;

    let (_, body) = send(&app, get(&format!("/api/categories/{category_id}"))).await;
    assert_eq!(body["data"]["products"].as_array().unwrap().len(), 1);

    let delete = |uri: String| Request::delete(uri).body(Body::empty()).unwrap();

    let (status, _) = send(&app, delete(format!("/api/categories/{category_id}"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, delete(format!("/api/products/{}", product["id"].as_str().unwrap()))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, delete(format!("/api/categories/{category_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Категория успешно удалена");
}

#[tokio::test]
async fn qr_generation_is_idempotent() {
    let app = app().await;
    let category = create_category(&app, "Техника").await;
    let product = create_product(&app, category["id"].as_str().unwrap(), "Phone: Pro", 100.0, 1).await;
    let id = product["id"].as_str().unwrap();

    let (status, _) = send(&app, get(&format!("/api/qrcodes/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let generate = || with_json(Method::POST, "/api/qrcodes/generate", json!({ "productId": id }));
    let (status, first) = send(&app, generate()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["data"]["code"], format!("PRODUCT:{id}:Phone: Pro"));
    assert_eq!(first["data"]["productId"], id);

    let (_, second) = send(&app, generate()).await;
    assert_eq!(first["data"], second["data"]);

    let (_, list) = send(&app, get("/api/qrcodes")).await;
    assert_eq!(list["data"].as_array().unwrap().len(), 1);

    let response = app
        .clone()
        .oneshot(get(&format!("/api/qrcodes/{id}/image")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    let png = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&png[..4], b"\x89PNG");
}

#[tokio::test]
async fn orders_require_signed_init_data() {
    let app = app().await;
    let category = create_category(&app, "Обувь").await;
    let product = create_product(&app, category["id"].as_str().unwrap(), "Boots", 100.0, 3).await;
    let product_id = product["id"].as_str().unwrap();
    let order_body = json!({ "items": [{ "productId": product_id, "quantity": 2 }] });

    let (status, _) = send(&app, with_json(Method::POST, "/api/orders", order_body.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let mut forged = with_json(Method::POST, "/api/orders", order_body.clone());
    forged.headers_mut().insert(
        INIT_DATA_HEADER,
        init_data(7).replace("auth_date=1700000000", "auth_date=1").parse().unwrap(),
    );
    let (status, _) = send(&app, forged).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let mut request = with_json(Method::POST, "/api/orders", order_body);
    request
        .headers_mut()
        .insert(INIT_DATA_HEADER, init_data(7).parse().unwrap());
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["userId"], 7);
    assert_eq!(body["data"]["total"], 200);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);
    let order_id = body["data"]["id"].as_str().unwrap().to_string();

    let authed_get = |uri: String, user: i64| {
        Request::get(uri)
            .header(INIT_DATA_HEADER, init_data(user))
            .body(Body::empty())
            .unwrap()
    };

    let (status, _) = send(&app, authed_get(format!("/api/orders/{order_id}"), 7)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, authed_get(format!("/api/orders/{order_id}"), 8)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Заказ не найден");

    let (_, body) = send(&app, authed_get("/api/orders".to_string(), 8)).await;
    assert_eq!(body["data"]["total"], 0);
}

#[tokio::test]
async fn oversized_prices_never_reach_an_order_total() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let app = router(AppState::new(db.clone(), Some(BOT_TOKEN.to_string())), None);
    let category = create_category(&app, "Ювелирка").await;
    let category_id = category["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        with_json(
            Method::POST,
            "/api/products",
            json!({ "name": "Crown", "price": 50_000_000_000_000_000u64, "stock": 5, "categoryId": category_id }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Цена: не более 10000000 руб.");

    let ring = create_product(&app, category_id, "Ring", 10_000_000.0, 1).await;
    let (status, _) = send(
        &app,
        with_json(
            Method::PUT,
            &format!("/api/products/{}", ring["id"].as_str().unwrap()),
            json!({ "price": 10_000_000.01 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // A row written around the API still must not overflow the total.
    let legacy = db
        .categories()
        .insert(&NewCategory {
            name: "Архив".to_string(),
            description: None,
            image: None,
        })
        .await
        .unwrap();
    let crown = db
        .products()
        .insert(&NewProduct {
            name: "Crown".to_string(),
            description: None,
            price: Money::from_cents(5_000_000_000_000_000_000),
            stock: 5,
            category_id: legacy.id,
            barcode: None,
            image: None,
        })
        .await
        .unwrap();

    let mut request = with_json(
        Method::POST,
        "/api/orders",
        json!({ "items": [{ "productId": crown.id, "quantity": 2 }] }),
    );
    request
        .headers_mut()
        .insert(INIT_DATA_HEADER, init_data(5).parse().unwrap());
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Сумма: слишком большое значение");

    let list = Request::get("/api/orders")
        .header(INIT_DATA_HEADER, init_data(5))
        .body(Body::empty())
        .unwrap();
    let (_, body) = send(&app, list).await;
    assert_eq!(body["data"]["total"], 0);
}

#[tokio::test]
async fn empty_order_is_rejected() {
    let app = app().await;
    let mut request = with_json(Method::POST, "/api/orders", json!({ "items": [] }));
    request
        .headers_mut()
        .insert(INIT_DATA_HEADER, init_data(1).parse().unwrap());

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Заказ должен содержать хотя бы одну позицию");
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let app = app().await;
    let (status, body) = send(&app, get("/api/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Маршрут не найден");
}
