//! # Router
//!
//! ```text
//! /api
//! ├── GET    /health
//! ├── GET    /products                    POST /products
//! ├── GET    /products/{id}               PUT  /products/{id}     DELETE
//! ├── PUT    /products/{id}/stock
//! ├── GET    /products/barcode/{barcode}
//! ├── GET    /products/category/{categoryId}
//! ├── GET    /categories                  POST /categories
//! ├── GET    /categories/{id}             PUT  /categories/{id}   DELETE
//! ├── GET    /sales                       POST /sales
//! ├── GET    /sales/{id}
//! ├── GET    /qrcodes                     POST /qrcodes/generate
//! ├── GET    /qrcodes/{productId}
//! ├── GET    /qrcodes/{productId}/image
//! ├── GET    /orders                      POST /orders            (auth)
//! └── GET    /orders/{id}                                         (auth)
//! ```

use axum::http::HeaderValue;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::error::ApiError;
use crate::handlers::{categories, health, orders, products, qrcodes, sales};
use crate::state::AppState;

/// Builds the full application router.
///
/// `frontend_url` restricts CORS to one origin; `None` allows any.
pub fn router(state: AppState, frontend_url: Option<&str>) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors(frontend_url))
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/products", get(products::list).post(products::create))
        .route(
            "/products/{id}",
            get(products::get)
                .put(products::update)
                .delete(products::delete),
        )
        .route("/products/{id}/stock", put(products::set_stock))
        .route("/products/barcode/{barcode}", get(products::get_by_barcode))
        .route(
            "/products/category/{category_id}",
            get(products::list_by_category),
        )
        .route("/categories", get(categories::list).post(categories::create))
        .route(
            "/categories/{id}",
            get(categories::get)
                .put(categories::update)
                .delete(categories::delete),
        )
        .route("/sales", get(sales::list).post(sales::create))
        .route("/sales/{id}", get(sales::get))
        .route("/qrcodes", get(qrcodes::list))
        .route("/qrcodes/generate", post(qrcodes::generate))
        .route("/qrcodes/{product_id}", get(qrcodes::get))
        .route("/qrcodes/{product_id}/image", get(qrcodes::image))
        .route("/orders", get(orders::list).post(orders::create))
        .route("/orders/{id}", get(orders::get))
}

fn cors(frontend_url: Option<&str>) -> CorsLayer {
    let origin = match frontend_url.map(HeaderValue::from_str) {
        Some(Ok(origin)) => AllowOrigin::exact(origin),
        Some(Err(_)) => {
            warn!("FRONTEND_URL is not a valid origin, allowing any origin");
            AllowOrigin::any()
        }
        None => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn not_found() -> ApiError {
    ApiError::not_found("Маршрут не найден")
}
