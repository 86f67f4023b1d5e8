pub mod compare;
pub mod maps;
pub mod teams;

use axum::Json;
use serde_json::{json, Value};

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::util::ServiceExt;

    use crate::api::build_router;
    use crate::api::state::AppState;
    use crate::config::AppConfig;
    use crate::storage::{MemoryStore, Tables};

    pub fn app_with(store: MemoryStore, config: AppConfig) -> axum::Router {
        build_router(AppState::new(Arc::new(store), config))
    }

    pub fn app(tables: Tables) -> axum::Router {
        app_with(MemoryStore::new(tables), AppConfig::default())
    }

    pub fn failing_app() -> axum::Router {
        app_with(
            MemoryStore::new(Tables::default()).failing("connection refused"),
            AppConfig::default(),
        )
    }

    pub async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }
}
