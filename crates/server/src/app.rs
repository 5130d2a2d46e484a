use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use sitetrack_core::audit::AuditSink;
use sitetrack_core::procurement::ProcurementService;
use sitetrack_db::{
    DbPool, SqlProcurementStore, SqlProjectRepository, SqlReportRepository, SqlUserRepository,
};
use tower_http::trace::TraceLayer;

use crate::{accounts, health, procurement, projects, reports};

pub type Procurement = ProcurementService<SqlProcurementStore>;

#[derive(Clone)]
pub struct AppState {
    pub procurement: Arc<Procurement>,
    pub users: SqlUserRepository,
    pub projects: SqlProjectRepository,
    pub reports: SqlReportRepository,
}

impl AppState {
    pub fn new(db_pool: DbPool, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            procurement: Arc::new(ProcurementService::new(
                SqlProcurementStore::new(db_pool.clone()),
                audit,
            )),
            users: SqlUserRepository::new(db_pool.clone()),
            projects: SqlProjectRepository::new(db_pool.clone()),
            reports: SqlReportRepository::new(db_pool),
        }
    }
}

pub fn router(db_pool: DbPool, audit: Arc<dyn AuditSink>) -> Router {
    let state = AppState::new(db_pool.clone(), audit);

    Router::new()
        .route("/", get(banner))
        .merge(accounts::routes())
        .merge(projects::routes())
        .merge(reports::routes())
        .merge(procurement::routes())
        .with_state(state)
        .merge(health::router(db_pool))
        .layer(TraceLayer::new_for_http())
}

async fn banner() -> Json<Value> {
    Json(json!({ "message": "SiteTrack Server is Running!" }))
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::Value;
    use sitetrack_core::audit::InMemoryAuditSink;
    use sitetrack_db::{connect_with_settings, migrations};
    use tower::ServiceExt;

    pub async fn app() -> (Router, InMemoryAuditSink) {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        let sink = InMemoryAuditSink::default();
        (super::router(pool, Arc::new(sink.clone())), sink)
    }

    pub async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };

        let response = app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }
}
