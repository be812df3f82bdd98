//! Admin HTTP routes

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Query, Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::admin::dispatch;
use crate::admin::site::{AdminSite, Entity, ListParams, ModelAdmin};
use crate::config::AdminConfig;
use crate::services::{AdminContext, ServiceFactory};
use crate::utils::errors::{Result, SchoolDeskError};
use crate::utils::helpers::total_pages;
use crate::utils::logging::log_admin_action;

/// Extractor results are taken as-is so rejections become JSON errors
type PathArg<T> = std::result::Result<Path<T>, PathRejection>;
type JsonBody = std::result::Result<Json<Value>, JsonRejection>;

/// Shared state of the admin application
#[derive(Clone)]
pub struct AppState {
    pub services: ServiceFactory,
    pub site: Arc<AdminSite>,
    pub config: Arc<AdminConfig>,
}

impl AppState {
    pub fn new(services: ServiceFactory, config: AdminConfig) -> Self {
        Self {
            services,
            site: Arc::new(AdminSite::default()),
            config: Arc::new(config),
        }
    }
}

/// Build the application router: `/health` plus the authenticated `/admin` tree
pub fn router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/admin/", get(index))
        .route("/admin/:entity/", get(list).post(create))
        .route("/admin/:entity/:id", get(detail).put(update).delete(remove))
        .route("/admin/:entity/:id/summary", get(summary))
        .route("/admin/:entity/:id/:relation/:related_id", post(link).delete(unlink))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_staff));

    Router::new()
        .route("/health", get(health))
        .merge(admin)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn require_staff(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    match state.services.auth_service.authenticate_staff(header).await {
        Ok(context) => {
            request.extensions_mut().insert(context);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

fn writable<'a>(state: &'a AppState, context: &AdminContext, slug: &str) -> Result<&'a ModelAdmin> {
    let model = state.site.get(slug)?;
    context.require(model.write_permission)?;
    Ok(model)
}

fn related(model: &ModelAdmin, relation: &str) -> Result<()> {
    if model.has_relation(relation) {
        Ok(())
    } else {
        Err(SchoolDeskError::InvalidInput(format!(
            "{} has no relation {}",
            model.verbose_name_plural, relation
        )))
    }
}

async fn health(State(state): State<AppState>) -> Response {
    let status = state.services.health_check().await;
    let code = if status.is_healthy() {
        StatusCode::OK
    } else {
        warn!(issues = ?status.get_issues(), "Health check failed");
        StatusCode::SERVICE_UNAVAILABLE
    };

    (code, Json(json!({ "status": if status.is_healthy() { "ok" } else { "unavailable" }, "checks": status })))
        .into_response()
}

async fn index(
    State(state): State<AppState>,
    Extension(context): Extension<AdminContext>,
) -> Result<Json<Value>> {
    let stats = state.services.db.get_system_stats().await?;

    Ok(Json(json!({
        "user": context.user.username,
        "name": context.user.full_name(),
        "role": context.user.role.label(),
        "models": state.site.models(),
        "stats": stats
    })))
}

async fn list(
    State(state): State<AppState>,
    slug: PathArg<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Value>> {
    let Path(slug) = slug?;
    let model = state.site.get(&slug)?;
    let params = ListParams::from_query(query, &state.config)?;
    let table_query = model.list_query(&params)?;

    let results = state.services.db.admin.list_rows(&table_query).await?;
    let count = state.services.db.admin.count_rows(&table_query).await?;

    Ok(Json(json!({
        "entity": model.slug,
        "list_display": model.list_display,
        "count": count,
        "page": params.page,
        "page_size": params.page_size,
        "total_pages": total_pages(count.max(0) as usize, params.page_size),
        "results": results
    })))
}

async fn detail(
    State(state): State<AppState>,
    path: PathArg<(String, i64)>,
) -> Result<Json<Value>> {
    let Path((slug, id)) = path?;
    let model = state.site.get(&slug)?;
    let row = state
        .services
        .db
        .admin
        .find_row(model.table, model.columns, id)
        .await?
        .ok_or_else(|| SchoolDeskError::not_found(model.verbose_name, id))?;

    Ok(Json(row))
}

/// Aggregated view of a school, subject or student
async fn summary(
    State(state): State<AppState>,
    path: PathArg<(String, i64)>,
) -> Result<Json<Value>> {
    let Path((slug, id)) = path?;
    let model = state.site.get(&slug)?;
    let db = &state.services.db;
    let summary = match model.entity {
        Entity::Schools => db.get_school_overview(id).await?,
        Entity::Subjects => db.get_subject_summary(id).await?,
        Entity::Classes => db.get_class_summary(id).await?,
        Entity::Students => db.get_student_report(id).await?,
        _ => {
            return Err(SchoolDeskError::InvalidInput(format!(
                "No summary for {}",
                model.verbose_name_plural
            )))
        }
    };

    Ok(Json(summary))
}

async fn create(
    State(state): State<AppState>,
    Extension(context): Extension<AdminContext>,
    slug: PathArg<String>,
    body: JsonBody,
) -> Result<(StatusCode, Json<Value>)> {
    let Path(slug) = slug?;
    let Json(body) = body?;
    let model = writable(&state, &context, &slug)?;
    let record = dispatch::create(&state.services, model.entity, body).await?;

    log_admin_action(&context.user.username, "create", model.slug, record.get("id").and_then(Value::as_i64));
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update(
    State(state): State<AppState>,
    Extension(context): Extension<AdminContext>,
    path: PathArg<(String, i64)>,
    body: JsonBody,
) -> Result<Json<Value>> {
    let Path((slug, id)) = path?;
    let Json(body) = body?;
    let model = writable(&state, &context, &slug)?;
    let record = dispatch::update(&state.services, model.entity, id, body).await?;

    log_admin_action(&context.user.username, "update", model.slug, Some(id));
    Ok(Json(record))
}

async fn remove(
    State(state): State<AppState>,
    Extension(context): Extension<AdminContext>,
    path: PathArg<(String, i64)>,
) -> Result<StatusCode> {
    let Path((slug, id)) = path?;
    let model = writable(&state, &context, &slug)?;
    dispatch::delete(&state.services, model.entity, id).await?;

    log_admin_action(&context.user.username, "delete", model.slug, Some(id));
    Ok(StatusCode::NO_CONTENT)
}

async fn link(
    State(state): State<AppState>,
    Extension(context): Extension<AdminContext>,
    path: PathArg<(String, i64, String, i64)>,
) -> Result<StatusCode> {
    let Path((slug, id, relation, related_id)) = path?;
    let model = writable(&state, &context, &slug)?;
    related(model, &relation)?;
    dispatch::link(&state.services, model.entity, id, &relation, related_id).await?;

    log_admin_action(&context.user.username, "link", model.slug, Some(id));
    Ok(StatusCode::NO_CONTENT)
}

async fn unlink(
    State(state): State<AppState>,
    Extension(context): Extension<AdminContext>,
    path: PathArg<(String, i64, String, i64)>,
) -> Result<StatusCode> {
    let Path((slug, id, relation, related_id)) = path?;
    let model = writable(&state, &context, &slug)?;
    related(model, &relation)?;
    dispatch::unlink(&state.services, model.entity, id, &relation, related_id).await?;

    log_admin_action(&context.user.username, "unlink", model.slug, Some(id));
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn lazy_state() -> AppState {
        let mut settings = crate::config::Settings::default();
        settings.database.min_connections = 0;
        settings.database.acquire_timeout_seconds = 1;
        settings.database.url = "postgresql://nobody@127.0.0.1:1/none".to_string();
        let pool = crate::database::create_lazy_pool(&settings.database).unwrap();
        let services = ServiceFactory::new(crate::database::DatabaseService::new(pool));
        AppState::new(services, settings.admin)
    }

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_admin_requires_credentials() {
        let app = router(lazy_state());
        let response = app
            .oneshot(HttpRequest::get("/admin/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
        let body = body_json(response).await;
        assert_eq!(body["error"], "Authentication required");
    }

    #[tokio::test]
    async fn test_malformed_credentials_rejected() {
        let app = router(lazy_state());
        let response = app
            .oneshot(
                HttpRequest::get("/admin/schools/")
                    .header(header::AUTHORIZATION, "Bearer token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_health_reports_unavailable_database() {
        let app = router(lazy_state());
        let response = app
            .oneshot(HttpRequest::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(response).await;
        assert_eq!(body["status"], "unavailable");
        assert_eq!(body["checks"]["database_healthy"], false);
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let app = router(lazy_state());
        let response = app
            .oneshot(HttpRequest::get("/nowhere").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
