use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::database::models::*;
use crate::handlers::protected::{finance, graphql, profile, resource, settings};
use crate::handlers::public;
use crate::middleware::tenant::{ORG_HEADER, PROJECT_HEADER, ROLES_HEADER};
use crate::state::AppState;

pub const API_PREFIX: &str = "/api/v1";

/// Build the full HTTP application.
pub fn app(state: AppState) -> Router {
    let config = state.config().clone();

    let router = Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/api/v1/webhooks/payments", post(public::payment_webhook))
        .nest(API_PREFIX, api_routes());

    with_layers(router, &config).with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(profile::me).put(profile::upsert))
        .nest("/profiles", resource::read_routes::<Profile>())
        .nest("/contacts", resource::exportable_routes::<Contact>())
        .nest("/emergency-contacts", resource::exportable_routes::<EmergencyContact>())
        .nest("/job-history", resource::exportable_routes::<JobHistory>())
        .nest(
            "/finance/transactions",
            resource::exportable_routes::<Transaction>().route("/summary", get(finance::summary)),
        )
        .nest("/marketplace/resources", resource::crud_routes::<MarketplaceResource>())
        .nest("/pipeline/jobs", resource::crud_routes::<PipelineJob>())
        .route("/settings", get(resource::list::<Setting>))
        .route(
            "/settings/:key",
            get(settings::get).put(settings::put).delete(settings::delete),
        )
        .route("/audit-logs", get(resource::list::<AuditLog>))
        .route("/graphql", post(graphql::execute))
}

fn with_layers(mut router: Router<AppState>, config: &AppConfig) -> Router<AppState> {
    // The configured limit replaces axum's 2MB extractor default
    router = router
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.api.max_request_size_bytes));
    if config.api.enable_response_compression {
        router = router.layer(CompressionLayer::new());
    }
    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security.cors_origins));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(ORG_HEADER),
            HeaderName::from_static(ROLES_HEADER),
            HeaderName::from_static(PROJECT_HEADER),
        ])
        .expose_headers([header::CONTENT_DISPOSITION])
        .allow_credentials(true)
}
