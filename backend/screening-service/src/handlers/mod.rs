/// HTTP handlers for screening-service
///
/// This module contains handlers for:
/// - GraphQL: query/mutation execution, GraphiQL, SDL
/// - Uploads: multipart video upload per invite
/// - Health: liveness probe
pub mod graphql;
pub mod uploads;

use actix_web::{web, HttpResponse};

use crate::models::HealthResponse;

pub use graphql::{graphql_handler, playground_handler, schema_handler};
pub use uploads::upload_video;

/// Liveness only; dependencies are not checked.
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse { healthy: true })
}

/// Register every route. Callers provide `web::Data<AppState>` and
/// `web::Data<AppSchema>`.
pub fn routes(playground: bool) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.route("/graphql", web::post().to(graphql_handler))
            .route("/graphql/schema", web::get().to(schema_handler))
            .route("/upload/{invite_id}", web::post().to(upload_video))
            .route("/health", web::get().to(health));

        if playground {
            cfg.route("/graphql", web::get().to(playground_handler));
        }
    }
}
