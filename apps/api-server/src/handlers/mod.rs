//! HTTP handlers and route configuration.

mod health;
mod posts;

use actix_web::error::{PathError, QueryPayloadError};
use actix_web::web;

use crate::middleware::auth::RequireAuth;
use crate::middleware::error::AppError;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(|err: QueryPayloadError, _req| {
        AppError::BadRequest(err.to_string()).into()
    }))
    // Ids that do not parse cannot name an existing post.
    .app_data(web::PathConfig::default().error_handler(|err: PathError, req| {
        tracing::debug!(error = %err, path = %req.path(), "Unparseable path parameter");
        AppError::NotFound(format!("No resource at {}", req.path())).into()
    }))
    .service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Post resource, every route behind the api guard
            .service(
                web::scope("/posts")
                    .wrap(RequireAuth)
                    .service(
                        web::resource("")
                            .route(web::get().to(posts::index))
                            .route(web::post().to(posts::store)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(posts::show))
                            .route(web::put().to(posts::update))
                            .route(web::patch().to(posts::update))
                            .route(web::delete().to(posts::destroy)),
                    ),
            ),
    );
}
