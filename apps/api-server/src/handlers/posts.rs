//! Post resource handlers.

use std::future::Future;
use std::pin::Pin;

use actix_web::dev::Payload;
use actix_web::error::JsonPayloadError;
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, HttpResponse, web};

use posts_core::domain::PostId;
use posts_core::services::PostListing;
use posts_shared::dto::{ListPostsQuery, PostPayload};
use posts_shared::{Collection, PageMeta};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::observability::RequestId;
use crate::state::AppState;

/// Body of a create or update request.
///
/// An absent or unparseable JSON body is read as an empty payload, so the
/// client gets field errors for `title`. A body sent with a non-JSON content
/// type, or one over the size limit, is rejected as such.
pub struct PostBody(pub PostPayload);

impl FromRequest for PostBody {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let has_content_type = req.headers().contains_key(header::CONTENT_TYPE);
        let json = web::Json::<PostPayload>::from_request(req, payload);

        Box::pin(async move {
            let err = match json.await {
                Ok(body) => return Ok(PostBody(body.into_inner())),
                Err(err) => err,
            };

            match err.as_error::<JsonPayloadError>() {
                Some(JsonPayloadError::ContentType) if has_content_type => Err(
                    AppError::UnsupportedMediaType("Expected an application/json body".to_string()),
                ),
                Some(
                    e @ (JsonPayloadError::Overflow { .. }
                    | JsonPayloadError::OverflowKnownLength { .. }),
                ) => Err(AppError::PayloadTooLarge(e.to_string())),
                Some(JsonPayloadError::Payload(e)) => Err(AppError::BadRequest(e.to_string())),
                _ => {
                    tracing::debug!(error = %err, "Unreadable post body, validating as empty");
                    Ok(PostBody(PostPayload::default()))
                }
            }
        })
    }
}

/// GET /api/posts
pub async fn index(
    state: web::Data<AppState>,
    _identity: Identity,
    query: web::Query<ListPostsQuery>,
) -> AppResult<HttpResponse> {
    let ListPostsQuery { page, per_page } = query.into_inner();

    let body = match state.posts.list(page, per_page).await? {
        PostListing::All(posts) => Collection::all(posts),
        PostListing::Paged(page) => {
            let meta = PageMeta {
                current_page: page.page,
                per_page: page.per_page,
                total: page.total,
                last_page: page.last_page(),
            };
            Collection::paged(page.items, meta)
        }
    };

    Ok(HttpResponse::Ok().json(body))
}

/// POST /api/posts
pub async fn store(
    state: web::Data<AppState>,
    identity: Identity,
    request_id: RequestId,
    PostBody(payload): PostBody,
) -> AppResult<HttpResponse> {
    let post = state.posts.create(payload.title.as_ref()).await?;
    tracing::info!(
        post_id = post.id,
        subject = %identity.subject,
        request_id = %request_id.as_str(),
        "Post created"
    );

    Ok(HttpResponse::Created().json(post))
}

/// GET /api/posts/{id}
pub async fn show(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<PostId>,
) -> AppResult<HttpResponse> {
    let post = state.posts.show(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// PUT|PATCH /api/posts/{id}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    request_id: RequestId,
    path: web::Path<PostId>,
    PostBody(payload): PostBody,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let post = state.posts.update(id, payload.title.as_ref()).await?;
    tracing::info!(
        post_id = id,
        subject = %identity.subject,
        request_id = %request_id.as_str(),
        "Post updated"
    );

    Ok(HttpResponse::Ok().json(post))
}

/// DELETE /api/posts/{id}
pub async fn destroy(
    state: web::Data<AppState>,
    identity: Identity,
    request_id: RequestId,
    path: web::Path<PostId>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    state.posts.delete(id).await?;
    tracing::info!(
        post_id = id,
        subject = %identity.subject,
        request_id = %request_id.as_str(),
        "Post deleted"
    );

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::{StatusCode, header};
    use actix_web::{App, test as actix_test};
    use serde_json::{Value, json};

    use posts_core::domain::Title;
    use posts_core::ports::{PostRepository, TokenService};
    use posts_infra::{InMemoryPostRepository, JwtConfig, JwtTokenService};

    use super::*;
    use crate::handlers::configure_routes;
    use crate::observability::RequestIdMiddleware;

    macro_rules! init_app {
        ($state:expr) => {
            actix_test::init_service(
                App::new()
                    .app_data(web::Data::new($state))
                    .wrap(RequestIdMiddleware)
                    .configure(configure_routes),
            )
            .await
        };
    }

    fn jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key".to_string(),
            expiration_hours: 1,
            issuer: "posts-api-test".to_string(),
            guard: "api".to_string(),
        }
    }

    struct Ctx {
        state: AppState,
        repo: Arc<InMemoryPostRepository>,
        token: String,
    }

    fn ctx() -> Ctx {
        let repo = Arc::new(InMemoryPostRepository::new());
        let tokens = Arc::new(JwtTokenService::new(jwt_config()));
        let token = tokens.generate_token("user-1").unwrap();
        Ctx {
            state: AppState::in_memory(repo.clone(), tokens),
            repo,
            token,
        }
    }

    fn acting_as(req: actix_test::TestRequest, token: &str) -> actix_test::TestRequest {
        req.insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
    }

    async fn seed(repo: &InMemoryPostRepository, title: &str) -> posts_core::domain::Post {
        repo.create(Title::parse(title).unwrap()).await.unwrap()
    }

    fn assert_post_shape(body: &Value) {
        for key in ["id", "title", "created_at", "updated_at"] {
            assert!(body.get(key).is_some(), "missing {key} in {body}");
        }
    }

    #[actix_web::test]
    async fn test_post_store() {
        let ctx = ctx();
        let app = init_app!(ctx.state.clone());

        let req = acting_as(actix_test::TestRequest::post().uri("/api/posts"), &ctx.token)
            .set_json(json!({ "title": "El post de prueba" }))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(resp).await;
        assert_post_shape(&body);
        assert_eq!(body["title"], "El post de prueba");
        assert!(body.get("data").is_none());

        let stored = ctx.repo.list().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].title, "El post de prueba");
        assert_eq!(body["id"], stored[0].id);
    }

    #[actix_web::test]
    async fn test_post_validate_title() {
        let ctx = ctx();
        let app = init_app!(ctx.state.clone());

        let req = acting_as(actix_test::TestRequest::post().uri("/api/posts"), &ctx.token)
            .set_json(json!({ "title": "" }))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = actix_test::read_body_json(resp).await;
        assert!(body["errors"]["title"].is_array());
        assert!(ctx.repo.list().await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_post_store_without_body_is_a_validation_error() {
        let ctx = ctx();
        let app = init_app!(ctx.state.clone());

        let req = acting_as(actix_test::TestRequest::post().uri("/api/posts"), &ctx.token).to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["errors"]["title"][0], "The title field is required.");
    }

    #[actix_web::test]
    async fn test_post_store_rejects_non_string_title() {
        let ctx = ctx();
        let app = init_app!(ctx.state.clone());

        let req = acting_as(actix_test::TestRequest::post().uri("/api/posts"), &ctx.token)
            .set_json(json!({ "title": 12 }))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["errors"]["title"][0], "The title must be a string.");
    }

    #[actix_web::test]
    async fn test_post_show() {
        let ctx = ctx();
        let post = seed(&ctx.repo, "Un post").await;
        let app = init_app!(ctx.state.clone());

        let req = acting_as(
            actix_test::TestRequest::get().uri(&format!("/api/posts/{}", post.id)),
            &ctx.token,
        )
        .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(resp).await;
        assert_post_shape(&body);
        assert_eq!(body["title"], post.title);
    }

    #[actix_web::test]
    async fn test_post_404_show() {
        let ctx = ctx();
        let app = init_app!(ctx.state.clone());

        for uri in ["/api/posts/1000", "/api/posts/not-a-number"] {
            let req = acting_as(actix_test::TestRequest::get().uri(uri), &ctx.token).to_request();
            let resp = actix_test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
            let body: Value = actix_test::read_body_json(resp).await;
            assert_eq!(body["status"], 404, "{uri}");
            assert_eq!(body["title"], "Not Found", "{uri}");
        }
    }

    #[actix_web::test]
    async fn test_post_store_rejects_non_json_content_type() {
        let ctx = ctx();
        let app = init_app!(ctx.state.clone());

        let req = acting_as(actix_test::TestRequest::post().uri("/api/posts"), &ctx.token)
            .insert_header((header::CONTENT_TYPE, "text/plain"))
            .set_payload(r#"{"title":"hola"}"#)
            .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let body: Value = actix_test::read_body_json(resp).await;
        assert!(body.get("errors").is_none());
        assert!(ctx.repo.list().await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_post_store_rejects_oversized_body() {
        let ctx = ctx();
        let app = init_app!(ctx.state.clone());

        let huge = format!(r#"{{"title":"{}"}}"#, "a".repeat(3 * 1024 * 1024));
        let req = acting_as(actix_test::TestRequest::post().uri("/api/posts"), &ctx.token)
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload(huge)
            .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(ctx.repo.list().await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_post_store_with_malformed_json_is_a_validation_error() {
        let ctx = ctx();
        let app = init_app!(ctx.state.clone());

        let req = acting_as(actix_test::TestRequest::post().uri("/api/posts"), &ctx.token)
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload(r#"{"title": "#)
            .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["errors"]["title"][0], "The title field is required.");
    }

    #[actix_web::test]
    async fn test_post_update() {
        let ctx = ctx();
        let post = seed(&ctx.repo, "viejo").await;
        let app = init_app!(ctx.state.clone());

        let req = acting_as(
            actix_test::TestRequest::put().uri(&format!("/api/posts/{}", post.id)),
            &ctx.token,
        )
        .set_json(json!({ "title": "nuevo" }))
        .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(resp).await;
        assert_post_shape(&body);
        assert_eq!(body["title"], "nuevo");
        assert_eq!(body["id"], post.id);

        let stored = ctx.repo.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "nuevo");
        assert_eq!(stored.created_at, post.created_at);
        assert!(stored.updated_at >= post.updated_at);
    }

    #[actix_web::test]
    async fn test_post_patch_updates_title() {
        let ctx = ctx();
        let post = seed(&ctx.repo, "viejo").await;
        let app = init_app!(ctx.state.clone());

        let req = acting_as(
            actix_test::TestRequest::patch().uri(&format!("/api/posts/{}", post.id)),
            &ctx.token,
        )
        .set_json(json!({ "title": "parcheado" }))
        .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let stored = ctx.repo.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "parcheado");
    }

    #[actix_web::test]
    async fn test_post_update_validates_title() {
        let ctx = ctx();
        let post = seed(&ctx.repo, "viejo").await;
        let app = init_app!(ctx.state.clone());

        let req = acting_as(
            actix_test::TestRequest::put().uri(&format!("/api/posts/{}", post.id)),
            &ctx.token,
        )
        .set_json(json!({ "title": "   " }))
        .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let stored = ctx.repo.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(stored, post);
    }

    #[actix_web::test]
    async fn test_post_404_update_and_delete() {
        let ctx = ctx();
        let app = init_app!(ctx.state.clone());

        let req = acting_as(actix_test::TestRequest::put().uri("/api/posts/1000"), &ctx.token)
            .set_json(json!({ "title": "nuevo" }))
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = acting_as(actix_test::TestRequest::delete().uri("/api/posts/1000"), &ctx.token)
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_post_delete() {
        let ctx = ctx();
        let post = seed(&ctx.repo, "borrar").await;
        let app = init_app!(ctx.state.clone());
        let uri = format!("/api/posts/{}", post.id);

        let req = acting_as(actix_test::TestRequest::delete().uri(&uri), &ctx.token).to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert!(actix_test::read_body(resp).await.is_empty());
        assert_eq!(ctx.repo.find_by_id(post.id).await.unwrap(), None);

        let req = acting_as(actix_test::TestRequest::get().uri(&uri), &ctx.token).to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_post_index() {
        let ctx = ctx();
        for i in 0..5 {
            seed(&ctx.repo, &format!("post {i}")).await;
        }
        let app = init_app!(ctx.state.clone());

        let req = acting_as(actix_test::TestRequest::get().uri("/api/posts"), &ctx.token).to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(resp).await;
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 5);
        data.iter().for_each(assert_post_shape);
        assert!(body.get("meta").is_none());
    }

    #[actix_web::test]
    async fn test_post_index_empty() {
        let ctx = ctx();
        let app = init_app!(ctx.state.clone());

        let req = acting_as(actix_test::TestRequest::get().uri("/api/posts"), &ctx.token).to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body, json!({ "data": [] }));
    }

    #[actix_web::test]
    async fn test_post_index_paginated() {
        let ctx = ctx();
        for i in 1..=5 {
            seed(&ctx.repo, &format!("post {i}")).await;
        }
        let app = init_app!(ctx.state.clone());

        let req = acting_as(
            actix_test::TestRequest::get().uri("/api/posts?page=2&per_page=2"),
            &ctx.token,
        )
        .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["data"][0]["title"], "post 3");
        assert_eq!(body["data"][1]["title"], "post 4");
        assert_eq!(
            body["meta"],
            json!({ "current_page": 2, "per_page": 2, "total": 5, "last_page": 3 })
        );
    }

    #[actix_web::test]
    async fn test_post_index_rejects_bad_pagination() {
        let ctx = ctx();
        let app = init_app!(ctx.state.clone());

        let req = acting_as(actix_test::TestRequest::get().uri("/api/posts?page=0"), &ctx.token)
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = actix_test::read_body_json(resp).await;
        assert!(body["errors"]["page"].is_array());

        let req = acting_as(
            actix_test::TestRequest::get().uri("/api/posts?page=-1&per_page=-5"),
            &ctx.token,
        )
        .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["errors"]["page"][0], "The page must be at least 1.");
        assert_eq!(body["errors"]["per_page"][0], "The per_page must be at least 1.");

        let req = acting_as(actix_test::TestRequest::get().uri("/api/posts?page=abc"), &ctx.token)
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_post_guest() {
        let ctx = ctx();
        let post = seed(&ctx.repo, "intocable").await;
        let app = init_app!(ctx.state.clone());
        let item = format!("/api/posts/{}", post.id);

        let requests = [
            actix_test::TestRequest::get().uri("/api/posts"),
            actix_test::TestRequest::post()
                .uri("/api/posts")
                .set_json(json!({ "title": "intruso" })),
            actix_test::TestRequest::get().uri("/api/posts/1000"),
            actix_test::TestRequest::put()
                .uri(&item)
                .set_json(json!({ "title": "intruso" })),
            actix_test::TestRequest::delete().uri(&item),
        ];

        for req in requests {
            let resp = actix_test::call_service(&app, req.to_request()).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        }

        let stored = ctx.repo.list().await.unwrap();
        assert_eq!(stored, vec![post]);
    }

    #[actix_web::test]
    async fn test_post_rejects_foreign_tokens() {
        let ctx = ctx();
        let app = init_app!(ctx.state.clone());

        let other_guard = JwtTokenService::new(JwtConfig {
            guard: "web".to_string(),
            ..jwt_config()
        })
        .generate_token("user-1")
        .unwrap();
        let other_secret = JwtTokenService::new(JwtConfig {
            secret: "not-the-server-secret".to_string(),
            ..jwt_config()
        })
        .generate_token("user-1")
        .unwrap();

        for token in [other_guard.as_str(), other_secret.as_str(), "garbage"] {
            let req = acting_as(actix_test::TestRequest::get().uri("/api/posts"), token).to_request();
            let resp = actix_test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[actix_web::test]
    async fn test_health_is_public() {
        let ctx = ctx();
        let app = init_app!(ctx.state.clone());

        let req = actix_test::TestRequest::get().uri("/api/health").to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().contains_key("x-request-id"));
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["storage"], "memory");
    }
}
