use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use http::header::{HeaderName, HeaderValue};
use http::StatusCode;
use rush_http::protocol::HttpResponse;
use rush_web::{handler_fn, BoxError, Json, Middleware, Next, RequestContext, Router, Server, ServerConfig};
use serde::Serialize;
use tracing::info;

#[derive(Serialize, Debug)]
struct User {
    id: String,
    name: Option<String>,
}

/// Logs method, path and elapsed time of every request it wraps.
struct AccessLog;

#[async_trait]
impl Middleware for AccessLog {
    async fn handle(&self, ctx: RequestContext, next: Next<'_>) -> Result<HttpResponse, BoxError> {
        let (method, path) = (ctx.method().clone(), ctx.path().to_string());
        let start = Instant::now();
        let response = next.run(ctx).await?;
        info!(%method, %path, status = %response.status(), elapsed = ?start.elapsed(), "handled");
        Ok(response)
    }
}

/// Rejects requests without an `x-token` header.
struct RequireToken;

#[async_trait]
impl Middleware for RequireToken {
    async fn handle(&self, ctx: RequestContext, next: Next<'_>) -> Result<HttpResponse, BoxError> {
        if ctx.headers().contains_key("x-token") {
            next.run(ctx).await
        } else {
            Ok(HttpResponse::new(StatusCode::UNAUTHORIZED))
        }
    }
}

// curl -v http://127.0.0.1:8080/user/42?name=alice
async fn show_user(ctx: RequestContext) -> Json<User> {
    Json(User {
        id: ctx.path_param("id").unwrap_or_default().to_string(),
        name: ctx.request().query_params().get("name").cloned(),
    })
}

// curl -v -H 'x-token: t' -d "name=alice" http://127.0.0.1:8080/user/42/edit
async fn edit_user(ctx: RequestContext) -> String {
    let fields = ctx.request().parsed_body();
    format!("user {} now has name {:?}\r\n", ctx.path_param("id").unwrap_or_default(), fields.get("name"))
}

// curl -v -F "avatar=@Cargo.toml" http://127.0.0.1:8080/upload
async fn upload(mut ctx: RequestContext) -> (StatusCode, String) {
    let Some(file) = ctx.request_mut().take_uploaded_file("avatar") else {
        return (StatusCode::BAD_REQUEST, "no avatar field\r\n".to_string());
    };
    match file.read_to_bytes() {
        Ok(content) => (StatusCode::OK, format!("received {} ({} bytes, {})\r\n", file.client_filename(), content.len(), file.client_media_type())),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, format!("{e}\r\n")),
    }
}

#[tokio::main]
async fn main() {
    let upload_dir = tempfile::tempdir().unwrap();
    let access_log: Arc<dyn Middleware> = Arc::new(AccessLog);

    let router = Router::builder()
        .register("/user/:id", vec![Arc::clone(&access_log)], handler_fn(show_user))
        .register("/user/:id/edit", vec![Arc::clone(&access_log), Arc::new(RequireToken) as Arc<dyn Middleware>], handler_fn(edit_user))
        .register("/upload", vec![access_log], handler_fn(upload))
        .build();

    let config = ServerConfig { address: "127.0.0.1:8080".to_string(), upload_dir: Some(upload_dir.path().to_path_buf()), log_level: "debug".to_string() };

    Server::builder()
        .config(config)
        .router(router)
        .default_handler(handler_fn(|ctx: RequestContext| async move {
            let path = HeaderValue::from_str(ctx.path()).unwrap_or(HeaderValue::from_static("?"));
            HttpResponse::not_found().with_header(HeaderName::from_static("x-missing-path"), path)
        }))
        .build()
        .unwrap()
        .start()
        .await;
}
