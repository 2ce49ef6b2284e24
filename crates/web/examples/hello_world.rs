use rush_web::{handler_fn, RequestContext, Router, Server};

async fn hello_world(_ctx: RequestContext) -> &'static str {
    "hello world"
}

async fn default_handler(_ctx: RequestContext) -> &'static str {
    "404 not found"
}

#[tokio::main]
async fn main() {
    let router = Router::builder().route("/", handler_fn(hello_world)).build();

    Server::builder()
        .router(router)
        .address("127.0.0.1:3000")
        .default_handler(handler_fn(default_handler))
        .build()
        .unwrap()
        .start()
        .await;
}
