use crate::handler::{BoxError, RequestHandler};
use crate::router::Router;
use crate::RequestContext;
use rush_http::codec::HttpProtocol;
use rush_http::connection::HttpConnection;
use rush_http::handler::Handler;
use rush_http::protocol::{HttpResponse, ServerParams, ServerRequest, TempFileStorage};
use serde::Deserialize;
use std::fmt;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Settings a config loader produces for a [`Server`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: String,
    /// Where uploaded files are stored, the OS temp dir when unset.
    pub upload_dir: Option<PathBuf>,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: "127.0.0.1:8080".to_string(), upload_dir: None, log_level: "info".to_string() }
    }
}

impl ServerConfig {
    pub fn max_level(&self) -> Level {
        self.log_level.parse().unwrap_or(Level::INFO)
    }
}

pub struct ServerBuilder {
    router: Option<Router>,
    default_handler: Option<Box<dyn RequestHandler>>,
    address: Option<String>,
    upload_dir: Option<PathBuf>,
    log_level: Level,
}

impl ServerBuilder {
    fn new() -> Self {
        Self { router: None, default_handler: None, address: None, upload_dir: None, log_level: Level::INFO }
    }

    /// Takes address, upload dir and log level from `config`.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.log_level = config.max_level();
        self.address = Some(config.address);
        self.upload_dir = config.upload_dir;
        self
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn router(mut self, router: Router) -> Self {
        self.router = Some(router);
        self
    }

    /// Answers requests no rule matches; without one they get `404 Not Found`.
    pub fn default_handler(mut self, request_handler: impl RequestHandler + 'static) -> Self {
        self.default_handler = Some(Box::new(request_handler));
        self
    }

    pub fn upload_dir(mut self, upload_dir: impl Into<PathBuf>) -> Self {
        self.upload_dir = Some(upload_dir.into());
        self
    }

    pub fn log_level(mut self, log_level: Level) -> Self {
        self.log_level = log_level;
        self
    }

    pub fn build(self) -> Result<Server, ServerBuildError> {
        let router = self.router.ok_or(ServerBuildError::MissingRouter)?;
        let address = self.address.ok_or(ServerBuildError::MissingAddress)?;

        let resolved = address
            .to_socket_addrs()
            .map_err(|source| ServerBuildError::InvalidAddress { address: address.clone(), source })?
            .collect::<Vec<_>>();
        if resolved.is_empty() {
            return Err(ServerBuildError::InvalidAddress { address, source: io::Error::other("resolved to no socket address") });
        }

        let protocol = match self.upload_dir {
            Some(dir) => HttpProtocol::with_storage(Arc::new(TempFileStorage::new(dir))),
            None => HttpProtocol::new(),
        };

        Ok(Server { router, default_handler: self.default_handler, address: resolved, protocol, log_level: self.log_level })
    }
}

impl fmt::Debug for ServerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerBuilder")
            .field("router", &self.router)
            .field("has_default_handler", &self.default_handler.is_some())
            .field("address", &self.address)
            .field("upload_dir", &self.upload_dir)
            .field("log_level", &self.log_level)
            .finish()
    }
}

#[derive(Error, Debug)]
pub enum ServerBuildError {
    #[error("router must be set")]
    MissingRouter,
    #[error("address must be set")]
    MissingAddress,
    #[error("invalid address {address:?}: {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: io::Error,
    },
}

pub struct Server {
    router: Router,
    default_handler: Option<Box<dyn RequestHandler>>,
    address: Vec<SocketAddr>,
    protocol: HttpProtocol,
    log_level: Level,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    pub fn address(&self) -> &[SocketAddr] {
        &self.address
    }

    /// Installs the log subscriber, binds the configured address and serves forever.
    pub async fn start(self) {
        let subscriber = FmtSubscriber::builder().with_max_level(self.log_level).finish();
        if tracing::subscriber::set_global_default(subscriber).is_err() {
            warn!("global tracing subscriber already set, keep using it");
        }

        info!("start listening at {:?}", self.address);
        let tcp_listener = match TcpListener::bind(self.address.as_slice()).await {
            Ok(tcp_listener) => tcp_listener,
            Err(e) => {
                error!(cause = %e, "bind server error");
                return;
            }
        };

        self.serve(tcp_listener).await;
    }

    /// Accepts connections from `tcp_listener`, one task per connection.
    pub async fn serve(self, tcp_listener: TcpListener) {
        let handler = Arc::new(self);
        loop {
            let (tcp_stream, remote_addr) = match tcp_listener.accept().await {
                Ok(stream_and_addr) => stream_and_addr,
                Err(e) => {
                    warn!(cause = %e, "failed to accept");
                    continue;
                }
            };

            let mut server_params = ServerParams::new();
            server_params.insert("remote_addr".to_string(), remote_addr.to_string());
            if let Ok(local_addr) = tcp_stream.local_addr() {
                server_params.insert("local_addr".to_string(), local_addr.to_string());
            }

            let handler = Arc::clone(&handler);

            tokio::spawn(async move {
                let (reader, writer) = tcp_stream.into_split();
                let connection = HttpConnection::with_protocol(reader, writer, handler.protocol.clone(), server_params);
                match connection.process(handler).await {
                    Ok(_) => {
                        info!(%remote_addr, "finished process, connection shutdown");
                    }
                    Err(e) => {
                        error!(%remote_addr, "service has error, cause {}, connection shutdown", e);
                    }
                }
            });
        }
    }

    /// Routes `request` and runs the matched rule, the default handler, or answers 404.
    pub async fn dispatch(&self, request: ServerRequest) -> Result<HttpResponse, BoxError> {
        let (rule, params) = self.router.parse(request.path()).into_parts();
        let ctx = RequestContext::new(request, params);

        match (rule, &self.default_handler) {
            (Some(rule), _) => rule.dispatch(ctx).await,
            (None, Some(default_handler)) => default_handler.invoke(ctx).await,
            (None, None) => {
                debug!(path = ctx.path(), "no rule and no default handler");
                Ok(HttpResponse::not_found())
            }
        }
    }
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server").field("router", &self.router).field("address", &self.address).finish_non_exhaustive()
    }
}

impl Handler for Server {
    type Error = BoxError;

    async fn call(&self, req: ServerRequest) -> Result<HttpResponse, Self::Error> {
        self.dispatch(req).await
    }
}
