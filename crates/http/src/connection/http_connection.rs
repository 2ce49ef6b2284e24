use std::error::Error;
use std::fmt;
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, error, info, warn};

use crate::codec::{HttpProtocol, RequestDecoder, ResponseEncoder};
use crate::handler::Handler;
use crate::protocol::{HttpError, HttpResponse, ParseError, SendError, ServerParams};

/// Initial capacity of the read buffer, it grows up to one full frame.
const READ_BUFFER_SIZE: usize = 8 * 1024;

/// An HTTP connection serving requests one frame at a time.
///
/// Requests are decoded from `R`, passed to the handler in order, and each
/// response is written to `W` before the next request is decoded. The
/// connection stays open until the peer closes it or a request asks for
/// `connection: close`.
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
pub struct HttpConnection<R, W> {
    framed_read: FramedRead<R, RequestDecoder>,
    framed_write: FramedWrite<W, ResponseEncoder>,
}

impl<R, W> fmt::Debug for HttpConnection<R, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpConnection")
            .field("decoder", self.framed_read.decoder())
            .field("read_buffered", &self.framed_read.read_buffer().len())
            .field("write_buffered", &self.framed_write.write_buffer().len())
            .finish()
    }
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_protocol(reader, writer, HttpProtocol::new(), ServerParams::new())
    }

    /// Creates a connection decoding with `protocol`, tagging every request with `server_params`.
    pub fn with_protocol(reader: R, writer: W, protocol: HttpProtocol, server_params: ServerParams) -> Self {
        Self {
            framed_read: FramedRead::with_capacity(reader, RequestDecoder::with_protocol(protocol, server_params), READ_BUFFER_SIZE),
            framed_write: FramedWrite::new(writer, ResponseEncoder::new()),
        }
    }

    /// Serves requests until the connection ends.
    ///
    /// A framing error is answered with its canned status line, after which the
    /// writer is shut down and the error returned.
    pub async fn process<H>(mut self, handler: Arc<H>) -> Result<(), HttpError>
    where
        H: Handler,
    {
        loop {
            match self.framed_read.next().await {
                Some(Ok(request)) => {
                    let close = request.wants_close();
                    debug!(method = %request.method(), path = request.path(), close, "receive request");

                    let response = match handler.call(request).await {
                        Ok(response) => response,
                        Err(e) => {
                            let e: Box<dyn Error + Send + Sync> = e.into();
                            error!(cause = %e, "handle request error");
                            HttpResponse::internal_server_error()
                        }
                    };

                    self.framed_write.send(response).await?;

                    if close {
                        info!("request asked to close, shutdown connection");
                        self.framed_write.get_mut().shutdown().await.map_err(SendError::io)?;
                        return Ok(());
                    }
                }

                Some(Err(e)) => {
                    self.abort(&e).await?;
                    return Err(e.into());
                }

                None => {
                    info!("cant read more request, break this connection down");
                    return Ok(());
                }
            }
        }
    }

    async fn abort(&mut self, e: &ParseError) -> Result<(), HttpError> {
        let Some(payload) = e.close_payload() else {
            error!(cause = %e, "can't receive next request");
            return Ok(());
        };

        warn!(cause = %e, "malformed request frame, close connection");
        let writer = self.framed_write.get_mut();
        writer.write_all(payload).await.map_err(SendError::io)?;
        writer.shutdown().await.map_err(SendError::io)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ResponseDecoder;
    use crate::handler::make_handler;
    use crate::protocol::ServerRequest;
    use http::StatusCode;
    use std::convert::Infallible;
    use tokio::io::{duplex, split, AsyncReadExt};

    fn echo_path() -> Arc<impl Handler + Send + Sync> {
        Arc::new(make_handler(|req: ServerRequest| async move {
            let remote = req.server_params().get("remote_addr").cloned().unwrap_or_default();
            Ok::<_, Infallible>(HttpResponse::ok().with_body(format!("{}{remote}", req.path())))
        }))
    }

    #[tokio::test]
    async fn keep_alive_serves_pipelined_requests() {
        let (client, server) = duplex(64 * 1024);
        let (reader, writer) = split(server);
        let task = tokio::spawn(HttpConnection::new(reader, writer).process(echo_path()));

        let (client_reader, mut client_writer) = split(client);
        client_writer.write_all(b"GET /a HTTP/1.1\r\n\r\nGET /b HTTP/1.1\r\nHost: x\r\n\r\n").await.unwrap();

        let mut responses = FramedRead::new(client_reader, ResponseDecoder::new());
        assert_eq!(&responses.next().await.unwrap().unwrap().body()[..], b"/a");
        assert_eq!(&responses.next().await.unwrap().unwrap().body()[..], b"/b");

        client_writer.shutdown().await.unwrap();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn connection_close_ends_after_response() {
        let (client, server) = duplex(64 * 1024);
        let (reader, writer) = split(server);
        let params = ServerParams::from([("remote_addr".to_string(), "@peer".to_string())]);
        let connection = HttpConnection::with_protocol(reader, writer, HttpProtocol::new(), params);
        let task = tokio::spawn(connection.process(echo_path()));

        let (client_reader, mut client_writer) = split(client);
        client_writer.write_all(b"GET /bye HTTP/1.1\r\nConnection: close\r\n\r\n").await.unwrap();

        let mut responses = FramedRead::new(client_reader, ResponseDecoder::new());
        let response = responses.next().await.unwrap().unwrap();
        assert_eq!(&response.body()[..], b"/bye@peer");
        assert!(responses.next().await.is_none());

        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn http_10_closes_by_default() {
        let (client, server) = duplex(64 * 1024);
        let (reader, writer) = split(server);
        let task = tokio::spawn(HttpConnection::new(reader, writer).process(echo_path()));

        let (mut client_reader, mut client_writer) = split(client);
        client_writer.write_all(b"GET /old HTTP/1.0\r\n\r\n").await.unwrap();

        let mut raw = Vec::new();
        client_reader.read_to_end(&mut raw).await.unwrap();
        assert_eq!(raw, b"HTTP/1.1 200 OK\r\ncontent-length: 4\r\n\r\n/old");

        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn framing_error_writes_canned_status_and_closes() {
        let (client, server) = duplex(64 * 1024);
        let (reader, writer) = split(server);
        let task = tokio::spawn(HttpConnection::new(reader, writer).process(echo_path()));

        let (mut client_reader, mut client_writer) = split(client);
        client_writer.write_all(b"POST /users HTTP/1.1\r\nHost: x\r\n\r\n").await.unwrap();

        let mut raw = Vec::new();
        client_reader.read_to_end(&mut raw).await.unwrap();
        assert_eq!(raw, b"HTTP/1.1 400 Bad Request\r\n\r\n");

        let err = task.await.unwrap().unwrap_err();
        assert!(matches!(err, HttpError::RequestError { source: ParseError::InvalidContentLength { .. } }));
    }

    #[tokio::test]
    async fn oversized_declared_body_gets_413_and_closes() {
        let (client, server) = duplex(64 * 1024);
        let (reader, writer) = split(server);
        let task = tokio::spawn(HttpConnection::new(reader, writer).process(echo_path()));

        let (mut client_reader, mut client_writer) = split(client);
        client_writer.write_all(b"POST /x HTTP/1.1\r\nContent-Length: 1152921504606846976\r\n\r\n").await.unwrap();

        let mut raw = Vec::new();
        client_reader.read_to_end(&mut raw).await.unwrap();
        assert_eq!(raw, b"HTTP/1.1 413 Request Entity Too Large\r\n\r\n");

        let err = task.await.unwrap().unwrap_err();
        assert!(matches!(err, HttpError::RequestError { source: ParseError::TooLargeBody { .. } }));
    }

    #[tokio::test]
    async fn debug_reports_buffered_bytes() {
        let (_client, server) = duplex(64);
        let (reader, writer) = split(server);

        let debug = format!("{:?}", HttpConnection::new(reader, writer));
        assert!(debug.starts_with("HttpConnection { decoder: RequestDecoder"));
        assert!(debug.ends_with("read_buffered: 0, write_buffered: 0 }"));
    }

    #[tokio::test]
    async fn handler_error_becomes_500() {
        let (client, server) = duplex(64 * 1024);
        let (reader, writer) = split(server);
        let handler = Arc::new(make_handler(|_req: ServerRequest| async { Err::<HttpResponse, _>("database is gone") }));
        let task = tokio::spawn(HttpConnection::new(reader, writer).process(handler));

        let (client_reader, mut client_writer) = split(client);
        client_writer.write_all(b"GET /report HTTP/1.1\r\n\r\n").await.unwrap();

        let mut responses = FramedRead::new(client_reader, ResponseDecoder::new());
        let response = responses.next().await.unwrap().unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        client_writer.shutdown().await.unwrap();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn incomplete_frame_at_eof_is_dropped() {
        let (client, server) = duplex(64 * 1024);
        let (reader, writer) = split(server);
        let task = tokio::spawn(HttpConnection::new(reader, writer).process(echo_path()));

        let (_client_reader, mut client_writer) = split(client);
        client_writer.write_all(b"GET /half HTTP/1.1\r\nHo").await.unwrap();
        client_writer.shutdown().await.unwrap();

        task.await.unwrap().unwrap();
    }
}
