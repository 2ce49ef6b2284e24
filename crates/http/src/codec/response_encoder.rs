use crate::codec::header::HeaderEncoder;
use crate::protocol::{HttpResponse, SendError};
use bytes::BytesMut;
use tokio_util::codec::Encoder;
use tracing::trace;

#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseEncoder {
    header_encoder: HeaderEncoder,
}

impl ResponseEncoder {
    pub fn new() -> Self {
        Default::default()
    }
}

impl Encoder<HttpResponse> for ResponseEncoder {
    type Error = SendError;

    fn encode(&mut self, item: HttpResponse, dst: &mut BytesMut) -> Result<(), Self::Error> {
        trace!(status = item.status().as_u16(), body_size = item.body().len(), "encode response");
        self.header_encoder.encode(&item, dst)
    }
}

impl Encoder<&HttpResponse> for ResponseEncoder {
    type Error = SendError;

    fn encode(&mut self, item: &HttpResponse, dst: &mut BytesMut) -> Result<(), Self::Error> {
        self.header_encoder.encode(item, dst)
    }
}
