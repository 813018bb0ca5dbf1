//! Multipart wire encoding (RFC 2046 section 5.1).
//!
//! Each part is written as `--boundary CRLF headers CRLF body CRLF` and the
//! entity ends with `--boundary--`. Bodies are never scanned for the
//! boundary.

use crate::base::error::MultipartError;
use crate::http::entity::{BodyPartEntity, ByteStream};
use crate::http::headerset::HeaderSet;
use crate::http::mediatype::MediaType;
use crate::multipart::boundary::{random_boundary, validate_boundary};
use crate::multipart::bodypart::BodyPart;
use crate::multipart::config::BoundaryConfig;
use crate::multipart::streaming::Multipart;
use crate::multipart::strict::StrictMultipart;
use bytes::{BufMut, Bytes, BytesMut};
use futures::future;
use futures::stream::{self, StreamExt, TryStreamExt};
use http::HeaderValue;
use http_body::Frame;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full, StreamBody};

const CRLF: &[u8] = b"\r\n";

/// A serialized multipart entity: its `Content-Type` and payload.
///
/// `E` is [`Bytes`] for entities encoded from a strict multipart and a
/// [`ByteStream`] for entities produced lazily from a streaming one.
#[derive(Debug)]
pub struct WireEntity<E> {
    media_type: MediaType,
    boundary: String,
    content_type: HeaderValue,
    body: E,
}

impl<E> WireEntity<E> {
    pub fn media_type(&self) -> &MediaType {
        &self.media_type
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// `multipart/<subtype>; boundary=<boundary>`.
    pub fn content_type(&self) -> &HeaderValue {
        &self.content_type
    }

    pub fn body(&self) -> &E {
        &self.body
    }

    pub fn into_body_parts(self) -> (HeaderValue, E) {
        (self.content_type, self.body)
    }
}

impl WireEntity<Bytes> {
    pub fn content_length(&self) -> u64 {
        self.body.len() as u64
    }

    pub fn into_bytes(self) -> Bytes {
        self.body
    }

    /// As an `http_body::Body`.
    pub fn into_body(self) -> Full<Bytes> {
        Full::new(self.body)
    }
}

impl WireEntity<ByteStream> {
    /// As an `http_body::Body`. Stream errors surface as body errors.
    pub fn into_body(self) -> UnsyncBoxBody<Bytes, MultipartError> {
        StreamBody::new(self.body.map_ok(Frame::data)).boxed_unsync()
    }
}

fn write_head(out: &mut BytesMut, boundary: &str, headers: &HeaderSet) {
    out.put_slice(b"--");
    out.put_slice(boundary.as_bytes());
    out.put_slice(CRLF);
    headers.render(out);
    out.put_slice(CRLF);
}

fn head_len(boundary: &str, headers: &HeaderSet) -> usize {
    // --boundary\r\n + headers + \r\n
    2 + boundary.len() + 2 + headers.rendered_len() + 2
}

fn closing(boundary: &str) -> Bytes {
    let mut out = BytesMut::with_capacity(boundary.len() + 4);
    out.put_slice(b"--");
    out.put_slice(boundary.as_bytes());
    out.put_slice(b"--");
    out.freeze()
}

fn content_type(media_type: &MediaType, boundary: &str) -> Result<HeaderValue, MultipartError> {
    validate_boundary(boundary)?;
    media_type.to_header_value(boundary)
}

impl<P: BodyPart<Entity = Bytes>> StrictMultipart<P> {
    /// Number of bytes [`to_entity`](Self::to_entity) produces.
    pub fn encoded_len(&self, boundary: &str) -> usize {
        let parts: usize = self
            .iter()
            .map(|part| head_len(boundary, &part.headers()) + part.entity().len() + CRLF.len())
            .sum();
        // Final boundary: --boundary--
        parts + 2 + boundary.len() + 2
    }

    /// Encode with the given boundary.
    pub fn to_entity(&self, boundary: &str) -> Result<WireEntity<Bytes>, MultipartError> {
        let content_type = content_type(self.media_type(), boundary)?;

        let mut out = BytesMut::with_capacity(self.encoded_len(boundary));
        for part in self.iter() {
            write_head(&mut out, boundary, &part.headers());
            out.put_slice(part.entity());
            out.put_slice(CRLF);
        }
        out.put_slice(&closing(boundary));

        tracing::debug!(
            media_type = %self.media_type(),
            parts = self.len(),
            bytes = out.len(),
            "encoded strict multipart entity"
        );

        Ok(WireEntity {
            media_type: self.media_type().clone(),
            boundary: boundary.to_string(),
            content_type,
            body: out.freeze(),
        })
    }

    /// Encode with a freshly generated random boundary.
    pub fn to_entity_random(&self) -> Result<WireEntity<Bytes>, MultipartError> {
        self.to_entity_random_with(&BoundaryConfig::default())
    }

    pub fn to_entity_random_with(
        &self,
        config: &BoundaryConfig,
    ) -> Result<WireEntity<Bytes>, MultipartError> {
        self.to_entity(&random_boundary(config)?)
    }
}

impl<P> Multipart<P>
where
    P: BodyPart<Entity = BodyPartEntity> + Send + 'static,
{
    /// Encode lazily with the given boundary.
    ///
    /// The body is produced as the parts and their entities are read. The
    /// first error from either ends the body stream.
    pub fn to_entity(self, boundary: &str) -> Result<WireEntity<ByteStream>, MultipartError> {
        let content_type = content_type(self.media_type(), boundary)?;
        let (media_type, parts) = self.into_inner();

        let part_boundary = boundary.to_string();
        let encoded = parts
            .map(move |part| match part {
                Ok(part) => {
                    let mut head = BytesMut::new();
                    write_head(&mut head, &part_boundary, &part.headers());
                    stream::once(future::ready(Ok(head.freeze())))
                        .chain(part.into_entity().into_stream())
                        .chain(stream::once(future::ready(Ok(Bytes::from_static(CRLF)))))
                        .boxed()
                }
                Err(e) => stream::once(future::ready(Err(e))).boxed(),
            })
            .flatten()
            .chain(stream::once(future::ready(Ok(closing(boundary)))));

        let mut failed = false;
        let body = encoded
            .take_while(move |chunk| {
                let keep = !failed;
                failed |= chunk.is_err();
                future::ready(keep)
            })
            .boxed();

        tracing::debug!(media_type = %media_type, boundary, "encoding streamed multipart entity");

        Ok(WireEntity {
            media_type,
            boundary: boundary.to_string(),
            content_type,
            body,
        })
    }

    pub fn to_entity_random(self) -> Result<WireEntity<ByteStream>, MultipartError> {
        self.to_entity_random_with(&BoundaryConfig::default())
    }

    pub fn to_entity_random_with(
        self,
        config: &BoundaryConfig,
    ) -> Result<WireEntity<ByteStream>, MultipartError> {
        let boundary = random_boundary(config)?;
        self.to_entity(&boundary)
    }
}
