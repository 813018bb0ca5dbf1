//! In-memory multipart decoding.
//!
//! Splits a complete entity at its boundary delimiters. Preamble and epilogue
//! are ignored, as is transport padding after a delimiter. Header folding is
//! not accepted.

use crate::base::error::MultipartError;
use crate::http::headerset::HeaderSet;
use crate::http::mediatype::MediaType;
use crate::multipart::bodypart::BodyPart;
use crate::multipart::boundary::validate_boundary;
use crate::multipart::strict::{
    StrictByteRangesMultipart, StrictFormDataMultipart, StrictGeneralMultipart, StrictMultipart,
};
use bytes::Bytes;
use memchr::memmem;

/// A decoded entity, typed by its media subtype.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedMultipart {
    General(StrictGeneralMultipart),
    FormData(StrictFormDataMultipart),
    ByteRanges(StrictByteRangesMultipart),
}

impl DecodedMultipart {
    pub fn media_type(&self) -> &MediaType {
        match self {
            DecodedMultipart::General(m) => m.media_type(),
            DecodedMultipart::FormData(m) => m.media_type(),
            DecodedMultipart::ByteRanges(m) => m.media_type(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            DecodedMultipart::General(m) => m.len(),
            DecodedMultipart::FormData(m) => m.len(),
            DecodedMultipart::ByteRanges(m) => m.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_form_data(self) -> Result<StrictFormDataMultipart, MultipartError> {
        match self {
            DecodedMultipart::FormData(m) => Ok(m),
            other => Err(mismatch(MediaType::FORM_DATA, other.media_type())),
        }
    }

    pub fn into_byte_ranges(self) -> Result<StrictByteRangesMultipart, MultipartError> {
        match self {
            DecodedMultipart::ByteRanges(m) => Ok(m),
            other => Err(mismatch(MediaType::BYTERANGES, other.media_type())),
        }
    }

    pub fn into_general(self) -> Result<StrictGeneralMultipart, MultipartError> {
        match self {
            DecodedMultipart::General(m) => Ok(m),
            other => Err(mismatch("*", other.media_type())),
        }
    }
}

fn mismatch(expected: &str, actual: &MediaType) -> MultipartError {
    MultipartError::MediaTypeMismatch {
        expected: format!("multipart/{expected}"),
        actual: actual.to_string(),
    }
}

/// Decode a complete entity given its `Content-Type` value.
///
/// `form-data` and `byteranges` decode into their typed variants, every
/// other `multipart/*` subtype into the general one.
pub fn decode_entity(content_type: &str, body: Bytes) -> Result<DecodedMultipart, MultipartError> {
    let (media_type, boundary) = MediaType::parse(content_type)?;
    let boundary = boundary.ok_or_else(|| {
        MultipartError::InvalidMediaType(format!("no boundary parameter in {content_type:?}"))
    })?;

    if media_type.is_form_data() {
        decode_strict(media_type, &body, &boundary).map(DecodedMultipart::FormData)
    } else if media_type.is_byteranges() {
        decode_strict(media_type, &body, &boundary).map(DecodedMultipart::ByteRanges)
    } else {
        decode_strict(media_type, &body, &boundary).map(DecodedMultipart::General)
    }
}

/// Decode a complete entity into parts of type `P`.
pub fn decode_strict<P>(
    media_type: MediaType,
    body: &Bytes,
    boundary: &str,
) -> Result<StrictMultipart<P>, MultipartError>
where
    P: BodyPart<Entity = Bytes>,
{
    validate_boundary(boundary)?;
    let delimiter = format!("--{boundary}");
    let delimiter = delimiter.as_bytes();
    // Delimiters after the first are preceded by CRLF.
    let mut next_delimiter = Vec::with_capacity(delimiter.len() + 2);
    next_delimiter.extend_from_slice(b"\r\n");
    next_delimiter.extend_from_slice(delimiter);

    let mut pos = if body.starts_with(delimiter) {
        delimiter.len()
    } else {
        find(body, &next_delimiter, 0)
            .ok_or_else(|| framing("no opening boundary delimiter"))?
            + next_delimiter.len()
    };

    let mut parts = Vec::new();
    loop {
        if body[pos..].starts_with(b"--") {
            break;
        }
        pos = skip_line_end(body, pos)?;

        let end = find(body, &next_delimiter, pos)
            .ok_or_else(|| framing("no closing boundary delimiter"))?;
        let part = parse_part(body.slice(pos..end))?;
        parts.push(P::from_raw(part.0, part.1)?);
        pos = end + next_delimiter.len();
    }

    tracing::trace!(parts = parts.len(), bytes = body.len(), "decoded multipart entity");
    Ok(StrictMultipart::new(media_type, parts))
}

fn framing(reason: &str) -> MultipartError {
    MultipartError::Framing(reason.to_string())
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    memmem::find(haystack.get(from..)?, needle).map(|i| i + from)
}

/// Skip transport padding and the CRLF ending a delimiter line.
fn skip_line_end(body: &[u8], mut pos: usize) -> Result<usize, MultipartError> {
    while matches!(body.get(pos), Some(b' ' | b'\t')) {
        pos += 1;
    }
    if body[pos..].starts_with(b"\r\n") {
        Ok(pos + 2)
    } else {
        Err(framing("boundary delimiter not followed by CRLF"))
    }
}

fn parse_part(raw: Bytes) -> Result<(HeaderSet, Bytes), MultipartError> {
    let (head, body_start) = if raw.starts_with(b"\r\n") {
        (&raw[..0], 2)
    } else {
        let split = find(&raw, b"\r\n\r\n", 0)
            .ok_or_else(|| framing("part headers not terminated by an empty line"))?;
        (&raw[..split], split + 4)
    };

    let mut headers = HeaderSet::new();
    if !head.is_empty() {
        let text = std::str::from_utf8(head).map_err(|_| framing("part headers are not UTF-8"))?;
        for line in text.split("\r\n") {
            if line.starts_with([' ', '\t']) {
                return Err(framing("folded header lines are not supported"));
            }
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| framing("header line without ':'"))?;
            // Surrounding OWS is not part of the value.
            headers.append(name, value.trim_matches([' ', '\t']))?;
        }
    }
    Ok((headers, raw.slice(body_start..)))
}
