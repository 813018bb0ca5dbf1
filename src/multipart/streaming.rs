use crate::base::error::MultipartError;
use crate::http::entity::BodyPartEntity;
use crate::http::headerset::HeaderSet;
use crate::http::mediatype::MediaType;
use crate::multipart::bodypart::{BodyPart, GeneralPart};
use crate::multipart::byteranges::ByteRangesPart;
use crate::multipart::formdata::FormDataPart;
use crate::multipart::partstream::PartStream;
use futures::stream::{Stream, StreamExt};

/// A multipart entity whose parts arrive lazily.
///
/// Owns its single-use [`PartStream`]; consuming the parts (directly or via
/// `to_strict`) uses it up.
#[derive(Debug)]
pub struct Multipart<P> {
    media_type: MediaType,
    parts: PartStream<P>,
}

/// `multipart/*` with undifferentiated parts.
pub type GeneralMultipart = Multipart<GeneralPart>;
/// `multipart/form-data`.
pub type FormDataMultipart = Multipart<FormDataPart>;
/// `multipart/byteranges`.
pub type ByteRangesMultipart = Multipart<ByteRangesPart>;

impl<P: Send + 'static> Multipart<P> {
    pub fn new<S>(media_type: MediaType, parts: S) -> Self
    where
        S: Stream<Item = Result<P, MultipartError>> + Send + 'static,
    {
        Self {
            media_type,
            parts: PartStream::new(parts),
        }
    }

    pub fn from_parts(media_type: MediaType, parts: Vec<P>) -> Self {
        Self {
            media_type,
            parts: PartStream::from_parts(parts),
        }
    }
}

impl<P> Multipart<P> {
    pub fn media_type(&self) -> &MediaType {
        &self.media_type
    }

    /// The part sequence, for reading parts one by one.
    pub fn parts(&mut self) -> &mut PartStream<P> {
        &mut self.parts
    }

    pub fn into_parts(self) -> PartStream<P> {
        self.parts
    }

    pub(crate) fn into_inner(self) -> (MediaType, PartStream<P>) {
        (self.media_type, self.parts)
    }
}

impl<P> Multipart<P>
where
    P: BodyPart<Entity = BodyPartEntity> + Send + 'static,
{
    /// Type the output of a boundary tokenizer.
    ///
    /// Variant fields are derived as each part is pulled; a part whose
    /// headers do not yield them fails the sequence at that point.
    pub fn from_raw_parts<S>(media_type: MediaType, raw: S) -> Self
    where
        S: Stream<Item = Result<(HeaderSet, BodyPartEntity), MultipartError>> + Send + 'static,
    {
        let parts = raw.map(|item| item.and_then(|(headers, entity)| P::from_raw(headers, entity)));
        Self::new(media_type, parts)
    }
}

impl Multipart<GeneralPart> {
    /// `multipart/mixed` over the given parts.
    pub fn mixed(parts: Vec<GeneralPart>) -> Self {
        Self::from_parts(MediaType::mixed(), parts)
    }
}

impl Multipart<FormDataPart> {
    pub fn form_data(parts: Vec<FormDataPart>) -> Self {
        Self::from_parts(MediaType::form_data(), parts)
    }
}

impl Multipart<ByteRangesPart> {
    pub fn byte_ranges(parts: Vec<ByteRangesPart>) -> Self {
        Self::from_parts(MediaType::byteranges(), parts)
    }
}
