use crate::http::mediatype::MediaType;
use crate::multipart::bodypart::{GeneralPart, StrictPart};
use crate::multipart::byteranges::ByteRangesPart;
use crate::multipart::formdata::FormDataPart;
use crate::multipart::streaming::Multipart;
use bytes::Bytes;

/// A fully buffered multipart entity.
///
/// Parts are held in memory in their original order and can be read any
/// number of times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrictMultipart<P> {
    media_type: MediaType,
    parts: Vec<P>,
}

pub type StrictGeneralMultipart = StrictMultipart<GeneralPart<Bytes>>;
pub type StrictFormDataMultipart = StrictMultipart<FormDataPart<Bytes>>;
pub type StrictByteRangesMultipart = StrictMultipart<ByteRangesPart<Bytes>>;

impl<P> StrictMultipart<P> {
    pub fn new(media_type: MediaType, parts: Vec<P>) -> Self {
        Self { media_type, parts }
    }

    pub fn media_type(&self) -> &MediaType {
        &self.media_type
    }

    /// All parts, in order.
    pub fn parts(&self) -> &[P] {
        &self.parts
    }

    pub fn iter(&self) -> std::slice::Iter<'_, P> {
        self.parts.iter()
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn into_parts(self) -> Vec<P> {
        self.parts
    }
}

impl<P: StrictPart> StrictMultipart<P> {
    /// Already strict; returns a copy.
    pub fn to_strict(&self) -> Self {
        self.clone()
    }

    /// A streaming view whose part entities are already buffered.
    pub fn to_streamed(&self) -> Multipart<P::Streamed> {
        let parts = self.parts.iter().cloned().map(StrictPart::to_streamed).collect();
        Multipart::from_parts(self.media_type.clone(), parts)
    }
}

impl<'a, P> IntoIterator for &'a StrictMultipart<P> {
    type Item = &'a P;
    type IntoIter = std::slice::Iter<'a, P>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts.iter()
    }
}

impl StrictMultipart<FormDataPart<Bytes>> {
    /// A form of `text/plain` fields.
    pub fn form_data_fields<'a, I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let parts = fields
            .into_iter()
            .map(|(name, value)| FormDataPart::text(name, value))
            .collect();
        Self::new(MediaType::form_data(), parts)
    }
}
