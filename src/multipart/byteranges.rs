//! `multipart/byteranges` parts (RFC 7233 appendix A).

use crate::base::error::MultipartError;
use crate::http::contentrange::{ContentRange, RangeUnit};
use crate::http::entity::BodyPartEntity;
use crate::http::headerset::HeaderSet;
use crate::multipart::bodypart::{impl_part_conversions, BodyPart};
use http::header::{HeaderValue, CONTENT_RANGE};
use std::borrow::Cow;

/// One range of a partial response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteRangesPart<E = BodyPartEntity> {
    content_range: ContentRange,
    range_unit: RangeUnit,
    header_value: HeaderValue,
    additional_headers: HeaderSet,
    entity: E,
}

impl<E> ByteRangesPart<E> {
    /// A part for `content_range` in `bytes`.
    pub fn new(content_range: ContentRange, entity: impl Into<E>) -> Result<Self, MultipartError> {
        Self::with_unit(RangeUnit::Bytes, content_range, entity)
    }

    /// A part with an explicit range unit. Fails unless the two render as a
    /// `Content-Range` value that parses back to the same unit and range.
    pub fn with_unit(
        range_unit: RangeUnit,
        content_range: ContentRange,
        entity: impl Into<E>,
    ) -> Result<Self, MultipartError> {
        let header_value = render_range(&range_unit, &content_range)?;
        Ok(Self {
            content_range,
            range_unit,
            header_value,
            additional_headers: HeaderSet::new(),
            entity: entity.into(),
        })
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, MultipartError> {
        self.additional_headers.append(name, value)?;
        Ok(self)
    }

    pub fn content_range(&self) -> &ContentRange {
        &self.content_range
    }

    pub fn range_unit(&self) -> &RangeUnit {
        &self.range_unit
    }

    /// Headers other than the synthesized `Content-Range`.
    pub fn additional_headers(&self) -> &HeaderSet {
        &self.additional_headers
    }

    /// The `Content-Range` header value, e.g. `bytes 0-499/1234`.
    pub fn content_range_header(&self) -> String {
        self.content_range.to_header_value(&self.range_unit)
    }

    pub fn replace_entity<F>(self, entity: F) -> (ByteRangesPart<F>, E) {
        (
            ByteRangesPart {
                content_range: self.content_range,
                range_unit: self.range_unit,
                header_value: self.header_value,
                additional_headers: self.additional_headers,
                entity,
            },
            self.entity,
        )
    }
}

fn render_range(unit: &RangeUnit, range: &ContentRange) -> Result<HeaderValue, MultipartError> {
    let text = range.to_header_value(unit);
    let invalid = || MultipartError::InvalidContentRange(format!("{text:?} does not round-trip"));
    match ContentRange::parse_header(&text) {
        Ok((u, r)) if &u == unit && &r == range => {}
        _ => return Err(invalid()),
    }
    HeaderValue::from_str(&text).map_err(|_| invalid())
}

impl<E> BodyPart for ByteRangesPart<E> {
    type Entity = E;

    fn from_raw(headers: HeaderSet, entity: E) -> Result<Self, MultipartError> {
        let range_unit = headers
            .range_unit()?
            .ok_or(MultipartError::MissingContentRange)?
            .clone();
        let content_range = headers
            .content_range()?
            .ok_or(MultipartError::MissingContentRange)?
            .clone();
        let header_value = render_range(&range_unit, &content_range)?;
        Ok(Self {
            content_range,
            range_unit,
            header_value,
            additional_headers: headers.without(&CONTENT_RANGE),
            entity,
        })
    }

    fn headers(&self) -> Cow<'_, HeaderSet> {
        if self.additional_headers.contains(CONTENT_RANGE.as_str()) {
            return Cow::Borrowed(&self.additional_headers);
        }
        let mut headers = HeaderSet::new();
        headers.append_typed(CONTENT_RANGE, self.header_value.clone());
        for (name, value) in self.additional_headers.iter() {
            headers.append_typed(name.clone(), value.clone());
        }
        Cow::Owned(headers)
    }

    fn entity(&self) -> &E {
        &self.entity
    }

    fn into_entity(self) -> E {
        self.entity
    }
}

impl_part_conversions!(ByteRangesPart);
