use crate::base::error::MultipartError;
use crate::http::contentdisposition::ContentDisposition;
use crate::http::contentrange::{ContentRange, RangeUnit};
use bytes::{BufMut, BytesMut};
use http::header::{HeaderName, HeaderValue, CONTENT_DISPOSITION, CONTENT_RANGE};
use http::HeaderMap;
use std::str::FromStr;
use std::sync::OnceLock;

type Memo<T> = OnceLock<Result<Option<T>, MultipartError>>;

/// Ordered header list of a body part.
///
/// Names compare case-insensitively, duplicates are kept in insertion order
/// and nothing is ever merged. Content-Disposition and Content-Range are
/// parsed lazily on first access and the result (including a parse error) is
/// memoized.
#[derive(Debug, Clone, Default)]
pub struct HeaderSet {
    headers: Vec<(HeaderName, HeaderValue)>,
    disposition: Memo<ContentDisposition>,
    range: Memo<(RangeUnit, ContentRange)>,
}

impl PartialEq for HeaderSet {
    fn eq(&self, other: &Self) -> bool {
        self.headers == other.headers
    }
}

impl Eq for HeaderSet {}

impl HeaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(name, value)` string pairs.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, MultipartError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut set = Self::new();
        for (name, value) in pairs {
            set.append(name, value)?;
        }
        Ok(set)
    }

    /// Append a header, keeping any existing entries with the same name.
    ///
    /// Values with leading or trailing whitespace are rejected since that
    /// whitespace does not survive a trip through the wire format.
    pub fn append(&mut self, name: &str, value: &str) -> Result<(), MultipartError> {
        let name = HeaderName::from_str(name)?;
        if value.trim_matches([' ', '\t']).len() != value.len() {
            return Err(MultipartError::InvalidHeader);
        }
        let value = HeaderValue::from_str(value)?;
        self.append_typed(name, value);
        Ok(())
    }

    /// Append an already validated header. Surrounding whitespace in `value`
    /// is dropped by decoding.
    pub fn append_typed(&mut self, name: HeaderName, value: HeaderValue) {
        if name == CONTENT_DISPOSITION {
            self.disposition = OnceLock::new();
        } else if name == CONTENT_RANGE {
            self.range = OnceLock::new();
        }
        self.headers.push((name, value));
    }

    /// Builder form of [`append`](Self::append).
    pub fn with(mut self, name: &str, value: &str) -> Result<Self, MultipartError> {
        self.append(name, value)?;
        Ok(self)
    }

    /// First value for `name` (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.get_all(name).next()
    }

    /// Every value for `name`, in insertion order.
    pub fn get_all<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a HeaderValue> + 'a {
        let target = HeaderName::from_str(name).ok();
        self.headers
            .iter()
            .filter(move |(n, _)| Some(n) == target.as_ref())
            .map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Copy of this set without any header called `name`.
    pub fn without(&self, name: &HeaderName) -> HeaderSet {
        let mut out = HeaderSet::new();
        for (n, v) in self.iter() {
            if n != name {
                out.append_typed(n.clone(), v.clone());
            }
        }
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &HeaderValue)> {
        self.headers.iter().map(|(n, v)| (n, v))
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Parsed `Content-Disposition`, if present.
    ///
    /// Fails if the header is malformed or occurs more than once.
    pub fn content_disposition(&self) -> Result<Option<&ContentDisposition>, MultipartError> {
        let parsed = self.disposition.get_or_init(|| {
            let value = match self.single(&CONTENT_DISPOSITION) {
                Ok(Some(value)) => value,
                Ok(None) => return Ok(None),
                Err(()) => return Err(MultipartError::MultipleContentDisposition),
            };
            let text = std::str::from_utf8(value.as_bytes())
                .map_err(|_| MultipartError::InvalidContentDisposition("value is not UTF-8".into()))?;
            ContentDisposition::parse(text).map(Some)
        });
        match parsed {
            Ok(disposition) => Ok(disposition.as_ref()),
            Err(e) => Err(e.clone()),
        }
    }

    /// Parsed `Content-Range`, if present.
    pub fn content_range(&self) -> Result<Option<&ContentRange>, MultipartError> {
        Ok(self.range_header()?.map(|(_, range)| range))
    }

    /// Unit token of the `Content-Range` header, if present.
    pub fn range_unit(&self) -> Result<Option<&RangeUnit>, MultipartError> {
        Ok(self.range_header()?.map(|(unit, _)| unit))
    }

    fn range_header(&self) -> Result<Option<&(RangeUnit, ContentRange)>, MultipartError> {
        let parsed = self.range.get_or_init(|| {
            let value = match self.single(&CONTENT_RANGE) {
                Ok(Some(value)) => value,
                Ok(None) => return Ok(None),
                Err(()) => return Err(MultipartError::MultipleContentRange),
            };
            let text = std::str::from_utf8(value.as_bytes())
                .map_err(|_| MultipartError::InvalidContentRange("value is not UTF-8".into()))?;
            ContentRange::parse_header(text).map(Some)
        });
        match parsed {
            Ok(range) => Ok(range.as_ref()),
            Err(e) => Err(e.clone()),
        }
    }

    fn single(&self, name: &HeaderName) -> Result<Option<&HeaderValue>, ()> {
        let mut values = self.headers.iter().filter(|(n, _)| n == name);
        match (values.next(), values.next()) {
            (None, _) => Ok(None),
            (Some((_, v)), None) => Ok(Some(v)),
            (Some(_), Some(_)) => Err(()),
        }
    }

    /// Write `Name: value\r\n` lines, with names in title case.
    pub fn render(&self, out: &mut BytesMut) {
        for (name, value) in &self.headers {
            out.put_slice(title_case(name.as_str()).as_bytes());
            out.put_slice(b": ");
            out.put_slice(value.as_bytes());
            out.put_slice(b"\r\n");
        }
    }

    /// Number of bytes [`render`](Self::render) writes.
    pub fn rendered_len(&self) -> usize {
        self.headers
            .iter()
            .map(|(n, v)| n.as_str().len() + 2 + v.len() + 2)
            .sum()
    }

    /// Convert to a standard `http::HeaderMap`, keeping duplicates.
    pub fn to_header_map(&self) -> HeaderMap {
        let mut map = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            map.append(name.clone(), value.clone());
        }
        map
    }
}

/// Convert to title case (e.g., "content-type" -> "Content-Type").
fn title_case(name: &str) -> String {
    name.split('-')
        .map(|word| {
            let mut chars = word.chars();
            let mut out = String::with_capacity(word.len());
            if let Some(first) = chars.next() {
                out.push(first.to_ascii_uppercase());
                out.extend(chars.map(|c| c.to_ascii_lowercase()));
            }
            out
        })
        .collect::<Vec<_>>()
        .join("-")
}
