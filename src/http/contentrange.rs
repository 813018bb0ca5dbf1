//! `Content-Range` header model (RFC 7233 section 4.2).

use crate::base::error::MultipartError;
use crate::http::params;
use std::fmt;

/// Range unit token. Only `bytes` is given structure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum RangeUnit {
    #[default]
    Bytes,
    Other(String),
}

impl RangeUnit {
    pub fn as_str(&self) -> &str {
        match self {
            RangeUnit::Bytes => "bytes",
            RangeUnit::Other(s) => s,
        }
    }

    pub fn parse(token: &str) -> Result<Self, MultipartError> {
        if !params::is_token(token) {
            return Err(MultipartError::InvalidContentRange(format!(
                "invalid range unit {token:?}"
            )));
        }
        if token.eq_ignore_ascii_case("bytes") {
            Ok(RangeUnit::Bytes)
        } else {
            Ok(RangeUnit::Other(token.to_string()))
        }
    }
}

impl fmt::Display for RangeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The range part of a `Content-Range` value (everything after the unit).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContentRange {
    /// `first-last/length` or `first-last/*`.
    Default {
        first: u64,
        last: u64,
        instance_length: Option<u64>,
    },
    /// `*/length`, used with 416 responses.
    Unsatisfiable { instance_length: u64 },
    /// Verbatim range spec for non-byte units.
    Other(String),
}

impl ContentRange {
    /// A satisfiable byte range. `last` is inclusive.
    pub fn new(first: u64, last: u64, instance_length: Option<u64>) -> Result<Self, MultipartError> {
        if first > last {
            return Err(MultipartError::InvalidContentRange(format!(
                "first byte {first} is after last byte {last}"
            )));
        }
        if let Some(length) = instance_length {
            if last >= length {
                return Err(MultipartError::InvalidContentRange(format!(
                    "last byte {last} is outside a {length} byte resource"
                )));
            }
        }
        Ok(ContentRange::Default {
            first,
            last,
            instance_length,
        })
    }

    pub fn unsatisfiable(instance_length: u64) -> Self {
        ContentRange::Unsatisfiable { instance_length }
    }

    /// Number of bytes covered, for satisfiable ranges.
    pub fn length(&self) -> Option<u64> {
        match self {
            ContentRange::Default { first, last, .. } => Some(last - first + 1),
            _ => None,
        }
    }

    pub fn is_satisfiable(&self) -> bool {
        !matches!(self, ContentRange::Unsatisfiable { .. })
    }

    pub fn instance_length(&self) -> Option<u64> {
        match self {
            ContentRange::Default {
                instance_length, ..
            } => *instance_length,
            ContentRange::Unsatisfiable { instance_length } => Some(*instance_length),
            ContentRange::Other(_) => None,
        }
    }

    /// Parse a full header value such as `bytes 0-499/1234`.
    pub fn parse_header(value: &str) -> Result<(RangeUnit, ContentRange), MultipartError> {
        let value = value.trim();
        let (unit, spec) = value.split_once(' ').ok_or_else(|| {
            MultipartError::InvalidContentRange(format!("missing range unit in {value:?}"))
        })?;
        let unit = RangeUnit::parse(unit)?;
        let spec = spec.trim_start();
        let range = match unit {
            RangeUnit::Bytes => Self::parse_bytes(spec)?,
            RangeUnit::Other(_) => {
                if spec.is_empty() {
                    return Err(MultipartError::InvalidContentRange(format!(
                        "missing range in {value:?}"
                    )));
                }
                ContentRange::Other(spec.to_string())
            }
        };
        Ok((unit, range))
    }

    fn parse_bytes(spec: &str) -> Result<Self, MultipartError> {
        let invalid = || MultipartError::InvalidContentRange(format!("malformed byte range {spec:?}"));

        let (range, length) = spec.split_once('/').ok_or_else(invalid)?;
        let length = match length {
            "*" => None,
            digits => Some(parse_u64(digits).ok_or_else(invalid)?),
        };

        if range == "*" {
            return length
                .map(ContentRange::unsatisfiable)
                .ok_or_else(invalid);
        }

        let (first, last) = range.split_once('-').ok_or_else(invalid)?;
        let first = parse_u64(first).ok_or_else(invalid)?;
        let last = parse_u64(last).ok_or_else(invalid)?;
        ContentRange::new(first, last, length)
    }

    /// Render as a header value with the given unit.
    pub fn to_header_value(&self, unit: &RangeUnit) -> String {
        format!("{} {}", unit, self)
    }
}

fn parse_u64(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl fmt::Display for ContentRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentRange::Default {
                first,
                last,
                instance_length: Some(length),
            } => write!(f, "{first}-{last}/{length}"),
            ContentRange::Default {
                first,
                last,
                instance_length: None,
            } => write!(f, "{first}-{last}/*"),
            ContentRange::Unsatisfiable { instance_length } => write!(f, "*/{instance_length}"),
            ContentRange::Other(s) => f.write_str(s),
        }
    }
}
