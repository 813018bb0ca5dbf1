//! `multipart/*` media types.

use crate::base::error::MultipartError;
use crate::http::params::{self, Cursor};
use http::HeaderValue;
use std::fmt;

/// A `multipart/<subtype>` media type without its `boundary` parameter.
///
/// The boundary belongs to a concrete wire entity, not to the model, so it
/// is split off when parsing and supplied again when rendering.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaType {
    subtype: String,
    params: Vec<(String, String)>,
}

impl MediaType {
    pub const MIXED: &'static str = "mixed";
    pub const ALTERNATIVE: &'static str = "alternative";
    pub const RELATED: &'static str = "related";
    pub const FORM_DATA: &'static str = "form-data";
    pub const BYTERANGES: &'static str = "byteranges";

    /// Create `multipart/<subtype>`. The subtype must be a token.
    pub fn new(subtype: &str) -> Result<Self, MultipartError> {
        if !params::is_token(subtype) {
            return Err(MultipartError::InvalidMediaType(format!(
                "invalid subtype {subtype:?}"
            )));
        }
        Ok(Self::known(subtype))
    }

    fn known(subtype: &str) -> Self {
        Self {
            subtype: subtype.to_ascii_lowercase(),
            params: Vec::new(),
        }
    }

    pub fn mixed() -> Self {
        Self::known(Self::MIXED)
    }

    pub fn alternative() -> Self {
        Self::known(Self::ALTERNATIVE)
    }

    pub fn related() -> Self {
        Self::known(Self::RELATED)
    }

    pub fn form_data() -> Self {
        Self::known(Self::FORM_DATA)
    }

    pub fn byteranges() -> Self {
        Self::known(Self::BYTERANGES)
    }

    /// Add a parameter other than `boundary`.
    pub fn with_param(
        mut self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<Self, MultipartError> {
        if !params::is_token(name) || name.eq_ignore_ascii_case("boundary") {
            return Err(MultipartError::InvalidMediaType(format!(
                "invalid parameter name {name:?}"
            )));
        }
        let name = name.to_ascii_lowercase();
        let value = value.into();
        if let Some((_, v)) = self.params.iter_mut().find(|(n, _)| *n == name) {
            *v = value;
        } else {
            self.params.push((name, value));
        }
        Ok(self)
    }

    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn is_form_data(&self) -> bool {
        self.subtype == Self::FORM_DATA
    }

    pub fn is_byteranges(&self) -> bool {
        self.subtype == Self::BYTERANGES
    }

    /// Parse a `Content-Type` value, returning the media type and its
    /// boundary parameter if present.
    pub fn parse(value: &str) -> Result<(Self, Option<String>), MultipartError> {
        let invalid = |reason: String| MultipartError::InvalidMediaType(format!("{reason} in {value:?}"));

        let mut cursor = Cursor::new(value);
        cursor.skip_ows();
        let main = cursor
            .token()
            .ok_or_else(|| invalid("missing type".to_string()))?;
        if !cursor.eat('/') {
            return Err(invalid("missing '/'".to_string()));
        }
        let subtype = cursor
            .token()
            .ok_or_else(|| invalid("missing subtype".to_string()))?;
        if !main.eq_ignore_ascii_case("multipart") {
            return Err(MultipartError::NotMultipart(format!("{main}/{subtype}")));
        }

        let mut boundary = None;
        let mut media_type = Self::known(subtype);
        for (name, param) in params::parse_params(&mut cursor).map_err(invalid)? {
            if name == "boundary" {
                boundary = Some(param);
            } else {
                media_type.params.push((name, param));
            }
        }
        Ok((media_type, boundary))
    }

    /// Render `multipart/<subtype>; ...; boundary=<boundary>` as a header value.
    pub fn to_header_value(&self, boundary: &str) -> Result<HeaderValue, MultipartError> {
        let rendered = format!("{}; boundary={}", self, params::token_or_quote(boundary));
        HeaderValue::from_str(&rendered).map_err(MultipartError::from)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "multipart/{}", self.subtype)?;
        for (name, value) in &self.params {
            write!(f, "; {}={}", name, params::token_or_quote(value))?;
        }
        Ok(())
    }
}
