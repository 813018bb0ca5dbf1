//! `Content-Disposition` header model (RFC 6266, RFC 7578 section 4.2).

use crate::base::error::MultipartError;
use crate::http::params::{self, Cursor};
use std::fmt;

/// Disposition type token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DispositionType {
    Inline,
    Attachment,
    FormData,
    /// Extension token, stored lowercased.
    Other(String),
}

impl DispositionType {
    pub fn as_str(&self) -> &str {
        match self {
            DispositionType::Inline => "inline",
            DispositionType::Attachment => "attachment",
            DispositionType::FormData => "form-data",
            DispositionType::Other(s) => s,
        }
    }

    fn from_token(token: &str) -> Self {
        match token.to_ascii_lowercase().as_str() {
            "inline" => DispositionType::Inline,
            "attachment" => DispositionType::Attachment,
            "form-data" => DispositionType::FormData,
            other => DispositionType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for DispositionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed `Content-Disposition` value: a type plus parameters with unique,
/// lowercased names in their original order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDisposition {
    disposition_type: DispositionType,
    params: Vec<(String, String)>,
}

impl ContentDisposition {
    pub fn new(disposition_type: DispositionType) -> Self {
        Self {
            disposition_type,
            params: Vec::new(),
        }
    }

    /// `form-data; name="<name>"`.
    pub fn form_data(name: impl Into<String>) -> Self {
        Self {
            disposition_type: DispositionType::FormData,
            params: vec![("name".to_string(), name.into())],
        }
    }

    /// Set a parameter, replacing any existing value for the same name.
    ///
    /// Fails if `name` is not a token.
    pub fn with_param(
        mut self,
        name: impl AsRef<str>,
        value: impl Into<String>,
    ) -> Result<Self, MultipartError> {
        let name = param_name(name.as_ref())?;
        let value = value.into();
        if let Some((_, v)) = self.params.iter_mut().find(|(n, _)| *n == name) {
            *v = value;
        } else {
            self.params.push((name, value));
        }
        Ok(self)
    }

    /// Assemble from parameters whose names are already lowercased tokens.
    pub(crate) fn from_parts(
        disposition_type: DispositionType,
        params: Vec<(String, String)>,
    ) -> Self {
        Self {
            disposition_type,
            params,
        }
    }

    pub fn parse(value: &str) -> Result<Self, MultipartError> {
        let invalid = |reason: String| {
            MultipartError::InvalidContentDisposition(format!("{reason} in {value:?}"))
        };

        let mut cursor = Cursor::new(value);
        cursor.skip_ows();
        let token = cursor
            .token()
            .ok_or_else(|| invalid("missing disposition type".to_string()))?;
        let params = params::parse_params(&mut cursor).map_err(invalid)?;

        Ok(Self {
            disposition_type: DispositionType::from_token(token),
            params,
        })
    }

    pub fn disposition_type(&self) -> &DispositionType {
        &self.disposition_type
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Case-insensitive parameter lookup.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn name(&self) -> Option<&str> {
        self.param("name")
    }

    pub fn filename(&self) -> Option<&str> {
        self.param("filename")
    }

    /// Parameters other than `name` and `filename`.
    pub fn additional_params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params
            .iter()
            .filter(|(n, _)| n != "name" && n != "filename")
            .map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

/// Lowercased parameter name, or an error if it is not a token.
pub(crate) fn param_name(name: &str) -> Result<String, MultipartError> {
    if !params::is_token(name) {
        return Err(MultipartError::InvalidContentDisposition(format!(
            "parameter name {name:?} is not a token"
        )));
    }
    Ok(name.to_ascii_lowercase())
}

impl fmt::Display for ContentDisposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.disposition_type.as_str())?;
        for (name, value) in &self.params {
            write!(f, "; {}={}", name, params::quote(value))?;
        }
        Ok(())
    }
}
