//! Token and `; name=value` parameter grammar shared by the
//! Content-Disposition and Content-Type parsers (RFC 7230 section 3.2.6).

use std::borrow::Cow;

/// RFC 7230 `tchar`.
pub(crate) fn is_tchar(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '!' | '#' | '$' | '%' | '&' | '\'' | '*' | '+' | '-' | '.' | '^' | '_' | '`' | '|' | '~'
        )
}

pub(crate) fn is_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_tchar)
}

/// Minimal cursor over a header value.
pub(crate) struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.rest().is_empty()
    }

    pub(crate) fn skip_ows(&mut self) {
        let rest = self.rest();
        let trimmed = rest.trim_start_matches([' ', '\t']);
        self.pos += rest.len() - trimmed.len();
    }

    pub(crate) fn eat(&mut self, c: char) -> bool {
        if self.rest().starts_with(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    pub(crate) fn token(&mut self) -> Option<&'a str> {
        let rest = self.rest();
        let len = rest.find(|c: char| !is_tchar(c)).unwrap_or(rest.len());
        if len == 0 {
            return None;
        }
        self.pos += len;
        Some(&rest[..len])
    }

    /// Parse a quoted-string, returning the unescaped content.
    pub(crate) fn quoted_string(&mut self) -> Option<String> {
        if !self.eat('"') {
            return None;
        }
        let mut out = String::new();
        let mut chars = self.rest().char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                '"' => {
                    self.pos += i + 1;
                    return Some(out);
                }
                '\\' => {
                    let (_, escaped) = chars.next()?;
                    out.push(escaped);
                }
                '\r' | '\n' => return None,
                _ => out.push(c),
            }
        }
        None
    }

    /// Parse `token` or `quoted-string`.
    pub(crate) fn value(&mut self) -> Option<String> {
        if self.rest().starts_with('"') {
            self.quoted_string()
        } else {
            self.token().map(str::to_string)
        }
    }
}

/// Parse `*( OWS ";" OWS name "=" value )` until the end of input.
///
/// Parameter names are lowercased. Duplicate names are rejected.
pub(crate) fn parse_params(cursor: &mut Cursor<'_>) -> Result<Vec<(String, String)>, String> {
    let mut params: Vec<(String, String)> = Vec::new();
    loop {
        cursor.skip_ows();
        if cursor.is_empty() {
            return Ok(params);
        }
        if !cursor.eat(';') {
            return Err("expected ';' between parameters".to_string());
        }
        cursor.skip_ows();
        // Tolerate a trailing ';'.
        if cursor.is_empty() {
            return Ok(params);
        }
        let name = cursor
            .token()
            .ok_or_else(|| "expected parameter name".to_string())?
            .to_ascii_lowercase();
        cursor.skip_ows();
        if !cursor.eat('=') {
            return Err(format!("parameter {name} has no value"));
        }
        cursor.skip_ows();
        let value = cursor
            .value()
            .ok_or_else(|| format!("parameter {name} has a malformed value"))?;
        if params.iter().any(|(n, _)| *n == name) {
            return Err(format!("duplicate parameter {name}"));
        }
        params.push((name, value));
    }
}

/// Render a parameter value as a quoted-string.
///
/// CR and LF become `\r` and `\n`; other control characters except tab are
/// dropped, so the result is always a valid header value.
pub(crate) fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push(c),
            c if c.is_ascii_control() => {}
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Render a parameter value as a token when possible, quoting otherwise.
pub(crate) fn token_or_quote(value: &str) -> Cow<'_, str> {
    if is_token(value) {
        Cow::Borrowed(value)
    } else {
        Cow::Owned(quote(value))
    }
}
