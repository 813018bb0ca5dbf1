//! `multipart/form-data` parts (RFC 7578).

use crate::base::context::IoResultExt;
use crate::base::error::MultipartError;
use crate::http::contentdisposition::{param_name, ContentDisposition, DispositionType};
use crate::http::entity::BodyPartEntity;
use crate::http::headerset::HeaderSet;
use crate::multipart::bodypart::{impl_part_conversions, BodyPart};
use bytes::{Bytes, BytesMut};
use http::header::{HeaderValue, CONTENT_DISPOSITION};
use std::borrow::Cow;
use std::path::Path;
use tokio::io::AsyncReadExt;

/// A named form field.
///
/// `name`, `filename` and the remaining disposition parameters are the
/// decomposed `Content-Disposition` header; `additional_headers` holds every
/// other header. The wire header set is rebuilt from these on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormDataPart<E = BodyPartEntity> {
    name: String,
    filename: Option<String>,
    params: Vec<(String, String)>,
    additional_headers: HeaderSet,
    entity: E,
}

impl<E> FormDataPart<E> {
    pub fn new(name: impl Into<String>, entity: impl Into<E>) -> Self {
        Self {
            name: name.into(),
            filename: None,
            params: Vec::new(),
            additional_headers: HeaderSet::new(),
            entity: entity.into(),
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Add a disposition parameter. `name` and `filename` update the
    /// corresponding fields. Fails if `name` is not a token.
    pub fn with_disposition_param(
        mut self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<Self, MultipartError> {
        let name = param_name(name)?;
        let value = value.into();
        match name.as_str() {
            "name" => self.name = value,
            "filename" => self.filename = Some(value),
            _ => match self.params.iter_mut().find(|(n, _)| *n == name) {
                Some((_, v)) => *v = value,
                None => self.params.push((name, value)),
            },
        }
        Ok(self)
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, MultipartError> {
        self.additional_headers.append(name, value)?;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Disposition parameters other than `name` and `filename`.
    pub fn additional_disposition_params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Headers other than the synthesized `Content-Disposition`.
    pub fn additional_headers(&self) -> &HeaderSet {
        &self.additional_headers
    }

    /// The `Content-Disposition` built from name, filename and parameters.
    pub fn disposition(&self) -> ContentDisposition {
        let mut params = Vec::with_capacity(self.params.len() + 2);
        params.push(("name".to_string(), self.name.clone()));
        if let Some(filename) = &self.filename {
            params.push(("filename".to_string(), filename.clone()));
        }
        params.extend(self.params.iter().cloned());
        ContentDisposition::from_parts(DispositionType::FormData, params)
    }

    pub fn replace_entity<F>(self, entity: F) -> (FormDataPart<F>, E) {
        (
            FormDataPart {
                name: self.name,
                filename: self.filename,
                params: self.params,
                additional_headers: self.additional_headers,
                entity,
            },
            self.entity,
        )
    }

    fn overrides_disposition(&self) -> bool {
        self.additional_headers.contains(CONTENT_DISPOSITION.as_str())
    }
}

impl FormDataPart<Bytes> {
    /// A `text/plain; charset=utf-8` field.
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut part = Self::new(name, Bytes::from(value.into()));
        part.additional_headers.append_typed(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        part
    }
}

impl FormDataPart<BodyPartEntity> {
    /// Stream a file from disk in `chunk_size` pieces.
    ///
    /// The file name becomes the `filename` parameter and the file size the
    /// declared entity length.
    pub async fn from_path(
        name: impl Into<String>,
        path: impl AsRef<Path>,
        chunk_size: usize,
    ) -> Result<Self, MultipartError> {
        let path = path.as_ref();
        if chunk_size == 0 {
            return Err(MultipartError::InvalidConfig(
                "chunk_size must be greater than zero".into(),
            ));
        }
        let file = tokio::fs::File::open(path).await.file_context(path)?;
        let size = file.metadata().await.file_context(path)?.len();
        let owned_path = path.to_path_buf();

        let chunks = futures::stream::try_unfold(file, move |mut file| {
            let path = owned_path.clone();
            async move {
                let mut buf = BytesMut::with_capacity(chunk_size);
                let n = file.read_buf(&mut buf).await.file_context(&path)?;
                if n == 0 {
                    return Ok::<_, MultipartError>(None);
                }
                Ok(Some((buf.freeze(), file)))
            }
        });

        tracing::debug!(path = %path.display(), size, "streaming form-data part from file");

        let mut part = Self::new(name, BodyPartEntity::streamed(chunks, Some(size)));
        if let Some(filename) = path.file_name() {
            part.filename = Some(filename.to_string_lossy().into_owned());
        }
        Ok(part)
    }
}

impl<E> BodyPart for FormDataPart<E> {
    type Entity = E;

    fn from_raw(headers: HeaderSet, entity: E) -> Result<Self, MultipartError> {
        let cd = headers
            .content_disposition()?
            .ok_or(MultipartError::MissingContentDisposition)?;
        if cd.disposition_type() != &DispositionType::FormData {
            return Err(MultipartError::UnexpectedDispositionType(
                cd.disposition_type().to_string(),
            ));
        }
        let name = cd
            .name()
            .ok_or(MultipartError::MissingFormDataName)?
            .to_string();
        let filename = cd.filename().map(str::to_string);
        let params = cd
            .additional_params()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect();
        Ok(Self {
            name,
            filename,
            params,
            additional_headers: headers.without(&CONTENT_DISPOSITION),
            entity,
        })
    }

    fn headers(&self) -> Cow<'_, HeaderSet> {
        if self.overrides_disposition() {
            return Cow::Borrowed(&self.additional_headers);
        }
        let mut headers = HeaderSet::new();
        // Parameter names are tokens and quoted values carry no control
        // characters, so the rendered disposition is always a valid value.
        let value = HeaderValue::from_str(&self.disposition().to_string())
            .expect("form-data disposition should be a valid header value");
        headers.append_typed(CONTENT_DISPOSITION, value);
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

    fn content_disposition(&self) -> Result<Option<ContentDisposition>, MultipartError> {
        if self.overrides_disposition() {
            return Ok(self.additional_headers.content_disposition()?.cloned());
        }
        Ok(Some(self.disposition()))
    }
}

impl_part_conversions!(FormDataPart);
