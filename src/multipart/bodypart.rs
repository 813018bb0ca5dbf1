//! Body part abstraction and the general (`multipart/*`) part.

use crate::base::error::MultipartError;
use crate::http::contentdisposition::{ContentDisposition, DispositionType};
use crate::http::entity::BodyPartEntity;
use crate::http::headerset::HeaderSet;
use bytes::Bytes;
use std::borrow::Cow;

/// Common surface of every part variant.
///
/// `Entity` is [`BodyPartEntity`] for parts that may still be streaming and
/// [`Bytes`] for strict parts.
pub trait BodyPart: Sized {
    type Entity;

    /// Build a part from tokenizer output, deriving variant fields from the
    /// headers. Fails with a protocol error if they cannot be derived.
    fn from_raw(headers: HeaderSet, entity: Self::Entity) -> Result<Self, MultipartError>;

    /// Full header set as it goes on the wire, including synthesized
    /// Content-Disposition or Content-Range headers.
    fn headers(&self) -> Cow<'_, HeaderSet>;

    fn entity(&self) -> &Self::Entity;

    fn into_entity(self) -> Self::Entity;

    fn content_disposition(&self) -> Result<Option<ContentDisposition>, MultipartError> {
        Ok(self.headers().content_disposition()?.cloned())
    }

    fn disposition_type(&self) -> Result<Option<DispositionType>, MultipartError> {
        Ok(self
            .content_disposition()?
            .map(|cd| cd.disposition_type().clone()))
    }

    /// All disposition parameters, empty when there is no disposition.
    fn disposition_params(&self) -> Result<Vec<(String, String)>, MultipartError> {
        Ok(self
            .content_disposition()?
            .map(|cd| cd.params().to_vec())
            .unwrap_or_default())
    }
}

/// A part whose entity may still be streaming.
///
/// Materialization splits the part into a metadata shell and its entity,
/// buffers the entity, then joins the shell with the buffered bytes.
pub trait StreamedPart: BodyPart<Entity = BodyPartEntity> + Send + 'static {
    type Strict: StrictPart;
    type Shell: Send;

    fn split(self) -> (Self::Shell, BodyPartEntity);

    fn join(shell: Self::Shell, data: Bytes) -> Self::Strict;
}

/// A fully buffered part.
pub trait StrictPart: BodyPart<Entity = Bytes> + Clone {
    type Streamed: StreamedPart;

    /// View as a part with a strict [`BodyPartEntity`].
    fn to_streamed(self) -> Self::Streamed;
}

macro_rules! impl_part_conversions {
    ($part:ident) => {
        impl $crate::multipart::bodypart::StreamedPart for $part<$crate::http::entity::BodyPartEntity> {
            type Strict = $part<::bytes::Bytes>;
            type Shell = $part<()>;

            fn split(self) -> (Self::Shell, $crate::http::entity::BodyPartEntity) {
                self.replace_entity(())
            }

            fn join(shell: Self::Shell, data: ::bytes::Bytes) -> Self::Strict {
                shell.replace_entity(data).0
            }
        }

        impl $crate::multipart::bodypart::StrictPart for $part<::bytes::Bytes> {
            type Streamed = $part<$crate::http::entity::BodyPartEntity>;

            fn to_streamed(self) -> Self::Streamed {
                let (shell, data) = self.replace_entity(());
                shell
                    .replace_entity($crate::http::entity::BodyPartEntity::Strict(data))
                    .0
            }
        }

        impl $part<$crate::http::entity::BodyPartEntity> {
            /// Buffer this part's entity, failing if it is not read
            /// completely within `timeout`.
            pub async fn to_strict(
                self,
                timeout: ::std::time::Duration,
            ) -> Result<$part<::bytes::Bytes>, $crate::base::error::MultipartError> {
                $crate::multipart::materialize::part_to_strict(self, timeout).await
            }
        }
    };
}

pub(crate) use impl_part_conversions;

/// Part of a general multipart entity: headers plus entity, nothing derived.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GeneralPart<E = BodyPartEntity> {
    headers: HeaderSet,
    entity: E,
}

impl<E> GeneralPart<E> {
    pub fn new(headers: HeaderSet, entity: impl Into<E>) -> Self {
        Self {
            headers,
            entity: entity.into(),
        }
    }

    pub fn header_set(&self) -> &HeaderSet {
        &self.headers
    }

    /// Swap the entity, returning the part with the new one and the old entity.
    pub fn replace_entity<F>(self, entity: F) -> (GeneralPart<F>, E) {
        (
            GeneralPart {
                headers: self.headers,
                entity,
            },
            self.entity,
        )
    }
}

impl<E> BodyPart for GeneralPart<E> {
    type Entity = E;

    fn from_raw(headers: HeaderSet, entity: E) -> Result<Self, MultipartError> {
        Ok(Self { headers, entity })
    }

    fn headers(&self) -> Cow<'_, HeaderSet> {
        Cow::Borrowed(&self.headers)
    }

    fn entity(&self) -> &E {
        &self.entity
    }

    fn into_entity(self) -> E {
        self.entity
    }
}

impl_part_conversions!(GeneralPart);

#[cfg(test)]
mod tests {
    use super::*;

    fn disposition_part() -> GeneralPart<Bytes> {
        let headers = HeaderSet::from_pairs([
            ("Content-Disposition", "attachment; filename=\"r.pdf\"; size=3"),
            ("Content-Type", "application/pdf"),
        ])
        .unwrap();
        GeneralPart::new(headers, Bytes::from_static(b"pdf"))
    }

    #[test]
    fn test_generic_accessors() {
        let part = disposition_part();
        assert_eq!(
            part.disposition_type().unwrap(),
            Some(DispositionType::Attachment)
        );
        assert_eq!(
            part.disposition_params().unwrap(),
            vec![
                ("filename".to_string(), "r.pdf".to_string()),
                ("size".to_string(), "3".to_string())
            ]
        );
        assert_eq!(part.entity(), &Bytes::from_static(b"pdf"));
        assert_eq!(part.headers().len(), 2);
    }

    #[test]
    fn test_no_disposition() {
        let part: GeneralPart<Bytes> = GeneralPart::new(HeaderSet::new(), Bytes::new());
        assert_eq!(part.content_disposition().unwrap(), None);
        assert!(part.disposition_params().unwrap().is_empty());
    }

    #[test]
    fn test_split_join() {
        let part: GeneralPart = GeneralPart::new(HeaderSet::new(), "abc");
        let (shell, entity) = part.split();
        assert_eq!(entity.content_length(), Some(3));
        let strict = <GeneralPart as StreamedPart>::join(shell, Bytes::from_static(b"abc"));
        assert_eq!(strict.entity(), &Bytes::from_static(b"abc"));

        let streamed = strict.to_streamed();
        assert!(streamed.entity().is_strict());
        assert_eq!(streamed.entity().content_length(), Some(3));
    }
}
