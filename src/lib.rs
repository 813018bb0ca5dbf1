//! # mimeparts
//!
//! HTTP multipart content for Rust: a typed model of `multipart/*` bodies
//! and a timeout-bounded conversion from streamed parts to fully buffered
//! ones.
//!
//! A multipart body is an ordered sequence of parts, each with its own
//! headers and a byte-stream payload of unknown, possibly large, length.
//! `mimeparts` turns such a live sequence into an in-memory value that can
//! be inspected, re-encoded or handed on without backpressure concerns.
//!
//! ## Features
//!
//! - **Part model**: general, `form-data` (RFC 7578) and `byteranges`
//!   (RFC 7233) parts with derived name, filename and range fields
//! - **Materialization**: per-part timeout, order preserving, all-or-nothing
//! - **Encoding**: strict or lazily streamed wire entities with explicit or
//!   random boundaries
//! - **Decoding**: in-memory split of a complete entity, the inverse of
//!   encoding
//! - **Interop**: any `http_body::Body` can feed a part; wire entities
//!   convert back into bodies
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mimeparts::multipart::{FormDataPart, Multipart};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let upload = FormDataPart::from_path("file", "report.pdf", 64 * 1024)
//!         .await
//!         .unwrap();
//!     let form = Multipart::form_data(vec![upload]);
//!
//!     let strict = form.to_strict(Duration::from_secs(5)).await.unwrap();
//!     let entity = strict.to_entity_random().unwrap();
//!     println!("Content-Type: {:?}", entity.content_type());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error types and consumption state
//! - [`http`] - Header set, Content-Disposition, Content-Range, media types
//!   and part entities
//! - [`multipart`] - Parts, multipart values, materialization and the codec

pub mod base;
pub mod http;
pub mod multipart;

pub use crate::base::error::{ErrorKind, MultipartError};
pub use crate::http::{BodyPartEntity, HeaderSet, MediaType};
pub use crate::multipart::{
    BodyPart, ByteRangesPart, FormDataPart, GeneralPart, MaterializeConfig, Multipart,
    StrictMultipart,
};
