pub mod contentdisposition;
pub mod contentrange;
pub mod entity;
pub mod headerset;
pub mod mediatype;
mod params;

// Re-exports for convenience
pub use contentdisposition::{ContentDisposition, DispositionType};
pub use contentrange::{ContentRange, RangeUnit};
pub use entity::{BodyPartEntity, ByteStream, StreamedEntity};
pub use headerset::HeaderSet;
pub use mediatype::MediaType;
