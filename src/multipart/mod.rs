pub mod bodypart;
pub mod boundary;
pub mod byteranges;
pub mod codec;
pub mod config;
pub mod decode;
pub mod formdata;
pub mod materialize;
pub mod partstream;
pub mod streaming;
pub mod strict;

// Re-exports for convenience
pub use bodypart::{BodyPart, GeneralPart, StreamedPart, StrictPart};
pub use boundary::{random_boundary, validate_boundary};
pub use byteranges::ByteRangesPart;
pub use codec::WireEntity;
pub use config::{BoundaryConfig, MaterializeConfig};
pub use decode::{decode_entity, decode_strict, DecodedMultipart};
pub use formdata::FormDataPart;
pub use materialize::{materialize_entity, part_to_strict};
pub use partstream::PartStream;
pub use streaming::{ByteRangesMultipart, FormDataMultipart, GeneralMultipart, Multipart};
pub use strict::{
    StrictByteRangesMultipart, StrictFormDataMultipart, StrictGeneralMultipart, StrictMultipart,
};
