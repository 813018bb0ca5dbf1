//! Base types and error handling.
//!
//! Provides the foundational types shared by the HTTP model and the
//! multipart engine:
//! - [`MultipartError`](error::MultipartError): the crate-wide error type
//! - [`ConsumptionState`](state::ConsumptionState): progress of single-use sequences

pub mod context;
pub mod error;
pub mod state;
