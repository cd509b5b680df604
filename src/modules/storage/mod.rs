//! Storage module for report photos
//!
//! Photos are kept on the local filesystem, one directory per report.

mod photo_store;

pub use photo_store::{PhotoStore, PhotoUpload};
