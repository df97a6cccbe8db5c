//! Filesystem image storage for application entities.
//!
//! Each owner gets a directory at `{dir}/{category}/{entity_key}/` holding
//! any number of images. At most one of them, the default image, carries a
//! marker prefix (`^` unless configured otherwise) in its filename.

pub mod config;
pub mod directory;
pub mod error;
pub mod filename;
pub mod marker;
pub mod owner;
pub mod store;
pub mod upload;

pub use config::ImageStoreConfig;
pub use directory::{ImageDirectory, SupplementaryNames};
pub use error::{ImageStoreError, Result};
pub use marker::Marker;
pub use owner::{ImageOwner, entity_key};
pub use store::{ImageRef, ImageSet, ImageStore};
pub use upload::{BytesUpload, FileUpload, Upload};
