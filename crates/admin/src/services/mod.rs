//! Business logic services for admin.
//!
//! # Services
//!
//! - `auth` - Shared-secret credential verification
//! - `blob` - Storage for uploaded images
//! - `images` - Downsampling of oversized images before upload
//! - `intake` - Batch image intake and image hosts

pub mod auth;
pub mod blob;
pub mod images;
pub mod intake;

pub use auth::{CredentialVerifier, SharedSecretVerifier};
pub use blob::{BlobError, BlobStore, FsBlobStore};
pub use images::{UploadFile, prepare_for_upload};
pub use intake::{
    BlobImageHost, HttpImageHost, ImageHost, ImageIntake, IntakeError, IntakeReport, UploadError,
};
