//! Concrete adapters for the submission and blob storage traits.

mod blobs;
mod documents;

pub use blobs::LocalBlobStore;
pub use documents::JsonFileSubmissionRepository;
