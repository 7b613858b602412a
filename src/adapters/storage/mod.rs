//! Storage Adapter
//!
//! Implementations of the SnapshotStore port.

mod filesystem;
mod s3;

pub use filesystem::FsSnapshotStore;
pub use s3::S3SnapshotStore;
