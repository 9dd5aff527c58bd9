//! Filesystem abstraction for mbpoll.
//!
//! This crate provides the `Filesystem` trait used to read batch files and
//! to write the header file, with a real and an in-memory implementation.

pub mod filesystem;

pub use filesystem::{Filesystem, FsError, MockFilesystem, RealFilesystem};
