//! Whisperbox integration tests.
//!
//! The harness wires a real routing engine over in-memory stores and
//! scripted collaborator doubles; the test modules cover the end-to-end
//! routing scenarios, concurrency races, failure injection, and property
//! coverage of identity hashing and selection addressing.

pub mod harness;

mod failure_tests;

pub use harness::{
    BackendBuilder, FlakyKvStore, RecordingPublisher, StubDirectory, TestBackend,
};
