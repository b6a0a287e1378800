//! Model artifact management.
//!
//! [`ModelCache`] makes sure the recognition model (and its charset) exist on
//! local storage before a session is created, fetching them through an
//! [`ArtifactFetcher`] the first time they are needed.

pub mod cache;
pub mod fetch;

pub use cache::{ModelCache, RemoteArtifact};
pub use fetch::{ArtifactFetcher, HttpFetcher};
