//! Artifact store accessor: keeps model artifacts on local storage, fetching
//! them from a remote HTTP store when they are missing.

mod error;
pub use error::StoreError;

pub mod http;
pub use http::RemoteSource;

mod store;
pub use store::{ArtifactStore, DEFAULT_FETCH_TIMEOUT, StoreConfig};
