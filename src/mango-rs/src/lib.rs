//! Mango Client Library
//!
//! HTTP client for CouchDB's Mango query API: build a typed `_find` query or
//! `_index` definition, POST it as JSON, decode the response.
//!
//! ```no_run
//! use mango_rs::{Client, FindRequest, Selector};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new("http://127.0.0.1", 5984, "movies")
//!     .with_find_args(FindRequest::new(Selector::gte("year", 2000)));
//! let response = client.find().await?;
//! println!("matched {} docs", response.docs.len());
//! # Ok(())
//! # }
//! ```

mod client;

pub use client::Client;
pub use mango_core::{
    ClientConfig, CreateIndexRequest, CreateIndexResponse, ExecutionStats, FindRequest,
    FindResponse, IndexFields, IndexState, IndexType, Selector, SortSpec, Stale, UseIndex,
};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request could not be sent, or the response body never arrived.
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A body arrived but is not the expected JSON shape.
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Non-2xx response. Not produced after [`Client::allow_error_bodies`].
    #[error("server error: {status} - {message}")]
    Server { status: u16, message: String },
}

pub type Result<T> = std::result::Result<T, ClientError>;
