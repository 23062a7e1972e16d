#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! HTTP client infrastructure for TiUP
//!
//! A thin hyper-based client with:
//! - rustls TLS (webpki roots, aws-lc-rs provider), plain HTTP allowed for
//!   loopback endpoints such as the playground control port
//! - connection pooling through the hyper-util legacy client
//! - JSON request bodies and either buffered or streamed response bodies
//!
//! There are no timeouts or retries: callers block until the peer answers.

mod client;
mod error;
mod response;

pub use client::HttpClient;
pub use error::{HttpError, InvalidUriKind};
pub use response::HttpResponse;
