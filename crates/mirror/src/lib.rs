//! # certify-mirror
//!
//! A non-authoritative HTTP mirror of issued certificates, used for listings and analytics.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

mod client;
pub use client::MirrorClient;

mod error;
pub use error::MirrorError;

mod server;
pub use server::{MirrorServer, build_router};

mod store;
pub use store::{CertificateStore, MemoryStore};

pub mod sync;

mod types;
pub use types::{ApiError, MirrorRecord, NewCertificate};
