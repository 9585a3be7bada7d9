//! # certify
//!
//! Issue, verify and revoke course certificates on an on-chain registry.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

pub mod args;
pub mod cmd;
pub mod opts;
