//! # certify-test-utils
//!
//! Test helpers: a mock wallet extension backed by an in-memory registry.

#![warn(unused_crate_dependencies, unreachable_pub)]

pub mod ledger;
pub use ledger::Ledger;

mod wallet;
pub use wallet::{MockWallet, SEPOLIA, SwitchBehavior};

/// Initializes tracing for tests.
pub fn init_tracing() {
    let _ = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
