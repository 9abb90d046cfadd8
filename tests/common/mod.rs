//! Common test utilities
//!
//! This module is shared across all integration tests

pub mod fixtures;
pub mod recorder;

#[allow(unused_imports)]
pub use fixtures::{TestEnvironment, ADMIN_A, ADMIN_B, EMPLOYEE, GROUP_CHAT, OUTSIDER};
#[allow(unused_imports)]
pub use recorder::{Outgoing, RecordingNotifier};
