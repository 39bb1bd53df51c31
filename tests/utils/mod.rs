pub mod mocks;
pub mod setup;

#[allow(unused_imports)]
pub use mocks::{FailingHistoryStore, FailureMode, SlowHistoryStore};
#[allow(unused_imports)]
pub use setup::{TestSetup, TestSetupBuilder};
