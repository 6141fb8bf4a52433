pub mod actions;
pub mod assertions;
pub mod mocks;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use actions::session_cookie_pair;
#[allow(unused_imports)]
pub use assertions::{assert_redirect, body_json, body_text};
#[allow(unused_imports)]
pub use mocks::RecordingJobClient;
#[allow(unused_imports)]
pub use setup::{TestSetup, TestSetupBuilder};
