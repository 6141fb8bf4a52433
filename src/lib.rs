// Library crate for the SaaS starter server
// This file exposes the public API for integration tests

pub mod app;
pub mod config;
pub mod gate;
pub mod jobs;
pub mod pages;
pub mod rpc;
pub mod session;
pub mod shared;
pub mod user;

// Re-export commonly used types for easier access in tests
pub use app::build_router;
pub use config::AppConfig;
pub use gate::{AuthGate, Denial, Gate, RedirectConfig};
pub use jobs::{EventName, JobBus, JobClient, JobEvent, JobRunner, SendReceipt};
pub use session::{AuthSession, SessionResolver, TokenSessionResolver};
pub use shared::{AppError, AppState};
pub use user::UserModel;
