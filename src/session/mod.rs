// Public API - what other modules can use
pub use cleanup_task::start_cleanup_task;
pub use cookie::session_cookie;
pub use handlers::{get_session, list_sessions, sign_in, sign_out, sign_up};
pub use middleware::session_auth;
pub use resolver::{SessionResolver, TokenSessionResolver};
pub use types::AuthSession;

mod cleanup_task;
mod cookie;
mod handlers;
mod middleware;
pub mod models;
mod password;
pub mod repository;
pub mod resolver;
pub mod service;
pub mod token;
pub mod types;
