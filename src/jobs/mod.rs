// Background jobs: events go out through a `JobClient`, the in-process
// `JobRunner` picks them up and runs every function whose trigger matches.

pub use client::{JobBus, JobClient};
pub use events::{EventName, JobEvent, SendReceipt};
pub use function::{JobError, JobFunction, Step};
pub use functions::{DemoGetCurrentUser, HelloWorld};
pub use runner::{JobOutcome, JobRunner};

mod client;
mod events;
mod function;
mod functions;
mod runner;
