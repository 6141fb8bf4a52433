use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{Display, EnumString, IntoStaticStr};
use uuid::Uuid;

/// Event names the built-in job functions listen for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, IntoStaticStr)]
pub enum EventName {
    #[strum(serialize = "test/hello.world")]
    HelloWorld,

    #[strum(serialize = "test/demo.get-current-user")]
    DemoGetCurrentUser,
}

impl EventName {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// A named event with a JSON payload, handed to the job runner
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobEvent {
    pub id: String,
    pub name: String,
    pub data: Value,
    pub ts: i64, // Milliseconds since epoch when the event was created
}

impl JobEvent {
    pub fn new(name: impl Into<String>, data: Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            data,
            ts: Utc::now().timestamp_millis(),
        }
    }
}

impl From<EventName> for String {
    fn from(name: EventName) -> Self {
        name.to_string()
    }
}

/// What a send hands back: the ids of the accepted events
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SendReceipt {
    pub ids: Vec<String>,
}
