/// State Machine Pattern for a single `process` call
///
/// Every call to the manager walks through these states. Each state is a
/// distinct type and each transition consumes the previous state, so a call
/// cannot, for example, succeed without having been dispatched.
///
/// # States
///
/// - `Classifying` - Deciding which adapter kind the record belongs to
/// - `Dispatching` - Looking up the adapter registered for that kind
/// - `Running` - Stages executing inside the adapter
/// - `Succeeded` - Output rendered, counter incremented
/// - `Recovering` - A stage rejected the record
/// - `Recovered` - Failure swallowed, sentinel returned
///
/// # Example
///
/// ```
/// use nexus_lib::state_machine::{ClassifiedCall, ProcessingCall};
/// use serde_json::json;
///
/// let call = ProcessingCall::new(json!("user,action,timestamp"));
/// let ClassifiedCall::Routable(call) = call.classify() else {
///     panic!("delimited text is routable");
/// };
/// let call = call.dispatch("Pipeline B");
/// let call = call.succeed("User activity logged: 1 actions processed".to_string());
/// assert_eq!(call.rendered(), "User activity logged: 1 actions processed");
/// ```
pub mod states;
pub mod transitions;

pub use states::*;
pub use transitions::*;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A call with type-safe state
///
/// The generic parameter `S` is the current state of the call.
#[derive(Debug, Clone)]
pub struct ProcessingCall<S> {
    /// Unique call identifier, shared with the pipeline context and events
    pub call_id: Uuid,

    /// Current state (type parameter ensures type safety)
    pub state: S,

    /// When the call entered `Classifying`
    pub started_at: DateTime<Utc>,
}

impl<S> ProcessingCall<S> {
    pub fn call_id(&self) -> Uuid {
        self.call_id
    }

    /// Time since the call started
    pub fn elapsed(&self) -> chrono::Duration {
        Utc::now() - self.started_at
    }
}
