//! Workflow: the approval state machine.

mod state;

pub use state::{ApprovalStateMachine, Decision, Verdict};
