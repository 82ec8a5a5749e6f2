//! The email verification flow.
//!
//! The `/verify-email` page reconciles three asynchronous signals — the URL
//! query string, the session's auth snapshot, and the verify/resend server
//! calls — into one of four rendered states. Rather than layering reactive
//! effects over shared mutable state, the whole flow is a single explicit
//! state machine: [`transition`] maps `(state, event)` to the next state, a
//! message update, and the side effects to run. The page in
//! `pages/verify_email.rs` is a thin driver around it.

mod machine;
mod query;
pub mod storage;

pub use machine::{
    transition, Destination, Effect, Event, Machine, MessageUpdate, Outcome, State, Status,
};
pub use query::{FailureReason, VerificationQuery};
