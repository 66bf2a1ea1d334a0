//! Actix middleware shared by every route.
//!
//! [`Trace`] assigns each request a trace id, echoes it in the `trace-id`
//! response header and scopes it for error payloads built downstream.

pub mod trace;

pub use trace::Trace;
