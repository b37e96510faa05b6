//! Agent steps backed by the text-generation gateway.
//!
//! Each module holds one role: build the prompt from the current ticket
//! state, call the gateway in JSON mode, and parse the output into the
//! step's typed report. Parse failures are fatal to the step — a half-read
//! report never enters the shared state.

pub mod classifier;
pub mod escalation;
pub mod intake;

pub use classifier::run_classifier;
pub use escalation::run_escalation;
pub use intake::run_intake;
