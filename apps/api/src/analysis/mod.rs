// Resume analysis: per-upload sessions, the stage pipeline, and its HTTP handlers.
// All completion calls go through llm_client; all board calls go through jobs.

pub mod handlers;
pub mod pipeline;
pub mod session;
