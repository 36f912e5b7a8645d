//! CLI command implementations.

mod channel;
mod config;
mod doctor;
mod summarize;

pub use channel::run_channel;
pub use config::run_config;
pub use doctor::run_doctor;
pub use summarize::run_summarize;
