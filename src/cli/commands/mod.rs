//! CLI command implementations.

mod config;
mod doctor;
mod export;
mod init;
mod list;
mod serve;
mod transcribe;

pub use config::run_config;
pub use doctor::run_doctor;
pub use export::run_export;
pub use init::run_init;
pub use list::run_list;
pub use serve::run_serve;
pub use transcribe::run_transcribe;
