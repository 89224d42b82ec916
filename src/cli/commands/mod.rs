//! CLI command implementations

pub mod buffers;
pub mod check;
pub mod config;
pub mod run;

pub use buffers::execute as buffers;
pub use check::execute as check;
pub use config::execute as config;
pub use run::execute as run;
