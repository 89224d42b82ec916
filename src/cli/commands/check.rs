//! Check command - verify worker timing before deploying a configuration

use crate::buffer::BufferKey;
use crate::config::Config;
use crate::error::QuireResult;
use crate::ui::{self, UiContext};

/// Execute the check command
///
/// Prints every worker against the buffer TTL and fails if any buffer could
/// expire between two ticks of its worker.
pub async fn execute(config: &Config) -> QuireResult<()> {
    let ctx = UiContext::detect();
    let ttl = config.buffer.ttl_secs;

    ui::intro(&ctx, "Worker timing");
    ui::key_value(&ctx, "buffer ttl", &format!("{}s", ttl));
    ui::key_value(&ctx, "buffer mode", &config.buffer.mode.to_string());

    ui::section(&ctx, "Workers");
    for key in BufferKey::ALL {
        let interval = config.workers.secs_for(key);
        let line = format!("{:<16} every {:>4}s  {}", key.worker_name(), interval, key);
        if interval > 0 && interval < ttl {
            ui::step_ok(&ctx, &line);
        } else {
            ui::step_error(&ctx, &line);
        }
    }

    match config.validate() {
        Ok(()) => {
            ui::outro_success(&ctx, "Every buffer outlives its worker interval");
            Ok(())
        }
        Err(e) => {
            ui::outro_error(&ctx, "Timing check failed");
            Err(e)
        }
    }
}
