//! Terminal output for the `quire` commands
//!
//! Interactive terminals get symbols and dimmed details; pipes and CI get
//! bracketed plain tags that are easy to grep.

mod context;
mod output;

pub use context::UiContext;
pub use output::{
    intro, key_value, outro_error, outro_success, remark, section, step_error,
    step_error_detail, step_info, step_ok, step_ok_detail, step_warn_hint,
};
