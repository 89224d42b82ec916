//! Config command - show or initialize configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{ConfigFile, InitOutcome, LoadedConfig};
use crate::error::QuireResult;
use crate::ui::{self, UiContext};

/// Execute the config command
pub async fn execute(args: ConfigArgs, loaded: &LoadedConfig, file: &ConfigFile) -> QuireResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(loaded)?,
        Some(ConfigAction::Path) => println!("{}", file.path().display()),
        Some(ConfigAction::Init { force }) => init_config(file, force).await?,
    }

    Ok(())
}

/// Print the effective configuration as TOML, headed by its origin
fn show_config(loaded: &LoadedConfig) -> QuireResult<()> {
    println!("# from {}", loaded.origin);
    println!("{}", toml::to_string_pretty(&loaded.config)?);
    Ok(())
}

async fn init_config(file: &ConfigFile, force: bool) -> QuireResult<()> {
    let ctx = UiContext::detect();
    let path = file.path().display().to_string();

    match file.init(force).await? {
        InitOutcome::Written => ui::step_ok_detail(&ctx, "Configuration initialized", &path),
        InitOutcome::AlreadyExists => ui::step_warn_hint(
            &ctx,
            &format!("Config already exists at {}", path),
            "Use --force to overwrite",
        ),
    }

    Ok(())
}
