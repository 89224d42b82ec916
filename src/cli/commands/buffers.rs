//! Buffers command - list buffer keys with the worker draining each and
//! what each one holds

use super::run::submit_demo;
use crate::app::{Adapters, App};
use crate::buffer::BufferKey;
use crate::cache::MemoryCache;
use crate::cli::args::{BuffersArgs, OutputFormat};
use crate::config::Config;
use crate::error::QuireResult;
use crate::storage::MemoryStore;
use crate::ui::{self, UiContext};
use console::style;
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
struct BufferRow {
    key: &'static str,
    worker: &'static str,
    interval_secs: u64,
    pending: usize,
}

/// Execute the buffers command
pub async fn execute(args: BuffersArgs, config: &Config) -> QuireResult<()> {
    let store = Arc::new(MemoryStore::new());
    let app = App::build(config, Adapters::in_memory(Arc::new(MemoryCache::new()), store.clone()))?;
    if args.demo {
        submit_demo(&app, &store).await?;
    }

    let mut rows = Vec::with_capacity(BufferKey::ALL.len());
    for key in BufferKey::ALL {
        rows.push(BufferRow {
            key: key.as_str(),
            worker: key.worker_name(),
            interval_secs: config.workers.secs_for(key),
            pending: app.buffer.pending(key).await?,
        });
    }

    match args.format {
        OutputFormat::Table => print_table(&rows, config.buffer.ttl_secs),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Plain => {
            for row in &rows {
                println!("{}", row.key);
            }
        }
    }

    Ok(())
}

fn print_table(rows: &[BufferRow], ttl_secs: u64) {
    let ctx = UiContext::detect();
    ui::intro(&ctx, "Buffers");

    println!(
        "{:<24} {:<16} {:<10} {:<8}",
        style("KEY").bold(),
        style("WORKER").bold(),
        style("INTERVAL").bold(),
        style("PENDING").bold()
    );
    println!("{}", "-".repeat(61));

    for row in rows {
        println!(
            "{:<24} {:<16} {:<10} {:<8}",
            row.key,
            row.worker,
            format!("{}s", row.interval_secs),
            row.pending
        );
    }

    println!();
    let pending: usize = rows.iter().map(|row| row.pending).sum();
    ui::remark(
        &ctx,
        &format!("{} buffer(s), {} pending, ttl {}s", rows.len(), pending, ttl_secs),
    );
}
