//! Run command - start the flush workers over in-memory adapters

use crate::app::{Adapters, App};
use crate::buffer::BufferKey;
use crate::cache::MemoryCache;
use crate::cli::args::RunArgs;
use crate::config::Config;
use crate::domain::{AgeRestriction, Category, Tag, User};
use crate::error::{QuireError, QuireResult};
use crate::pipeline::TickOutcome;
use crate::services::{NewChapter, NewWork};
use crate::storage::MemoryStore;
use crate::ui::{self, UiContext};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Execute the run command
pub async fn execute(args: RunArgs, config: &Config) -> QuireResult<()> {
    let ctx = UiContext::detect();
    let cache = Arc::new(MemoryCache::new());
    let store = Arc::new(MemoryStore::new());
    let app = App::build(config, Adapters::in_memory(cache, store.clone()))?;

    if args.demo {
        submit_demo(&app, &store).await?;
    }

    if args.once {
        return run_once(&ctx, &app).await;
    }

    let App { mut pipeline, .. } = app;
    ui::intro(&ctx, "Quire");
    pipeline.spawn();
    ui::step_info(
        &ctx,
        &format!(
            "{} flush workers running, press Ctrl-C to stop",
            pipeline.schedule().len()
        ),
    );

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| QuireError::io("waiting for Ctrl-C", e))?;

    ui::step_info(&ctx, "Stopping after in-flight flushes");
    pipeline.shutdown().await;
    ui::outro_success(&ctx, "All workers stopped");

    Ok(())
}

async fn run_once(ctx: &UiContext, app: &App) -> QuireResult<()> {
    ui::intro(ctx, "Single flush cycle");

    let mut failed = None;
    for (key, outcome) in app.pipeline.run_once().await {
        match outcome {
            Ok(TickOutcome::Idle) => ui::remark(ctx, &format!("{:<22} idle", key.as_str())),
            Ok(outcome) => ui::step_ok_detail(ctx, key.as_str(), &outcome.to_string()),
            Err(e) if e.is_retryable() => {
                ui::step_warn_hint(ctx, &format!("{}: {}", key, e), "Left queued for the next tick");
                failed.get_or_insert((key, e));
            }
            Err(e) => {
                ui::step_error_detail(ctx, key.as_str(), &e.to_string());
                failed.get_or_insert((key, e));
            }
        }
    }

    match failed {
        None => {
            ui::outro_success(ctx, "Every buffer drained");
            Ok(())
        }
        Some((key, e)) => {
            ui::outro_error(ctx, &format!("{} did not drain", key));
            Err(e)
        }
    }
}

/// Seed an author and a tag, then publish a work with its first chapter
pub(crate) async fn submit_demo(app: &App, store: &MemoryStore) -> QuireResult<()> {
    let author = User::new(Uuid::new_v4(), "marginalia", "marginalia@quire.local");
    let tag = Tag::new(
        Uuid::new_v4(),
        "Slow burn",
        AgeRestriction::GeneralAudience,
        "Feelings that take their time",
    )?;
    store.seed(author.clone())?;
    store.seed(tag.clone())?;

    let receipt = app
        .works
        .create(&NewWork {
            user_id: author.id,
            title: "The Long Quiet".to_string(),
            description: "Two lighthouse keepers and one very long winter".to_string(),
            category: Category::Gen,
            cover_url: "https://covers.quire.local/long-quiet.png".to_string(),
            tag_ids: vec![tag.id],
            first_chapter: Some(NewChapter {
                user_id: author.id,
                title: "First light".to_string(),
                description: "The supply boat is late".to_string(),
                content: "The lamp had to be wound every four hours.".to_string(),
            }),
        })
        .await?;

    info!(
        "Submitted work {} ({} pending in {})",
        receipt.snapshot.id,
        app.buffer.pending(BufferKey::WorksCreate).await?,
        receipt.key
    );
    Ok(())
}
