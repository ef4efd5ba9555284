//! Favorite handlers: toggle, favorites, watch-favorites.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tabled::Tabled;

use staylist_core::{AppContext, ItemId, TaggedItem, ToggleOutcome};

use crate::cli::{FavoritesArgs, GlobalOpts, OutputFormat, ToggleArgs, WatchArgs};
use crate::config::positive_secs;
use crate::error::CliError;
use crate::output;

use super::catalog::ensure_loaded;
use super::entity_kind;

// ── Table rows ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "♥")]
    favorite: String,
}

#[derive(Tabled)]
struct FavoriteRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Price")]
    price: String,
}

#[derive(Serialize)]
struct CountUpdate {
    favorites: usize,
    at: DateTime<Utc>,
}

// ── Handlers ─────────────────────────────────────────────────────────

pub async fn toggle(
    ctx: &AppContext,
    args: ToggleArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let kind = entity_kind(args.kind);
    let view = ctx.catalog(kind);
    ensure_loaded(view.load().await, kind.to_string())?;

    // All toggles are queued before the first is awaited: distinct ids
    // are written concurrently, repeats of one id in argument order.
    let pending: Vec<_> = args
        .ids
        .into_iter()
        .map(|id| view.toggle_favorite(ItemId::from(id)))
        .collect();

    let mut outcomes: Vec<ToggleOutcome> = Vec::with_capacity(pending.len());
    let mut failures: Vec<CliError> = Vec::new();
    for toggle in pending {
        match toggle.await {
            Ok(outcome) => outcomes.push(outcome),
            Err(err) => failures.push(err.into()),
        }
    }

    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &outcomes,
        |o| OutcomeRow {
            kind: o.kind.to_string(),
            id: o.id.to_string(),
            favorite: output::favorite_mark(o.is_favorite, color),
        },
        |o| format!("{}/{}\t{}", o.kind, o.id, o.is_favorite),
    )?;
    if !outcomes.is_empty() {
        output::print_output(&out, global.quiet);
    }

    let total = outcomes.len() + failures.len();
    if total == 1 && failures.len() == 1 {
        return Err(failures.remove(0));
    }
    if failures.is_empty() {
        return Ok(());
    }

    let failed = failures.len();
    for err in failures {
        eprintln!("{:?}", miette::Report::new(err));
    }
    Err(CliError::PartialToggle { failed, total })
}

pub async fn list(
    ctx: &AppContext,
    args: FavoritesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let index = ctx.favorites();
    ensure_loaded(index.recompute().await, "favorites")?;

    let wanted = args.kind.map(entity_kind);
    let items: Vec<Arc<TaggedItem>> = index
        .snapshot()
        .iter()
        .filter(|tagged| wanted.is_none_or(|kind| tagged.kind == kind))
        .cloned()
        .collect();

    let out = output::render_list(
        &global.output,
        &items,
        |tagged| FavoriteRow {
            kind: tagged.kind.to_string(),
            id: tagged.item.id.to_string(),
            title: tagged.item.display_title(tagged.kind),
            price: output::format_price(&tagged.item),
        },
        |tagged| format!("{}/{}", tagged.kind, tagged.item.id),
    )?;
    output::print_output(&out, global.quiet);

    if matches!(global.output, OutputFormat::Table) && !global.quiet {
        eprintln!("{} favorites", items.len());
    }
    Ok(())
}

/// Print the total whenever the counter publishes a new value, until
/// Ctrl-C or `--count` updates.
pub async fn watch(ctx: &AppContext, args: WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let interval = match args.interval {
        Some(secs) => positive_secs("interval", secs)?,
        None => ctx.config().poll_interval,
    };
    let mut counter = ctx.favorites_counter_every(interval);
    tracing::info!(?interval, "watching favorites count");

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut seen = 0_usize;
    let result = loop {
        let total = tokio::select! {
            _ = &mut ctrl_c => break Ok(()),
            total = counter.changed() => total,
        };
        let Some(total) = total else {
            break Ok(());
        };

        let update = CountUpdate {
            favorites: total,
            at: Utc::now(),
        };
        let rendered = output::render_single(
            &global.output,
            &update,
            |u| format!("{}  favorites: {}", u.at.format("%H:%M:%S"), u.favorites),
            |u| u.favorites.to_string(),
        );
        match rendered {
            Ok(out) => output::print_output(&out, global.quiet),
            Err(err) => break Err(err),
        }

        seen += 1;
        if args.count.is_some_and(|limit| seen >= limit) {
            break Ok(());
        }
    };

    counter.stop().await;
    result
}
