//! Command dispatch: bridges CLI args -> core views -> output formatting.

pub mod catalog;
pub mod config_cmd;
pub mod favorites;

use staylist_core::{AppContext, EntityKind, ItemField};

use crate::cli::{Command, FieldArg, GlobalOpts, KindArg};
use crate::error::CliError;

/// Dispatch a store-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    ctx: &AppContext,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::List(args) => catalog::list(ctx, args, global).await,
        Command::Show(args) => catalog::show(ctx, args, global).await,
        Command::Facets(args) => catalog::facets(ctx, args, global).await,
        Command::Toggle(args) => favorites::toggle(ctx, args, global).await,
        Command::Favorites(args) => favorites::list(ctx, args, global).await,
        Command::WatchFavorites(args) => favorites::watch(ctx, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}

pub(crate) fn entity_kind(kind: KindArg) -> EntityKind {
    match kind {
        KindArg::Accommodations => EntityKind::Accommodations,
        KindArg::Exclusives => EntityKind::Exclusives,
        KindArg::Photography => EntityKind::Photography,
        KindArg::Chefs => EntityKind::Chefs,
        KindArg::Popular => EntityKind::Popular,
    }
}

pub(crate) fn item_field(field: FieldArg) -> ItemField {
    match field {
        FieldArg::City => ItemField::City,
        FieldArg::Location => ItemField::Location,
        FieldArg::Type => ItemField::Type,
        FieldArg::Category => ItemField::Category,
    }
}
