//! Catalog browsing handlers: list, show, facets.

use std::sync::Arc;

use serde::Serialize;
use tabled::Tabled;

use staylist_core::{AppContext, CatalogItem, EntityKind, FilterKey, ItemField, ItemId, LoadState};

use crate::cli::{FacetsArgs, GlobalOpts, ListArgs, OutputFormat, ShowArgs};
use crate::error::CliError;
use crate::output;

use super::{entity_kind, item_field};

const FILTER_KEYS: &str = "minPrice, maxPrice, minRating, city, type, category, location";

// ── Table rows ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Where")]
    place: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Rating")]
    rating: String,
    #[tabled(rename = "♥")]
    favorite: String,
}

impl ItemRow {
    fn new(item: &CatalogItem, kind: EntityKind, color: bool) -> Self {
        Self {
            id: item.id.to_string(),
            title: item.display_title(kind),
            place: item
                .city
                .as_deref()
                .or(item.location.as_deref())
                .unwrap_or("-")
                .to_owned(),
            price: output::format_price(item),
            rating: output::format_rating(item),
            favorite: output::favorite_mark(item.is_favorite, color),
        }
    }
}

#[derive(Serialize)]
struct Facet {
    field: String,
    values: Vec<String>,
}

#[derive(Tabled)]
struct FacetRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Values")]
    values: String,
}

// ── Helpers ──────────────────────────────────────────────────────────

/// Split `KEY=VALUE` and resolve the key.
fn parse_filter(raw: &str) -> Result<(FilterKey, &str), CliError> {
    let (key, value) = raw.split_once('=').ok_or_else(|| CliError::Validation {
        field: "filter".into(),
        reason: format!("expected KEY=VALUE, got '{raw}'"),
    })?;
    let key = key.trim().parse::<FilterKey>().map_err(|_| CliError::Validation {
        field: "filter".into(),
        reason: format!("unknown key '{key}' (expected one of: {FILTER_KEYS})"),
    })?;
    Ok((key, value))
}

/// Turn the outcome of a load into a record count or an error.
pub(crate) fn ensure_loaded(state: LoadState, what: impl Into<String>) -> Result<usize, CliError> {
    match state {
        LoadState::Loaded { count, .. } => Ok(count),
        LoadState::Failed { message } => Err(CliError::LoadFailed {
            what: what.into(),
            message,
        }),
        other => Err(CliError::Internal(format!(
            "load finished in unexpected state {other:?}"
        ))),
    }
}

fn item_detail(item: &CatalogItem, kind: EntityKind, color: bool) -> String {
    let mut fields: Vec<(&str, String)> = vec![
        ("ID", item.id.to_string()),
        ("Title", item.display_title(kind)),
    ];
    let optional = [
        ("Description", item.description.clone()),
        ("Location", item.location.clone()),
        ("City", item.city.clone()),
        ("Category", item.category.clone()),
        ("Type", item.item_type.clone()),
        ("Nights", item.nights.map(|n| n.to_string())),
    ];
    fields.extend(
        optional
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v))),
    );
    fields.push(("Price", output::format_price(item)));
    fields.push(("Rating", output::format_rating(item)));
    fields.push(("Favorite", output::favorite_mark(item.is_favorite, color)));
    for (key, value) in &item.extra {
        let text = value
            .as_str()
            .map_or_else(|| value.to_string(), str::to_owned);
        fields.push((key.as_str(), text));
    }
    output::render_detail(&fields)
}

// ── Handlers ─────────────────────────────────────────────────────────

pub async fn list(ctx: &AppContext, args: ListArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let kind = entity_kind(args.kind);
    let view = ctx.catalog(kind);

    if let Some(query) = args.search {
        ctx.search().set(query);
    }
    for raw in &args.filters {
        let (key, value) = parse_filter(raw)?;
        view.set_filter(key, value)?;
    }

    ensure_loaded(view.load().await, kind.to_string())?;

    let (items, footer) = if args.all {
        let items: Vec<Arc<CatalogItem>> = view.matching();
        let footer = format!("{} matching", items.len());
        (items, footer)
    } else {
        if args.page != 1 && !view.go_to_page(args.page) {
            return Err(CliError::Validation {
                field: "page".into(),
                reason: format!("must be between 1 and {}", view.total_pages().max(1)),
            });
        }
        let page = view.page();
        let footer = format!(
            "Page {}/{} · {} matching",
            page.current_page,
            page.total_pages.max(1),
            page.total_items
        );
        (page.items, footer)
    };

    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &items,
        |item| ItemRow::new(item, kind, color),
        |item| item.id.to_string(),
    )?;
    output::print_output(&out, global.quiet);

    if matches!(global.output, OutputFormat::Table) && !global.quiet {
        eprintln!("{footer}");
    }
    Ok(())
}

pub async fn show(ctx: &AppContext, args: ShowArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let kind = entity_kind(args.kind);
    let id = ItemId::from(args.id);
    let item = ctx.store().get(kind, &id).await?;

    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &item,
        |item| item_detail(item, kind, color),
        |item| item.id.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn facets(
    ctx: &AppContext,
    args: FacetsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let kind = entity_kind(args.kind);
    let view = ctx.catalog(kind);
    ensure_loaded(view.load().await, kind.to_string())?;

    let fields: Vec<ItemField> = match args.field {
        Some(field) => vec![item_field(field)],
        None => vec![
            ItemField::City,
            ItemField::Location,
            ItemField::Type,
            ItemField::Category,
        ],
    };
    let facets: Vec<Facet> = fields
        .into_iter()
        .map(|field| Facet {
            field: field.to_string(),
            values: view.distinct_values(field),
        })
        .collect();

    let out = output::render_list(
        &global.output,
        &facets,
        |facet| FacetRow {
            field: facet.field.clone(),
            values: if facet.values.is_empty() {
                "-".into()
            } else {
                facet.values.join(", ")
            },
        },
        |facet| facet.values.join("\n"),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn filter_argument_splits_on_first_equals() {
        let (key, value) = parse_filter("city=Rio=de=Janeiro").unwrap();
        assert_eq!(key, FilterKey::City);
        assert_eq!(value, "Rio=de=Janeiro");

        let (key, value) = parse_filter("minPrice=").unwrap();
        assert_eq!(key, FilterKey::MinPrice);
        assert_eq!(value, "");
    }

    #[test]
    fn bad_filter_arguments_are_usage_errors() {
        let err = parse_filter("city").unwrap_err();
        assert!(err.to_string().contains("expected KEY=VALUE"));

        let err = parse_filter("stars=5").unwrap_err();
        assert!(err.to_string().contains("unknown key 'stars'"));
    }

    #[test]
    fn failed_load_is_reported() {
        let err = ensure_loaded(
            LoadState::Failed {
                message: "Store unreachable".into(),
            },
            "chefs",
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Could not load chefs: Store unreachable");
    }
}
