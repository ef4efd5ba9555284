// ── Catalog records ──
//
// One struct covers all five collections. Kind-specific attributes are
// optional, and anything the model doesn't name is carried in `extra`
// so a full-replace write never drops fields it doesn't understand.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumIter, EnumString};

use super::{EntityKind, ItemId};

/// A bookable catalog record as stored remotely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: ItemId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_u64",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<u64>,
    #[serde(
        default,
        deserialize_with = "lenient_u64",
        skip_serializing_if = "Option::is_none"
    )]
    pub min_price: Option<u64>,
    #[serde(
        default,
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub rating: Option<f64>,
    /// Absent or `null` in the store reads as `false`.
    #[serde(default, deserialize_with = "null_as_false")]
    pub is_favorite: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub nights: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_guest: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_group: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_guest_favorite: Option<bool>,
    /// Fields this model doesn't name (`duration`, host details, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn null_as_false<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

// Admin-edited records store numbers as form text ("1500", "4.8", "").
// Text that doesn't parse reads as absent rather than failing the whole
// collection.

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(|v| {
        v.as_str()
            .and_then(|s| s.trim().parse::<f64>().ok())
            .or_else(|| v.as_f64())
            .filter(|n| n.is_finite())
    }))
}

#[allow(
    clippy::as_conversions,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(|v| {
        let text = v.as_str().map(str::trim);
        text.and_then(|s| s.parse::<u64>().ok())
            .or_else(|| v.as_u64())
            .or_else(|| {
                text.and_then(|s| s.parse::<f64>().ok())
                    .or_else(|| v.as_f64())
                    .filter(|n| n.is_finite() && *n >= 0.0 && *n <= u64::MAX as f64)
                    .map(|n| n.trunc() as u64)
            })
    }))
}

fn lenient_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    Ok(lenient_u64(deserializer)?.and_then(|n| u32::try_from(n).ok()))
}

impl CatalogItem {
    /// Minimal record with only an id; handy for creates and tests.
    pub fn new(id: impl Into<ItemId>) -> Self {
        Self {
            id: id.into(),
            title: None,
            description: None,
            image: None,
            location: None,
            city: None,
            price: None,
            min_price: None,
            rating: None,
            is_favorite: false,
            category: None,
            item_type: None,
            nights: None,
            per_guest: None,
            per_group: None,
            is_guest_favorite: None,
            extra: Map::new(),
        }
    }

    /// Copy of this record with the favorite flag set to `value`.
    pub fn with_favorite(&self, value: bool) -> Self {
        Self {
            is_favorite: value,
            ..self.clone()
        }
    }

    /// Title, falling back to `"<Label> <id>"` for untitled records.
    pub fn display_title(&self, kind: EntityKind) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| format!("{} {}", kind.label(), self.id))
    }

    /// Textual value of a facet field, if present.
    pub fn field(&self, field: ItemField) -> Option<&str> {
        match field {
            ItemField::Title => self.title.as_deref(),
            ItemField::City => self.city.as_deref(),
            ItemField::Location => self.location.as_deref(),
            ItemField::Type => self.item_type.as_deref(),
            ItemField::Category => self.category.as_deref(),
        }
    }

    /// Unmodelled attribute by its store key.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

/// Textual record fields that can be searched or enumerated as facets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ItemField {
    Title,
    City,
    Location,
    Type,
    Category,
}

/// A record paired with the kind it was loaded from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaggedItem {
    pub kind: EntityKind,
    #[serde(flatten)]
    pub item: CatalogItem,
}

impl TaggedItem {
    pub fn new(kind: EntityKind, item: CatalogItem) -> Self {
        Self { kind, item }
    }

    pub fn key(&self) -> (EntityKind, ItemId) {
        (self.kind, self.item.id.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn missing_or_null_favorite_reads_false() {
        let a: CatalogItem = serde_json::from_value(json!({ "id": 1 })).unwrap();
        let b: CatalogItem =
            serde_json::from_value(json!({ "id": 2, "isFavorite": null })).unwrap();
        assert!(!a.is_favorite);
        assert!(!b.is_favorite);
    }

    #[test]
    fn unknown_fields_survive_round_trip() {
        let raw = json!({
            "id": "c9",
            "title": "Chef Ana",
            "isFavorite": true,
            "duration": "3 hours",
            "host": { "name": "Ana" }
        });
        let item: CatalogItem = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(item.attribute("duration"), Some(&json!("3 hours")));
        assert_eq!(serde_json::to_value(&item).unwrap(), raw);
    }

    #[test]
    fn numbers_saved_as_form_text_are_read() {
        let item: CatalogItem = serde_json::from_value(json!({
            "id": "1712345678901",
            "title": "Loft",
            "price": "1500",
            "minPrice": "",
            "rating": "4.8",
            "nights": "3"
        }))
        .unwrap();
        assert_eq!(item.price, Some(1500));
        assert_eq!(item.min_price, None);
        assert!(item.rating.is_some_and(|r| (r - 4.8).abs() < f64::EPSILON));
        assert_eq!(item.nights, Some(3));
    }

    #[test]
    fn unparseable_numbers_read_as_absent() {
        let item: CatalogItem = serde_json::from_value(json!({
            "id": 5,
            "price": "ask the host",
            "rating": null,
            "minPrice": 120.0
        }))
        .unwrap();
        assert_eq!(item.price, None);
        assert_eq!(item.rating, None);
        assert_eq!(item.min_price, Some(120));
    }

    #[test]
    fn type_field_is_renamed() {
        let item: CatalogItem =
            serde_json::from_value(json!({ "id": 3, "type": "Studio" })).unwrap();
        assert_eq!(item.field(ItemField::Type), Some("Studio"));
    }

    #[test]
    fn tagged_item_flattens_record() {
        let tagged = TaggedItem::new(EntityKind::Chefs, CatalogItem::new(4u64));
        let value = serde_json::to_value(&tagged).unwrap();
        assert_eq!(value["kind"], json!("chefs"));
        assert_eq!(value["id"], json!(4));
    }

    #[test]
    fn display_title_falls_back_to_label() {
        let item = CatalogItem::new(8u64);
        assert_eq!(item.display_title(EntityKind::Chefs), "Chef service 8");
    }
}
