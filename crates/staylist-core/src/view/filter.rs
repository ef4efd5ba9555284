// ── Attribute filters ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::CoreError;
use crate::model::CatalogItem;

/// Filterable attribute, named the way the store names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "camelCase")]
pub enum FilterKey {
    MinPrice,
    MaxPrice,
    MinRating,
    City,
    Type,
    Category,
    Location,
}

/// Active filter set. Every present filter must hold for a record to pass.
///
/// - Price bounds are inclusive; records without a price never pass a
///   price filter.
/// - `min_rating` is inclusive; records without a rating never pass it.
/// - `city`, `type` and `location` match case-insensitive substrings.
/// - `category` matches case-insensitively but exactly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Filters {
    /// Set one filter from user text. Blank text clears it.
    pub fn set(&mut self, key: FilterKey, raw: &str) -> Result<(), CoreError> {
        let raw = raw.trim();
        if raw.is_empty() {
            self.clear(key);
            return Ok(());
        }
        match key {
            FilterKey::MinPrice => self.min_price = Some(parse_price(key, raw)?),
            FilterKey::MaxPrice => self.max_price = Some(parse_price(key, raw)?),
            FilterKey::MinRating => {
                let rating = raw
                    .parse::<f64>()
                    .ok()
                    .filter(|r| r.is_finite())
                    .ok_or_else(|| invalid(key, raw, "a number"))?;
                self.min_rating = Some(rating);
            }
            FilterKey::City => self.city = Some(raw.to_owned()),
            FilterKey::Type => self.item_type = Some(raw.to_owned()),
            FilterKey::Category => self.category = Some(raw.to_owned()),
            FilterKey::Location => self.location = Some(raw.to_owned()),
        }
        Ok(())
    }

    pub fn clear(&mut self, key: FilterKey) {
        match key {
            FilterKey::MinPrice => self.min_price = None,
            FilterKey::MaxPrice => self.max_price = None,
            FilterKey::MinRating => self.min_rating = None,
            FilterKey::City => self.city = None,
            FilterKey::Type => self.item_type = None,
            FilterKey::Category => self.category = None,
            FilterKey::Location => self.location = None,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether `item` passes every active filter.
    pub fn matches(&self, item: &CatalogItem) -> bool {
        let above_min = self
            .min_price
            .is_none_or(|min| item.price.is_some_and(|p| p >= min));
        let below_max = self
            .max_price
            .is_none_or(|max| item.price.is_some_and(|p| p <= max));
        let rated = self
            .min_rating
            .is_none_or(|min| item.rating.is_some_and(|r| r >= min));

        above_min
            && below_max
            && rated
            && contains(item.city.as_deref(), self.city.as_deref())
            && contains(item.item_type.as_deref(), self.item_type.as_deref())
            && contains(item.location.as_deref(), self.location.as_deref())
            && equals(item.category.as_deref(), self.category.as_deref())
    }
}

fn contains(field: Option<&str>, wanted: Option<&str>) -> bool {
    match wanted {
        None => true,
        Some(wanted) => {
            field.is_some_and(|f| f.to_lowercase().contains(&wanted.to_lowercase()))
        }
    }
}

fn equals(field: Option<&str>, wanted: Option<&str>) -> bool {
    match wanted {
        None => true,
        Some(wanted) => field.is_some_and(|f| f.to_lowercase() == wanted.to_lowercase()),
    }
}

fn parse_price(key: FilterKey, raw: &str) -> Result<u64, CoreError> {
    raw.parse::<u64>()
        .map_err(|_| invalid(key, raw, "a non-negative whole number"))
}

fn invalid(key: FilterKey, raw: &str, expected: &str) -> CoreError {
    CoreError::Validation {
        message: format!("{key} must be {expected}, got '{raw}'"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn priced(prices: &[Option<u64>]) -> Vec<CatalogItem> {
        prices
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let mut item = CatalogItem::new(u64::try_from(i).unwrap());
                item.price = *p;
                item
            })
            .collect()
    }

    #[test]
    fn price_bounds_are_inclusive() {
        let mut filters = Filters::default();
        filters.set(FilterKey::MinPrice, "100").unwrap();
        filters.set(FilterKey::MaxPrice, "500").unwrap();

        let items = priced(&[Some(50), Some(100), Some(300), Some(500), Some(900)]);
        let kept: Vec<u64> = items
            .iter()
            .filter(|i| filters.matches(i))
            .filter_map(|i| i.price)
            .collect();
        assert_eq!(kept, vec![100, 300, 500]);
    }

    #[test]
    fn records_without_price_fail_price_filters() {
        let mut filters = Filters::default();
        filters.set(FilterKey::MinPrice, "0").unwrap();
        assert!(!filters.matches(&priced(&[None])[0]));
    }

    #[test]
    fn text_filters_substring_but_category_exact() {
        let mut item = CatalogItem::new(1u64);
        item.city = Some("Saint Petersburg".into());
        item.category = Some("Dinner".into());

        let mut filters = Filters::default();
        filters.set(FilterKey::City, "peters").unwrap();
        filters.set(FilterKey::Category, "dinner").unwrap();
        assert!(filters.matches(&item));

        filters.set(FilterKey::Category, "din").unwrap();
        assert!(!filters.matches(&item));
    }

    #[test]
    fn min_rating_requires_rating() {
        let mut filters = Filters::default();
        filters.set(FilterKey::MinRating, "4.5").unwrap();

        let mut rated = CatalogItem::new(1u64);
        rated.rating = Some(4.5);
        assert!(filters.matches(&rated));
        assert!(!filters.matches(&CatalogItem::new(2u64)));
    }

    #[test]
    fn invalid_numbers_are_rejected_and_blank_clears() {
        let mut filters = Filters::default();
        let err = filters.set(FilterKey::MinPrice, "cheap").unwrap_err();
        assert!(matches!(err, CoreError::Validation { ref message } if message.contains("minPrice")));
        assert!(filters.set(FilterKey::MaxPrice, "-5").is_err());

        filters.set(FilterKey::City, "Moscow").unwrap();
        filters.set(FilterKey::City, "  ").unwrap();
        assert!(filters.is_empty());
    }

    #[test]
    fn keys_parse_from_camel_case() {
        assert_eq!("minPrice".parse::<FilterKey>().unwrap(), FilterKey::MinPrice);
        assert_eq!("type".parse::<FilterKey>().unwrap(), FilterKey::Type);
        assert_eq!(FilterKey::MinRating.to_string(), "minRating");
    }
}
