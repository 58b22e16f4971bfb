use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::domain::{parse_decimal, Listing};

pub const DEFAULT_MIN_PRICE: f64 = 0.0;
pub const DEFAULT_MAX_PRICE: f64 = 9_999_999.0;
pub const DEFAULT_MIN_AREA: f64 = 0.0;
pub const DEFAULT_MAX_AREA: f64 = 9_999.0;

/// Site languages. Anything unsupported falls back to English.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    De,
    En,
}

impl Language {
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => Self::De,
            Some("de") => Self::De,
            Some(_) => Self::En,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::De => "de",
            Self::En => "en",
        }
    }
}

/// Local reordering of an aggregated result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingSort {
    PriceAsc,
    PriceDesc,
    AreaAsc,
    AreaDesc,
    RoomsAsc,
    RoomsDesc,
    CreatedAsc,
    CreatedDesc,
}

impl ListingSort {
    pub fn parse(raw: &str) -> Result<Self, QueryError> {
        match raw.trim() {
            "preis_asc" => Ok(Self::PriceAsc),
            "preis_desc" => Ok(Self::PriceDesc),
            "flaeche_asc" => Ok(Self::AreaAsc),
            "flaeche_desc" => Ok(Self::AreaDesc),
            "zimmer_asc" => Ok(Self::RoomsAsc),
            "zimmer_desc" => Ok(Self::RoomsDesc),
            "created_asc" => Ok(Self::CreatedAsc),
            "created_desc" => Ok(Self::CreatedDesc),
            other => Err(QueryError::UnknownSort(other.to_string())),
        }
    }

    /// Stable sort; listings without the sort key keep their relative order at the end.
    pub fn apply(self, listings: &mut [Listing]) {
        match self {
            Self::PriceAsc => sort_by_number(listings, |l| Some(l.effective_price()), false),
            Self::PriceDesc => sort_by_number(listings, |l| Some(l.effective_price()), true),
            Self::AreaAsc => sort_by_number(listings, Listing::floor_area, false),
            Self::AreaDesc => sort_by_number(listings, Listing::floor_area, true),
            Self::RoomsAsc => sort_by_number(listings, |l| l.anzahl_zimmer, false),
            Self::RoomsDesc => sort_by_number(listings, |l| l.anzahl_zimmer, true),
            Self::CreatedAsc | Self::CreatedDesc => {
                let descending = self == Self::CreatedDesc;
                listings.sort_by(|a, b| {
                    compare_present(a.created_at.as_deref(), b.created_at.as_deref(), descending)
                });
            }
        }
    }
}

fn sort_by_number<F>(listings: &mut [Listing], key: F, descending: bool)
where
    F: Fn(&Listing) -> Option<f64>,
{
    listings.sort_by(|a, b| compare_present(key(a), key(b), descending));
}

fn compare_present<T: PartialOrd>(a: Option<T>, b: Option<T>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => {
            let ordering = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
            if descending {
                ordering.reverse()
            } else {
                ordering
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Raw query parameters as sent by the site. Empty strings count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingParams {
    pub lang: Option<String>,
    pub preisvon: Option<String>,
    pub preisbis: Option<String>,
    pub qmvon: Option<String>,
    pub qmbis: Option<String>,
    pub plz: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Validated filter for one aggregation run.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingQuery {
    pub language: Language,
    pub min_price: f64,
    pub max_price: f64,
    pub min_area: f64,
    pub max_area: f64,
    pub postal_code: String,
    pub sort: Option<ListingSort>,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            language: Language::De,
            min_price: DEFAULT_MIN_PRICE,
            max_price: DEFAULT_MAX_PRICE,
            min_area: DEFAULT_MIN_AREA,
            max_area: DEFAULT_MAX_AREA,
            postal_code: String::new(),
            sort: None,
        }
    }
}

impl ListingQuery {
    pub fn from_params(params: &ListingParams) -> Result<Self, QueryError> {
        let sort = match non_empty(&params.sort) {
            Some(raw) => Some(ListingSort::parse(raw)?),
            None => None,
        };

        Ok(Self {
            language: Language::from_param(params.lang.as_deref()),
            min_price: number_param("preisvon", &params.preisvon, DEFAULT_MIN_PRICE)?,
            max_price: number_param("preisbis", &params.preisbis, DEFAULT_MAX_PRICE)?,
            min_area: number_param("qmvon", &params.qmvon, DEFAULT_MIN_AREA)?,
            max_area: number_param("qmbis", &params.qmbis, DEFAULT_MAX_AREA)?,
            postal_code: non_empty(&params.plz).unwrap_or_default().to_string(),
            sort,
        })
    }

    /// Local re-check of the price floor; the provider's own filter is not trusted.
    pub fn admits_price(&self, listing: &Listing) -> bool {
        listing.effective_price() >= self.min_price
    }

    /// Query pairs forwarded to the provider, excluding paging.
    pub fn upstream_filters(&self) -> Vec<(&'static str, String)> {
        vec![
            ("culture", self.language.code().to_string()),
            ("filter[preis_von]", format_number(self.min_price)),
            ("filter[preis_bis]", format_number(self.max_price)),
            ("filter[wohnflaeche_von]", format_number(self.min_area)),
            ("filter[wohnflaeche_bis]", format_number(self.max_area)),
            ("filter[plz]", self.postal_code.clone()),
        ]
    }
}

fn non_empty(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

fn number_param(
    name: &'static str,
    raw: &Option<String>,
    default: f64,
) -> Result<f64, QueryError> {
    match non_empty(raw) {
        None => Ok(default),
        Some(value) => parse_decimal(value).ok_or_else(|| QueryError::InvalidNumber {
            name,
            value: value.to_string(),
        }),
    }
}

pub(crate) fn format_number(value: f64) -> String {
    format!("{value}")
}

/// Slice of an aggregated result requested by `page` and `limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: usize,
    pub limit: usize,
}

impl PageWindow {
    pub const DEFAULT_LIMIT: usize = 10;
    pub const MAX_LIMIT: usize = 100;

    pub fn from_params(params: &ListingParams) -> Result<Self, QueryError> {
        let page = count_param("page", &params.page)?.unwrap_or(1).max(1);
        let limit = count_param("limit", &params.limit)?
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT);
        Ok(Self { page, limit })
    }

    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

fn count_param(name: &'static str, raw: &Option<String>) -> Result<Option<usize>, QueryError> {
    match non_empty(raw) {
        None => Ok(None),
        Some(value) => value
            .parse::<usize>()
            .map(Some)
            .map_err(|_| QueryError::InvalidNumber {
                name,
                value: value.to_string(),
            }),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("query parameter '{name}' must be a number, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },
    #[error("unknown sort order '{0}'")]
    UnknownSort(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&str, &str)]) -> ListingParams {
        let mut map = serde_json::Map::new();
        for (key, value) in pairs {
            map.insert((*key).to_string(), json!(value));
        }
        serde_json::from_value(serde_json::Value::Object(map)).expect("params deserialize")
    }

    fn listing(id: &str, extra: serde_json::Value) -> Listing {
        let mut value = json!({ "id": id });
        if let (Some(target), Some(source)) = (value.as_object_mut(), extra.as_object()) {
            for (key, field) in source {
                target.insert(key.clone(), field.clone());
            }
        }
        serde_json::from_value(value).expect("listing parses")
    }

    #[test]
    fn defaults_apply_when_params_missing() {
        let query = ListingQuery::from_params(&ListingParams::default()).expect("defaults");
        assert_eq!(query, ListingQuery::default());
        assert_eq!(query.max_price, 9_999_999.0);
        assert_eq!(query.max_area, 9_999.0);
        assert!(query.postal_code.is_empty());
    }

    #[test]
    fn language_falls_back_to_english_for_unsupported_codes() {
        assert_eq!(Language::from_param(None), Language::De);
        assert_eq!(Language::from_param(Some("de")), Language::De);
        assert_eq!(Language::from_param(Some("en")), Language::En);
        assert_eq!(Language::from_param(Some("fr")), Language::En);
    }

    #[test]
    fn parses_filters_and_sort() {
        let query = ListingQuery::from_params(&params(&[
            ("lang", "en"),
            ("preisvon", "200000"),
            ("preisbis", "500000"),
            ("qmvon", "45.5"),
            ("plz", " 1190 "),
            ("sort", "flaeche_desc"),
        ]))
        .expect("query parses");

        assert_eq!(query.language, Language::En);
        assert_eq!(query.min_price, 200_000.0);
        assert_eq!(query.max_price, 500_000.0);
        assert_eq!(query.min_area, 45.5);
        assert_eq!(query.max_area, DEFAULT_MAX_AREA);
        assert_eq!(query.postal_code, "1190");
        assert_eq!(query.sort, Some(ListingSort::AreaDesc));
    }

    #[test]
    fn rejects_non_numeric_price() {
        let err = ListingQuery::from_params(&params(&[("preisvon", "cheap")]))
            .expect_err("price must be numeric");
        assert_eq!(
            err,
            QueryError::InvalidNumber {
                name: "preisvon",
                value: "cheap".to_string()
            }
        );
    }

    #[test]
    fn upstream_filters_carry_every_filter_field() {
        let query = ListingQuery {
            min_price: 200_000.0,
            postal_code: "1010".to_string(),
            ..ListingQuery::default()
        };
        let filters = query.upstream_filters();
        assert!(filters.contains(&("culture", "de".to_string())));
        assert!(filters.contains(&("filter[preis_von]", "200000".to_string())));
        assert!(filters.contains(&("filter[preis_bis]", "9999999".to_string())));
        assert!(filters.contains(&("filter[wohnflaeche_von]", "0".to_string())));
        assert!(filters.contains(&("filter[wohnflaeche_bis]", "9999".to_string())));
        assert!(filters.contains(&("filter[plz]", "1010".to_string())));
    }

    #[test]
    fn price_floor_is_inclusive() {
        let query = ListingQuery {
            min_price: 100.0,
            ..ListingQuery::default()
        };
        assert!(query.admits_price(&listing("a", json!({ "preis": "100" }))));
        assert!(!query.admits_price(&listing("b", json!({ "preis": "99.99" }))));
        assert!(!query.admits_price(&listing("c", json!({}))));
    }

    #[test]
    fn sort_is_stable_and_puts_missing_keys_last() {
        let mut listings = vec![
            listing("no-area", json!({})),
            listing("small", json!({ "wohnflaeche": "40" })),
            listing("large", json!({ "wohnflaeche": "120" })),
            listing("small-too", json!({ "wohnflaeche": "40" })),
        ];

        ListingSort::AreaAsc.apply(&mut listings);
        let ids: Vec<_> = listings.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["small", "small-too", "large", "no-area"]);

        ListingSort::AreaDesc.apply(&mut listings);
        let ids: Vec<_> = listings.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["large", "small", "small-too", "no-area"]);
    }

    #[test]
    fn unknown_sort_is_rejected() {
        let err = ListingQuery::from_params(&params(&[("sort", "random")]))
            .expect_err("sort must be known");
        assert_eq!(err, QueryError::UnknownSort("random".to_string()));
    }

    #[test]
    fn page_window_clamps_limit() {
        let window = PageWindow::from_params(&params(&[("page", "0"), ("limit", "500")]))
            .expect("window parses");
        assert_eq!(window, PageWindow { page: 1, limit: 100 });

        let window = PageWindow::from_params(&params(&[("page", "3"), ("limit", "10")]))
            .expect("window parses");
        assert_eq!(window.offset(), 20);
    }
}
