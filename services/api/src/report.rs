use crate::infra::listing_aggregator;
use clap::Args;
use sira::config::AppConfig;
use sira::error::AppError;
use sira::listings::query::{
    DEFAULT_MAX_AREA, DEFAULT_MAX_PRICE, DEFAULT_MIN_AREA, DEFAULT_MIN_PRICE,
};
use sira::listings::{CatalogStats, Language, ListingQuery};
use std::fmt::Write;

#[derive(Args, Debug, Default)]
pub(crate) struct ListingSummaryArgs {
    /// Listing language (de or en; anything else falls back to en)
    #[arg(long)]
    pub(crate) lang: Option<String>,
    /// Minimum price in EUR
    #[arg(long)]
    pub(crate) min_price: Option<f64>,
    /// Maximum price in EUR
    #[arg(long)]
    pub(crate) max_price: Option<f64>,
    /// Minimum living area in m²
    #[arg(long)]
    pub(crate) min_area: Option<f64>,
    /// Maximum living area in m²
    #[arg(long)]
    pub(crate) max_area: Option<f64>,
    /// Postal code filter
    #[arg(long)]
    pub(crate) plz: Option<String>,
}

impl ListingSummaryArgs {
    fn query(&self) -> ListingQuery {
        ListingQuery {
            language: Language::from_param(self.lang.as_deref()),
            min_price: self.min_price.unwrap_or(DEFAULT_MIN_PRICE),
            max_price: self.max_price.unwrap_or(DEFAULT_MAX_PRICE),
            min_area: self.min_area.unwrap_or(DEFAULT_MIN_AREA),
            max_area: self.max_area.unwrap_or(DEFAULT_MAX_AREA),
            postal_code: self.plz.clone().unwrap_or_default(),
            sort: None,
        }
    }
}

pub(crate) async fn run_listings_summary(args: ListingSummaryArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let query = args.query();

    let listings = listing_aggregator(&config).collect(&query).await?;
    let stats = CatalogStats::from_listings(&listings);
    print!("{}", render_summary(&query, &stats));
    Ok(())
}

fn render_summary(query: &ListingQuery, stats: &CatalogStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "SIRA listings summary ({})", query.language.code());
    let _ = writeln!(
        out,
        "Filter: price {:.0}-{:.0} EUR, area {:.0}-{:.0} m², postal code {}",
        query.min_price,
        query.max_price,
        query.min_area,
        query.max_area,
        if query.postal_code.is_empty() {
            "any"
        } else {
            query.postal_code.as_str()
        }
    );
    let _ = writeln!(
        out,
        "Listings: {} ({} for sale, {} for rent)",
        stats.total_immobilien, stats.anzahl_kauf, stats.anzahl_miete
    );

    if stats.anzahl_kauf > 0 {
        let _ = writeln!(
            out,
            "Sale prices: avg {:.0} EUR (min {:.0}, max {:.0})",
            stats.avg_kaufpreis, stats.min_kaufpreis, stats.max_kaufpreis
        );
    }
    if stats.anzahl_miete > 0 {
        let _ = writeln!(
            out,
            "Rents: avg {:.0} EUR (min {:.0}, max {:.0})",
            stats.avg_miete, stats.min_miete, stats.max_miete
        );
    }
    if stats.avg_wohnflaeche > 0.0 {
        let _ = writeln!(out, "Average living area: {:.1} m²", stats.avg_wohnflaeche);
    }

    if !stats.objektarten.is_empty() {
        out.push_str("Property types:\n");
        for (kind, count) in &stats.objektarten {
            let _ = writeln!(out, "  - {kind}: {count}");
        }
    }

    let mut postal_codes: Vec<_> = stats.plz_verteilung.iter().collect();
    postal_codes.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    if !postal_codes.is_empty() {
        out.push_str("Top postal codes:\n");
        for (plz, count) in postal_codes.into_iter().take(5) {
            let _ = writeln!(out, "  - {plz}: {count}");
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sira::listings::Listing;

    fn listing(value: serde_json::Value) -> Listing {
        serde_json::from_value(value).expect("listing parses")
    }

    #[test]
    fn args_default_to_the_open_filter() {
        let query = ListingSummaryArgs::default().query();
        assert_eq!(query, ListingQuery::default());
    }

    #[test]
    fn summary_lists_counts_and_postal_codes() {
        let listings = vec![
            listing(json!({ "id": "1", "vermarktungsart": "KAUF", "kaufpreis": "300000", "plz": "1190", "objektart": "Wohnung" })),
            listing(json!({ "id": "2", "vermarktungsart": "KAUF", "kaufpreis": "500000", "plz": "1190", "objektart": "Haus" })),
            listing(json!({ "id": "3", "vermarktungsart": "MIETE_PACHT", "nettokaltmiete": "1200", "plz": "1010" })),
        ];
        let stats = CatalogStats::from_listings(&listings);
        let query = ListingSummaryArgs {
            lang: Some("en".to_string()),
            plz: None,
            ..ListingSummaryArgs::default()
        }
        .query();

        let text = render_summary(&query, &stats);
        assert!(text.starts_with("SIRA listings summary (en)"));
        assert!(text.contains("postal code any"));
        assert!(text.contains("Listings: 3 (2 for sale, 1 for rent)"));
        assert!(text.contains("Sale prices: avg 400000 EUR (min 300000, max 500000)"));
        assert!(text.contains("Rents: avg 1200 EUR"));
        assert!(text.contains("  - 1190: 2\n  - 1010: 1"));
    }
}
