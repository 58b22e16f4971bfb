use std::collections::BTreeMap;

use serde::Serialize;

use super::domain::{Listing, MarketingType};
use super::query::PageWindow;

/// Figures shown on the landing page, derived from one aggregated result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogStats {
    pub total_immobilien: usize,
    pub anzahl_kauf: usize,
    pub anzahl_miete: usize,
    pub avg_kaufpreis: f64,
    pub avg_miete: f64,
    pub avg_wohnflaeche: f64,
    pub min_kaufpreis: f64,
    pub max_kaufpreis: f64,
    pub min_miete: f64,
    pub max_miete: f64,
    pub objektarten: BTreeMap<String, usize>,
    pub plz_verteilung: BTreeMap<String, usize>,
}

#[derive(Default)]
struct Spread {
    count: usize,
    sum: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl Spread {
    fn record(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = Some(self.min.map_or(value, |min| min.min(value)));
        self.max = Some(self.max.map_or(value, |max| max.max(value)));
    }

    fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

impl CatalogStats {
    pub fn from_listings(listings: &[Listing]) -> Self {
        let mut anzahl_kauf = 0;
        let mut anzahl_miete = 0;
        let mut sale = Spread::default();
        let mut rent = Spread::default();
        let mut area = Spread::default();
        let mut objektarten = BTreeMap::new();
        let mut plz_verteilung = BTreeMap::new();

        for listing in listings {
            match listing.marketing_type() {
                MarketingType::Kauf => {
                    anzahl_kauf += 1;
                    if let Some(price) = listing.marketing_price().or(listing.preis) {
                        sale.record(price);
                    }
                }
                MarketingType::MietePacht => {
                    anzahl_miete += 1;
                    if let Some(price) = listing.marketing_price().or(listing.preis) {
                        rent.record(price);
                    }
                }
            }

            if let Some(living_area) = listing.wohnflaeche {
                area.record(living_area);
            }
            if let Some(kind) = listing.objektart.as_deref() {
                *objektarten.entry(kind.to_string()).or_insert(0) += 1;
            }
            if let Some(plz) = listing.plz.as_deref() {
                *plz_verteilung.entry(plz.to_string()).or_insert(0) += 1;
            }
        }

        Self {
            total_immobilien: listings.len(),
            anzahl_kauf,
            anzahl_miete,
            avg_kaufpreis: sale.average(),
            avg_miete: rent.average(),
            avg_wohnflaeche: area.average(),
            min_kaufpreis: sale.min.unwrap_or(0.0),
            max_kaufpreis: sale.max.unwrap_or(0.0),
            min_miete: rent.min.unwrap_or(0.0),
            max_miete: rent.max.unwrap_or(0.0),
            objektarten,
            plz_verteilung,
        }
    }
}

/// Minimal projection for map pins.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    pub objekttitel: Option<String>,
    pub kaufpreis: Option<f64>,
    pub nettokaltmiete: Option<f64>,
    pub vermarktungsart: MarketingType,
    pub plz: Option<String>,
    pub ort: Option<String>,
    pub titelbild_url: Option<String>,
}

impl MapMarker {
    pub fn from_listing(listing: &Listing) -> Option<Self> {
        let (lat, lng) = (listing.lat?, listing.lng?);
        Some(Self {
            id: listing.id.clone(),
            lat,
            lng,
            objekttitel: listing.titel.clone(),
            kaufpreis: listing.kaufpreis,
            nettokaltmiete: listing.nettokaltmiete.or(listing.gesamtmiete),
            vermarktungsart: listing.marketing_type(),
            plz: listing.plz.clone(),
            ort: listing.ort.clone(),
            titelbild_url: listing.title_image().map(str::to_string),
        })
    }
}

pub fn map_markers(listings: &[Listing]) -> Vec<MapMarker> {
    listings.iter().filter_map(MapMarker::from_listing).collect()
}

pub fn find_listing(listings: Vec<Listing>, id: &str) -> Option<Listing> {
    listings.into_iter().find(|listing| listing.id == id)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

/// Cuts one page out of an aggregated result.
pub fn paginate(listings: Vec<Listing>, window: PageWindow) -> (Vec<Listing>, Pagination) {
    let total = listings.len();
    let total_pages = total.div_ceil(window.limit);
    let page: Vec<Listing> = listings
        .into_iter()
        .skip(window.offset())
        .take(window.limit)
        .collect();

    let pagination = Pagination {
        page: window.page,
        limit: window.limit,
        total,
        total_pages,
        has_next_page: window.page < total_pages,
        has_previous_page: window.page > 1,
    };
    (page, pagination)
}
