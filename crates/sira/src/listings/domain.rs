use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Number of listings requested per upstream call.
pub const PAGE_SIZE: usize = 100;

/// Whether a listing is offered for sale or for rent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketingType {
    Kauf,
    MietePacht,
}

impl MarketingType {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "KAUF" => Some(Self::Kauf),
            "MIETE_PACHT" | "MIETE" | "PACHT" => Some(Self::MietePacht),
            _ => None,
        }
    }
}

/// Image grouping used by the listing detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImageGroup {
    Titelbild,
    Bild,
    Grundriss,
}

impl ImageGroup {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "TITELBILD" => Self::Titelbild,
            "GRUNDRISS" | "FLOORPLAN" => Self::Grundriss,
            _ => Self::Bild,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingImage {
    #[serde(default, alias = "pfad", deserialize_with = "lenient_string")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub titel: Option<String>,
    #[serde(
        default = "default_image_group",
        alias = "kategorie",
        deserialize_with = "image_group"
    )]
    pub gruppe: ImageGroup,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub reihenfolge: Option<u32>,
}

fn default_image_group() -> ImageGroup {
    ImageGroup::Bild
}

/// One real-estate object as delivered by the listings provider.
///
/// Known fields are typed; everything else the provider sends is kept in
/// `attributes` and written back out unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    #[serde(deserialize_with = "required_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub objektnummer: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub titel: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub beschreibung: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub plz: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ort: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub strasse: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lng: Option<f64>,
    #[serde(default, deserialize_with = "marketing_type")]
    pub vermarktungsart: Option<MarketingType>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub objektart: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub preis: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub kaufpreis: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub nettokaltmiete: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub gesamtmiete: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub wohnflaeche: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub nutzflaeche: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub anzahl_zimmer: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub erstes_bild: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub zweites_bild: Option<String>,
    #[serde(default, deserialize_with = "image_list")]
    pub bilder: Vec<ListingImage>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub kontakt_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub kontakt_email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub kontakt_telefon: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, Value>,
}

impl Listing {
    pub fn marketing_type(&self) -> MarketingType {
        self.vermarktungsart.unwrap_or(MarketingType::Kauf)
    }

    /// Rent when the listing is marketed for rent, otherwise the sale price.
    pub fn marketing_price(&self) -> Option<f64> {
        match self.marketing_type() {
            MarketingType::MietePacht => self.nettokaltmiete.or(self.gesamtmiete),
            MarketingType::Kauf => self.kaufpreis,
        }
    }

    /// Price used for local filtering and sorting. Missing prices count as zero.
    pub fn effective_price(&self) -> f64 {
        self.preis.or_else(|| self.marketing_price()).unwrap_or(0.0)
    }

    pub fn floor_area(&self) -> Option<f64> {
        self.wohnflaeche.or(self.nutzflaeche)
    }

    /// Title image: the explicit `TITELBILD`, else the first listed image.
    pub fn title_image(&self) -> Option<&str> {
        self.bilder
            .iter()
            .filter(|image| image.gruppe == ImageGroup::Titelbild)
            .min_by_key(|image| image.reihenfolge.unwrap_or(u32::MAX))
            .and_then(|image| image.url.as_deref())
            .or(self.erstes_bild.as_deref())
    }
}

/// One upstream batch, annotated with the offset it was fetched from.
#[derive(Debug, Clone, Default)]
pub struct ListingPage {
    pub offset: usize,
    pub listings: Vec<Listing>,
}

impl ListingPage {
    pub fn new(offset: usize, listings: Vec<Listing>) -> Self {
        Self { offset, listings }
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?))
}

fn required_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_string(deserializer)?
        .ok_or_else(|| serde::de::Error::custom("listing id must not be empty"))
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(number) => number.as_f64(),
        other => scalar_text(other).and_then(|text| parse_decimal(&text)),
    })
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_f64(deserializer)?
        .filter(|value| *value >= 0.0 && *value <= f64::from(u32::MAX))
        .map(|value| value as u32))
}

fn marketing_type<'de, D>(deserializer: D) -> Result<Option<MarketingType>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string(deserializer)?.and_then(|raw| MarketingType::parse(&raw)))
}

fn image_group<'de, D>(deserializer: D) -> Result<ImageGroup, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string(deserializer)?
        .map(|raw| ImageGroup::parse(&raw))
        .unwrap_or(ImageGroup::Bild))
}

/// Accepts `[image, ..]`, a bare image, or the XML wrapper `{ "bild": image | [image, ..] }`.
fn image_list<'de, D>(deserializer: D) -> Result<Vec<ListingImage>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("bild") {
            Some(Value::Array(items)) => items,
            Some(single) => vec![single],
            None if map.is_empty() => Vec::new(),
            None => vec![Value::Object(map)],
        },
        _ => Vec::new(),
    };

    items
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(serde::de::Error::custom))
        .collect()
}

/// Parses upstream decimals, accepting a comma as decimal separator.
pub(crate) fn parse_decimal(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<f64>()
        .ok()
        .or_else(|| trimmed.replace(',', ".").parse::<f64>().ok())
        .filter(|value| value.is_finite())
}
