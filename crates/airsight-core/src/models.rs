//! Payload types returned by the review backend.
//!
//! Every type here is decoded leniently: missing fields fall back to their
//! defaults and scalar fields accept either strings or numbers, since the
//! backend formats some metrics as text ("4.2 / 5") and others as numbers.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Rating categories in the order the rating distribution chart draws them.
pub const RATING_CATEGORIES: [&str; 7] = [
    "Seat Comfort",
    "Cabin & Staff Service",
    "Food & Beverages",
    "Inflight Entertainment",
    "Ground Service",
    "Wifi Connectivity",
    "Value For Money",
];

/// Categories used by the sub-item scoring comparison.
pub const SUB_ITEM_CATEGORIES: [&str; 7] = [
    "Seat Comfort",
    "Cabin Staff & Service",
    "Food & Beverages",
    "Inflight Entertainment",
    "Ground Service",
    "Wifi Connectivity",
    "Value for Money",
];

/// A scalar rendered as text regardless of its JSON type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Scalar(pub String);

impl Scalar {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(Scalar(match value {
            serde_json::Value::Null => String::new(),
            serde_json::Value::String(s) => s,
            serde_json::Value::Bool(b) => b.to_string(),
            serde_json::Value::Number(n) => n.to_string(),
            other => other.to_string(),
        }))
    }
}

/// Accepts numbers, numeric strings and null for a float field.
fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or_default(),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or_default(),
        _ => 0.0,
    })
}

fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    lenient_f64(deserializer).map(|v| if v.is_sign_negative() { 0 } else { v as u64 })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirlineInfo {
    pub name: String,
    pub image: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoredCategory {
    pub score: Scalar,
    pub category: Scalar,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatedUsers {
    pub count: Scalar,
    pub medium_number: Scalar,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverallScore {
    pub score: Scalar,
    pub rank: Scalar,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeRange {
    pub start: Scalar,
    pub end: Scalar,
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Metric tiles shown at the top of the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyData {
    pub top_rated_item: ScoredCategory,
    pub lowest_rated_item: ScoredCategory,
    pub total_rated_users: RatedUsers,
    pub overall_score: OverallScore,
    pub preferred_seat_type: Scalar,
    pub preferred_route: Scalar,
    pub review_time: TimeRange,
    pub flown_time: TimeRange,
}

/// One scatter point of the city distribution map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityPoint {
    pub name: Option<String>,
    pub lon: f64,
    pub lat: f64,
    pub weight: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCityPoint {
    Triple(Vec<f64>),
    Named {
        #[serde(default)]
        name: Option<String>,
        value: Vec<f64>,
    },
}

impl<'de> Deserialize<'de> for CityPoint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (name, values) = match RawCityPoint::deserialize(deserializer)? {
            RawCityPoint::Triple(values) => (None, values),
            RawCityPoint::Named { name, value } => (name, value),
        };
        if values.len() < 3 {
            return Err(serde::de::Error::invalid_length(
                values.len(),
                &"a [lon, lat, weight] triple",
            ));
        }
        Ok(CityPoint {
            name,
            lon: values[0],
            lat: values[1],
            weight: values[2],
        })
    }
}

/// Category name to six fractions, one per rating value 0..=5.
pub type RatingDistribution = BTreeMap<String, Vec<f64>>;

/// Feature name to regression coefficient.
pub type FeatureImportance = BTreeMap<String, f64>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubItemScoring {
    pub target_airline: BTreeMap<String, f64>,
    pub average_score: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordScore {
    #[serde(deserialize_with = "lenient_f64")]
    pub score: f64,
}

pub type WordDict = BTreeMap<String, WordScore>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordcloudData {
    pub pos_dict: WordDict,
    pub neg_dict: WordDict,
    #[serde(deserialize_with = "lenient_f64")]
    pub pos_score: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub neg_score: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub overall_score: f64,
    #[serde(deserialize_with = "lenient_u64")]
    pub pos_count: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub neg_count: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub overall_count: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub review_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TopRatedAirline {
    pub rank: Scalar,
    pub name: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub rating: f64,
    #[serde(deserialize_with = "lenient_u64")]
    pub review_count: u64,
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReviewRow {
    pub review_id: Scalar,
    pub title: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub score: f64,
    pub content: String,
    pub verified_type: String,
    pub user_name: String,
    pub country: String,
    pub review_date: String,
    pub aircraft: String,
    pub type_of_traveller: String,
    pub seat_type: String,
    pub flown_date: String,
    pub recommended: Scalar,
}

impl ReviewRow {
    /// Review date as a calendar date; `None` for "N/A" or malformed values.
    pub fn review_date_parsed(&self) -> Option<chrono::NaiveDate> {
        chrono::NaiveDate::parse_from_str(self.review_date.trim(), "%Y-%m-%d").ok()
    }

    /// Every displayable column joined, used by the global table filter.
    pub fn searchable_text(&self) -> String {
        let score = self.score.to_string();
        [
            self.review_id.as_str(),
            self.title.as_str(),
            score.as_str(),
            self.content.as_str(),
            self.verified_type.as_str(),
            self.user_name.as_str(),
            self.country.as_str(),
            self.review_date.as_str(),
            self.aircraft.as_str(),
            self.type_of_traveller.as_str(),
            self.seat_type.as_str(),
            self.flown_date.as_str(),
            self.recommended.as_str(),
        ]
        .join("\n")
    }
}

/// Result of submitting free text to the sentiment tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentResult {
    pub text: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub score: f64,
    pub sent_lab: Scalar,
    pub pos_dict: WordDict,
    pub neg_dict: WordDict,
}

/// Display label for a backend feature key such as `seatComfort`.
pub fn feature_label(key: &str) -> String {
    match key {
        "seatComfort" => "Seat Comfort".to_string(),
        "cabinStaffService" => "Cabin Staff & Service".to_string(),
        "foodBeverages" => "Food & Beverages".to_string(),
        "inflightEntertainment" => "Inflight Entertainment".to_string(),
        "groundService" => "Ground Service".to_string(),
        "wifiConnectivity" => "Wifi Connectivity".to_string(),
        "valueForMoney" => "Value for Money".to_string(),
        other => other.to_string(),
    }
}
