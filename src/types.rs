use crate::util::{de_opt_bool, de_opt_f64, de_opt_i64, de_opt_string, format_amount, format_pct};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

// ---- backend records --------------------------------------------------------
//
// Field names follow the backend's JSON keys. Every field is optional so a
// partial row still loads; consumers default what is missing.

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AccidentRecord {
    #[serde(default, deserialize_with = "de_opt_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub accident_date: Option<String>,
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub death_count: Option<i64>,
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub injured_count: Option<i64>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub district_id: Option<String>,
    #[serde(default)]
    pub district_name: Option<String>,
    #[serde(default)]
    pub city_name: Option<String>,
    #[serde(default)]
    pub province_name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub police_report_no: Option<String>,
}

impl AccidentRecord {
    pub fn deaths(&self) -> i64 {
        self.death_count.unwrap_or(0)
    }

    pub fn injured(&self) -> i64 {
        self.injured_count.unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SchoolRecord {
    #[serde(default, deserialize_with = "de_opt_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub district_id: Option<String>,
    #[serde(default)]
    pub district_name: Option<String>,
    #[serde(default)]
    pub city_name: Option<String>,
    #[serde(default)]
    pub province_name: Option<String>,
    /// Precomputed by the backend; only `Some(true)` counts as educated.
    #[serde(default, deserialize_with = "de_opt_bool")]
    pub is_educated: Option<bool>,
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub student_count: Option<i64>,
}

impl SchoolRecord {
    pub fn educated(&self) -> bool {
        self.is_educated == Some(true)
    }

    pub fn display_name(&self) -> String {
        non_blank(self.name.as_deref()).unwrap_or("Unknown School").to_string()
    }
}

/// Public entities (agencies, companies, communities) receiving training.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PublicEntityRecord {
    #[serde(default, deserialize_with = "de_opt_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub district_name: Option<String>,
    #[serde(default)]
    pub city_name: Option<String>,
    #[serde(default)]
    pub province_name: Option<String>,
    #[serde(default, deserialize_with = "de_opt_bool")]
    pub is_educated: Option<bool>,
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub employee_count: Option<i64>,
}

impl PublicEntityRecord {
    pub fn educated(&self) -> bool {
        self.is_educated == Some(true)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EventRecord {
    #[serde(default, deserialize_with = "de_opt_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub event_date: Option<String>,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub attendees_count: Option<i64>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EventRef {
    #[serde(default)]
    pub title: Option<String>,
}

/// Budget line for an event. JSON nests the event (`{"event": {"title"}}`);
/// flat CSV exports carry `event_title` instead.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BudgetRecord {
    #[serde(default)]
    pub event: Option<EventRef>,
    #[serde(default)]
    pub event_title: Option<String>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub budget_amount: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub actual_spent: Option<f64>,
}

impl BudgetRecord {
    pub fn title(&self) -> String {
        let nested = self.event.as_ref().and_then(|e| non_blank(e.title.as_deref()));
        nested
            .or_else(|| non_blank(self.event_title.as_deref()))
            .unwrap_or("Unknown Event")
            .to_string()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MarketShareSuggestion {
    #[serde(default, deserialize_with = "de_opt_string")]
    pub district_id: Option<String>,
    #[serde(default)]
    pub district_name: Option<String>,
    #[serde(default)]
    pub city_name: Option<String>,
    #[serde(default)]
    pub province_name: Option<String>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub market_share: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub competitor_share: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub total_sales: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub competitor_sales: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub monthly_difference: Option<f64>,
}

/// One district row of the server-side priority matrix.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PriorityItem {
    #[serde(default)]
    pub district_name: Option<String>,
    #[serde(default)]
    pub city_name: Option<String>,
    #[serde(default)]
    pub province_name: Option<String>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub market_share: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub total_accidents: Option<i64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub priority_score: Option<f64>,
    #[serde(default)]
    pub priority_level: Option<String>,
}

/// Pre-aggregated `{event_type, count}` pair from the dashboard-stats
/// endpoint. Some backend pages key the label as `category`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct CategoryCount {
    #[serde(default, alias = "category")]
    pub event_type: Option<String>,
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub count: Option<i64>,
}

pub(crate) fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

// ---- report rows --------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Tabled, PartialEq)]
pub struct TrendPoint {
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub label: String,
    #[serde(rename = "Accidents")]
    #[tabled(rename = "Accidents")]
    pub accidents: u64,
    #[serde(rename = "Deaths")]
    #[tabled(rename = "Deaths")]
    pub deaths: i64,
    #[serde(rename = "Injured")]
    #[tabled(rename = "Injured")]
    pub injured: i64,
}

#[derive(Debug, Clone, Serialize, Tabled, PartialEq)]
pub struct RankedRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Label")]
    #[tabled(rename = "Label")]
    pub label: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    #[tabled(display_with = "format_amount")]
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Tabled, PartialEq)]
pub struct EventTypeSlice {
    #[serde(rename = "EventType")]
    #[tabled(rename = "EventType")]
    pub event_type: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: i64,
    #[serde(rename = "Percentage")]
    #[tabled(rename = "Percentage")]
    #[tabled(display_with = "format_pct")]
    pub percentage: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Tabled, PartialEq)]
pub struct BudgetUtilizationRow {
    #[serde(rename = "Event")]
    #[tabled(rename = "Event")]
    pub event_title: String,
    #[serde(rename = "Budget")]
    #[tabled(rename = "Budget")]
    #[tabled(display_with = "format_amount")]
    pub budget_amount: f64,
    #[serde(rename = "Spent")]
    #[tabled(rename = "Spent")]
    #[tabled(display_with = "format_amount")]
    pub actual_spent: f64,
    #[serde(rename = "Utilization")]
    #[tabled(rename = "Utilization")]
    #[tabled(display_with = "format_pct")]
    pub utilization_pct: Option<f64>,
}
