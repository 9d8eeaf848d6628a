// "What to do next month" recommendations.
//
// Three independent picks: the district with the most schools still waiting
// for training, the district with the most accidents, and the district with
// the highest market share. Each pick runs on its own input and may be
// absent without affecting the others.
use crate::district::DistrictKey;
use crate::types::{AccidentRecord, MarketShareSuggestion, SchoolRecord};
use crate::util::group_ordered;
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UneducatedSchoolsRecommendation {
    pub district_name: String,
    pub city_name: String,
    pub province_name: String,
    pub count: usize,
    /// Names in the order they were encountered.
    pub schools: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AccidentRecommendation {
    pub district_name: String,
    pub city_name: String,
    pub province_name: String,
    pub count: usize,
    pub deaths: i64,
    pub injured: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Recommendations {
    pub uneducated_schools: Option<UneducatedSchoolsRecommendation>,
    pub accidents: Option<AccidentRecommendation>,
    pub market_share: Option<MarketShareSuggestion>,
}

/// What the dashboard should render for the recommendation panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationView {
    /// All three picks are absent; show the explicit empty message.
    NoRecommendations,
    Available,
}

impl Recommendations {
    pub fn is_empty(&self) -> bool {
        self.uneducated_schools.is_none() && self.accidents.is_none() && self.market_share.is_none()
    }

    pub fn view(&self) -> RecommendationView {
        if self.is_empty() {
            RecommendationView::NoRecommendations
        } else {
            RecommendationView::Available
        }
    }

    /// Human-readable lines for console output.
    pub fn summary_lines(&self) -> Vec<String> {
        if self.is_empty() {
            return vec!["No recommendations available for next month.".to_string()];
        }
        let mut lines = Vec::new();
        if let Some(r) = &self.uneducated_schools {
            lines.push(format!(
                "Educate schools in {} ({}, {}): {} school(s) not yet trained: {}",
                r.district_name,
                r.city_name,
                r.province_name,
                r.count,
                r.schools.join(", ")
            ));
        }
        if let Some(r) = &self.accidents {
            lines.push(format!(
                "Focus on accident hotspot {} ({}, {}): {} accident(s), {} death(s), {} injured",
                r.district_name, r.city_name, r.province_name, r.count, r.deaths, r.injured
            ));
        }
        if let Some(r) = &self.market_share {
            let key = DistrictKey::resolve(
                r.district_name.as_deref(),
                r.city_name.as_deref(),
                r.province_name.as_deref(),
            );
            lines.push(format!(
                "Strongest market in {} ({}, {}): {:.2}% share",
                key.name(),
                key.city(),
                key.province(),
                r.market_share.unwrap_or(0.0)
            ));
        }
        lines
    }
}

fn school_key(s: &SchoolRecord) -> DistrictKey {
    DistrictKey::resolve(
        s.district_name.as_deref(),
        s.city_name.as_deref(),
        s.province_name.as_deref(),
    )
}

fn accident_key(a: &AccidentRecord) -> DistrictKey {
    DistrictKey::resolve(
        a.district_name.as_deref(),
        a.city_name.as_deref(),
        a.province_name.as_deref(),
    )
}

/// District with the most schools whose `is_educated` is not `true`.
pub fn recommend_uneducated_schools(
    schools: &[SchoolRecord],
) -> Option<UneducatedSchoolsRecommendation> {
    let mut groups = group_ordered(schools, school_key, |names: &mut Vec<String>, s| {
        if !s.educated() {
            names.push(s.display_name());
        }
    });
    // Districts whose schools are all educated end up with no names.
    groups.retain(|(k, names)| k.is_known() && !names.is_empty());
    groups.sort_by(|a, b| b.1.len().cmp(&a.1.len()));
    groups.into_iter().next().map(|(k, names)| UneducatedSchoolsRecommendation {
        district_name: k.name().to_string(),
        city_name: k.city().to_string(),
        province_name: k.province().to_string(),
        count: names.len(),
        schools: names,
    })
}

#[derive(Default)]
struct AccidentAcc {
    count: usize,
    deaths: i64,
    injured: i64,
}

/// District with the most accident records.
pub fn recommend_accident_district(
    accidents: &[AccidentRecord],
) -> Option<AccidentRecommendation> {
    let mut groups = group_ordered(accidents, accident_key, |acc: &mut AccidentAcc, a| {
        acc.count += 1;
        acc.deaths = acc.deaths.saturating_add(a.deaths());
        acc.injured = acc.injured.saturating_add(a.injured());
    });
    groups.retain(|(k, _)| k.is_known());
    groups.sort_by(|a, b| b.1.count.cmp(&a.1.count));
    groups.into_iter().next().map(|(k, acc)| AccidentRecommendation {
        district_name: k.name().to_string(),
        city_name: k.city().to_string(),
        province_name: k.province().to_string(),
        count: acc.count,
        deaths: acc.deaths,
        injured: acc.injured,
    })
}

/// Suggestion with the highest market share; missing shares count as 0.
pub fn recommend_market_share(
    suggestions: &[MarketShareSuggestion],
) -> Option<MarketShareSuggestion> {
    let mut ranked: Vec<&MarketShareSuggestion> = suggestions.iter().collect();
    ranked.sort_by(|a, b| {
        let (a, b) = (a.market_share.unwrap_or(0.0), b.market_share.unwrap_or(0.0));
        b.partial_cmp(&a).unwrap_or(Ordering::Equal)
    });
    ranked.first().map(|s| (*s).clone())
}

pub fn recommend(
    schools: &[SchoolRecord],
    accidents: &[AccidentRecord],
    market_share: &[MarketShareSuggestion],
) -> Recommendations {
    Recommendations {
        uneducated_schools: recommend_uneducated_schools(schools),
        accidents: recommend_accident_district(accidents),
        market_share: recommend_market_share(market_share),
    }
}
