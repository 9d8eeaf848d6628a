// Dashboard composition.
//
// `build_dashboard` runs every aggregation over a loaded `Dataset` and
// gathers the results into one serializable summary. Headline totals,
// budget utilization and recent activity live here; the charts, the
// priority matrix and the recommendations come from their own modules.
use crate::charts::{
    budget_by_event, count_event_types, event_type_distribution, monthly_accident_trend,
    publics_by_city, schools_by_province, wrap_label,
};
use crate::config::AppConfig;
use crate::loader::Dataset;
use crate::priority::{bucket_priorities, PriorityBuckets};
use crate::recommend::{recommend, RecommendationView, Recommendations};
use crate::types::{
    non_blank, BudgetRecord, BudgetUtilizationRow, EventRecord, EventTypeSlice, RankedRow,
    TrendPoint,
};
use crate::util::{parse_date_safe, percent_of};
use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::info;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HeadlineStats {
    pub total_schools: usize,
    pub educated_schools: usize,
    pub school_coverage_pct: Option<f64>,
    pub total_students: i64,
    pub total_publics: usize,
    pub educated_publics: usize,
    pub total_events: usize,
    pub total_attendees: i64,
    pub total_accidents: usize,
    pub total_deaths: i64,
    pub total_injured: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BudgetUtilization {
    pub rows: Vec<BudgetUtilizationRow>,
    pub total_budget: f64,
    pub total_spent: f64,
    pub overall_pct: Option<f64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecentEvent {
    pub title: String,
    pub event_date: Option<String>,
    pub event_type: Option<String>,
    pub status: Option<String>,
    pub attendees_count: i64,
}

/// A ranked series plus its axis labels wrapped for display.
#[derive(Debug, Clone, Serialize)]
pub struct RankedChart {
    pub rows: Vec<RankedRow>,
    pub wrapped_labels: Vec<Vec<String>>,
}

impl RankedChart {
    fn new(rows: Vec<RankedRow>, label_max_len: usize) -> Self {
        let wrapped_labels = rows.iter().map(|r| wrap_label(&r.label, label_max_len)).collect();
        RankedChart { rows, wrapped_labels }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub stats: HeadlineStats,
    pub monthly_trend: Vec<TrendPoint>,
    pub schools_by_province: RankedChart,
    pub publics_by_city: RankedChart,
    pub budget_by_event: RankedChart,
    pub event_types: Vec<EventTypeSlice>,
    pub budget_utilization: BudgetUtilization,
    pub recent_activity: Vec<RecentEvent>,
    pub priority: PriorityBuckets,
    pub recommendations: Recommendations,
    pub recommendation_view: RecommendationView,
}

pub fn headline_stats(data: &Dataset) -> HeadlineStats {
    let total_schools = data.schools.len();
    let educated_schools = data.schools.iter().filter(|s| s.educated()).count();
    HeadlineStats {
        total_schools,
        educated_schools,
        school_coverage_pct: percent_of(educated_schools as f64, total_schools as f64),
        total_students: saturating_total(data.schools.iter().map(|s| s.student_count)),
        total_publics: data.publics.len(),
        educated_publics: data.publics.iter().filter(|p| p.educated()).count(),
        total_events: data.events.len(),
        total_attendees: saturating_total(data.events.iter().map(|e| e.attendees_count)),
        total_accidents: data.accidents.len(),
        total_deaths: saturating_total(data.accidents.iter().map(|a| a.death_count)),
        total_injured: saturating_total(data.accidents.iter().map(|a| a.injured_count)),
    }
}

fn saturating_total(values: impl Iterator<Item = Option<i64>>) -> i64 {
    values.fold(0i64, |acc, v| acc.saturating_add(v.unwrap_or(0)))
}

/// Spent versus budgeted per budget line, in input order.
pub fn budget_utilization(budgets: &[BudgetRecord]) -> BudgetUtilization {
    let rows: Vec<BudgetUtilizationRow> = budgets
        .iter()
        .map(|b| {
            let budget_amount = b.budget_amount.unwrap_or(0.0);
            let actual_spent = b.actual_spent.unwrap_or(0.0);
            BudgetUtilizationRow {
                event_title: b.title(),
                budget_amount,
                actual_spent,
                utilization_pct: percent_of(actual_spent, budget_amount),
            }
        })
        .collect();
    let total_budget: f64 = rows.iter().map(|r| r.budget_amount).sum();
    let total_spent: f64 = rows.iter().map(|r| r.actual_spent).sum();
    BudgetUtilization {
        rows,
        total_budget,
        total_spent,
        overall_pct: percent_of(total_spent, total_budget),
    }
}

/// The `limit` most recent events, newest first. Undated events sort last.
pub fn recent_activity(events: &[EventRecord], limit: usize) -> Vec<RecentEvent> {
    let mut dated: Vec<(Option<NaiveDate>, &EventRecord)> = events
        .iter()
        .map(|e| (parse_date_safe(e.event_date.as_deref()), e))
        .collect();
    dated.sort_by(|a, b| match (a.0, b.0) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    dated
        .into_iter()
        .take(limit)
        .map(|(_, e)| RecentEvent {
            title: non_blank(e.title.as_deref()).unwrap_or("Untitled Event").to_string(),
            event_date: e.event_date.clone(),
            event_type: e.event_type.clone(),
            status: e.status.clone(),
            attendees_count: e.attendees_count.unwrap_or(0),
        })
        .collect()
}

pub fn build_dashboard(data: &Dataset, cfg: &AppConfig) -> DashboardSummary {
    let event_pairs = if data.event_types.is_empty() {
        count_event_types(&data.events)
    } else {
        data.event_types.clone()
    };
    let recommendations = recommend(&data.schools, &data.accidents, &data.market_share);
    let recommendation_view = recommendations.view();

    let summary = DashboardSummary {
        stats: headline_stats(data),
        monthly_trend: monthly_accident_trend(&data.accidents, cfg.trend_months),
        schools_by_province: RankedChart::new(
            schools_by_province(&data.schools, cfg.top_n),
            cfg.label_max_len,
        ),
        publics_by_city: RankedChart::new(
            publics_by_city(&data.publics, cfg.top_n),
            cfg.label_max_len,
        ),
        budget_by_event: RankedChart::new(
            budget_by_event(&data.budgets, cfg.top_n),
            cfg.label_max_len,
        ),
        event_types: event_type_distribution(&event_pairs),
        budget_utilization: budget_utilization(&data.budgets),
        recent_activity: recent_activity(&data.events, cfg.recent_activity),
        priority: bucket_priorities(&data.priority, cfg.priority_threshold),
        recommendations,
        recommendation_view,
    };
    info!(
        months = summary.monthly_trend.len(),
        priority_rows = summary.priority.total(),
        view = ?summary.recommendation_view,
        "dashboard built"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EventRef, SchoolRecord};

    fn event(title: &str, date: Option<&str>) -> EventRecord {
        EventRecord {
            title: Some(title.to_string()),
            event_date: date.map(str::to_string),
            ..EventRecord::default()
        }
    }

    #[test]
    fn recent_activity_is_newest_first_with_undated_last() {
        let events = vec![
            event("old", Some("2024-03-01")),
            event("undated", None),
            event("new", Some("2025-06-10T09:00:00Z")),
            event("mid", Some("2024-11-20")),
        ];
        let titles: Vec<String> =
            recent_activity(&events, 3).into_iter().map(|e| e.title).collect();
        assert_eq!(titles, vec!["new", "mid", "old"]);
        assert_eq!(recent_activity(&events, 10).last().unwrap().title, "undated");
    }

    #[test]
    fn budget_utilization_handles_zero_budget() {
        let budgets = vec![
            BudgetRecord {
                event: Some(EventRef { title: Some("Seminar".into()) }),
                budget_amount: Some(200.0),
                actual_spent: Some(150.0),
                ..BudgetRecord::default()
            },
            BudgetRecord {
                event_title: Some("Flat".into()),
                budget_amount: None,
                actual_spent: Some(10.0),
                ..BudgetRecord::default()
            },
        ];
        let u = budget_utilization(&budgets);
        assert_eq!(u.rows[0].utilization_pct, Some(75.0));
        assert_eq!(u.rows[1].event_title, "Flat");
        assert_eq!(u.rows[1].utilization_pct, None);
        assert_eq!(u.total_budget, 200.0);
        assert_eq!(u.total_spent, 160.0);
        assert_eq!(u.overall_pct, Some(80.0));
    }

    #[test]
    fn headline_stats_count_educated_schools() {
        let data = Dataset {
            schools: vec![
                SchoolRecord {
                    is_educated: Some(true),
                    student_count: Some(300),
                    ..Default::default()
                },
                SchoolRecord {
                    is_educated: Some(false),
                    student_count: None,
                    ..Default::default()
                },
                SchoolRecord { is_educated: None, student_count: Some(100), ..Default::default() },
                SchoolRecord { is_educated: Some(true), ..Default::default() },
            ],
            ..Dataset::default()
        };
        let s = headline_stats(&data);
        assert_eq!(s.total_schools, 4);
        assert_eq!(s.educated_schools, 2);
        assert_eq!(s.school_coverage_pct, Some(50.0));
        assert_eq!(s.total_students, 400);
        assert_eq!(headline_stats(&Dataset::default()).school_coverage_pct, None);
    }

    #[test]
    fn headline_totals_saturate_on_huge_counts() {
        let accidents: Vec<crate::types::AccidentRecord> = serde_json::from_str(
            r#"[{"death_count": 9000000000000000000, "injured_count": 1},
                {"death_count": 9000000000000000000, "injured_count": 2}]"#,
        )
        .unwrap();
        let data = Dataset { accidents, ..Dataset::default() };
        let s = headline_stats(&data);
        assert_eq!(s.total_deaths, i64::MAX);
        assert_eq!(s.total_injured, 3);
    }

    #[test]
    fn empty_dataset_builds_an_empty_dashboard() {
        let summary = build_dashboard(&Dataset::default(), &AppConfig::default());
        assert!(summary.monthly_trend.is_empty());
        assert!(summary.event_types.is_empty());
        assert_eq!(summary.priority.total(), 0);
        assert_eq!(summary.recommendation_view, RecommendationView::NoRecommendations);
    }

    #[test]
    fn raw_events_feed_the_distribution_when_no_pairs_exported() {
        let data = Dataset {
            events: vec![
                EventRecord { event_type: Some("seminar".into()), ..Default::default() },
                EventRecord { event_type: Some("seminar".into()), ..Default::default() },
                EventRecord { event_type: Some("seminar".into()), ..Default::default() },
                EventRecord { event_type: Some("workshop".into()), ..Default::default() },
            ],
            ..Dataset::default()
        };
        let summary = build_dashboard(&data, &AppConfig::default());
        let pcts: Vec<Option<f64>> = summary.event_types.iter().map(|s| s.percentage).collect();
        assert_eq!(pcts, vec![Some(75.0), Some(25.0)]);
    }
}
