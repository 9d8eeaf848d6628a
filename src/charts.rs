// Chart-ready series for the dashboard.
//
// Every function here is a pure reshaping of a flat record list into
// label/value rows. Nothing is rendered; the rows are written to CSV and
// previewed as tables by the caller.
use crate::types::{
    non_blank, AccidentRecord, BudgetRecord, CategoryCount, EventRecord, EventTypeSlice,
    PublicEntityRecord, RankedRow, SchoolRecord, TrendPoint,
};
use crate::util::{group_ordered, parse_date_safe, percent_of};
use chrono::{Datelike, NaiveDate};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

pub const DEFAULT_TOP_N: usize = 10;
pub const DEFAULT_TREND_MONTHS: usize = 12;
pub const DEFAULT_LABEL_MAX_LEN: usize = 14;

fn month_label(year: i32, month: u32) -> String {
    match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(d) => d.format("%b %Y").to_string(),
        None => format!("{:02}/{}", month, year),
    }
}

/// Accidents, deaths and injuries per calendar month, oldest first, keeping
/// only the most recent `max_months` months. Rows without a parseable date
/// are dropped.
pub fn monthly_accident_trend(accidents: &[AccidentRecord], max_months: usize) -> Vec<TrendPoint> {
    let mut buckets: BTreeMap<(i32, u32), (u64, i64, i64)> = BTreeMap::new();
    let mut skipped = 0usize;
    for a in accidents {
        let Some(date) = parse_date_safe(a.accident_date.as_deref()) else {
            skipped += 1;
            continue;
        };
        let e = buckets.entry((date.year(), date.month())).or_insert((0, 0, 0));
        e.0 += 1;
        e.1 = e.1.saturating_add(a.deaths());
        e.2 = e.2.saturating_add(a.injured());
    }
    if skipped > 0 {
        debug!(skipped, "accidents without a usable date left out of trend");
    }

    let drop = buckets.len().saturating_sub(max_months);
    buckets
        .into_iter()
        .skip(drop)
        .map(|((year, month), (accidents, deaths, injured))| TrendPoint {
            label: month_label(year, month),
            accidents,
            deaths,
            injured,
        })
        .collect()
}

/// Group by `key_of`, sum `measure`, rank descending and keep the top `n`.
/// Equal totals keep the order in which their groups first appeared.
pub fn top_n_by<T, FK, FV>(items: &[T], key_of: FK, measure: FV, n: usize) -> Vec<RankedRow>
where
    FK: Fn(&T) -> String,
    FV: Fn(&T) -> f64,
{
    let mut groups = group_ordered(items, key_of, |total: &mut f64, item| {
        let v = measure(item);
        if v.is_finite() {
            *total += v;
        }
    });
    groups.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    groups
        .into_iter()
        .take(n)
        .enumerate()
        .map(|(idx, (label, value))| RankedRow {
            rank: idx + 1,
            label,
            value,
        })
        .collect()
}

pub fn schools_by_province(schools: &[SchoolRecord], n: usize) -> Vec<RankedRow> {
    top_n_by(
        schools,
        |s| non_blank(s.province_name.as_deref()).unwrap_or("Unknown Province").to_string(),
        |_| 1.0,
        n,
    )
}

pub fn publics_by_city(publics: &[PublicEntityRecord], n: usize) -> Vec<RankedRow> {
    top_n_by(
        publics,
        |p| non_blank(p.city_name.as_deref()).unwrap_or("Unknown City").to_string(),
        |_| 1.0,
        n,
    )
}

pub fn budget_by_event(budgets: &[BudgetRecord], n: usize) -> Vec<RankedRow> {
    top_n_by(budgets, BudgetRecord::title, |b| b.budget_amount.unwrap_or(0.0), n)
}

/// Count raw events per type in first-seen order, for when the backend did
/// not send the pre-aggregated pairs.
pub fn count_event_types(events: &[EventRecord]) -> Vec<CategoryCount> {
    group_ordered(
        events,
        |e| non_blank(e.event_type.as_deref()).unwrap_or("Unknown Type").to_string(),
        |count: &mut i64, _| *count += 1,
    )
    .into_iter()
    .map(|(event_type, count)| CategoryCount {
        event_type: Some(event_type),
        count: Some(count),
    })
    .collect()
}

/// Map `{event_type, count}` pairs to slices with their share of the total.
/// No grouping happens here. When the total is zero the percentage is
/// `None`.
pub fn event_type_distribution(pairs: &[CategoryCount]) -> Vec<EventTypeSlice> {
    let counts: Vec<i64> = pairs.iter().map(|p| p.count.unwrap_or(0).max(0)).collect();
    // Summed as f64 so very large backend counts cannot overflow.
    let total: f64 = counts.iter().map(|c| *c as f64).sum();
    pairs
        .iter()
        .zip(counts)
        .map(|(p, count)| EventTypeSlice {
            event_type: non_blank(p.event_type.as_deref())
                .unwrap_or("Unknown Type")
                .to_string(),
            count,
            percentage: percent_of(count as f64, total),
        })
        .collect()
}

/// Greedily pack whitespace-separated words into lines of at most
/// `max_len` characters. A word longer than `max_len` is split into
/// `max_len`-sized pieces, each on its own line.
pub fn wrap_label(text: &str, max_len: usize) -> Vec<String> {
    let max = max_len.max(1);
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if word_len > max {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            lines.extend(chars.chunks(max).map(|c| c.iter().collect::<String>()));
            continue;
        }
        if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= max {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
            current_len = word_len;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accident_on(date: Option<&str>, deaths: i64, injured: i64) -> AccidentRecord {
        AccidentRecord {
            accident_date: date.map(str::to_string),
            death_count: Some(deaths),
            injured_count: Some(injured),
            ..AccidentRecord::default()
        }
    }

    #[test]
    fn monthly_trend_sums_per_month_in_order() {
        let rows = vec![
            accident_on(Some("2025-02-03"), 1, 2),
            accident_on(Some("2025-01-20T08:00:00Z"), 0, 1),
            accident_on(Some("2025-02-28"), 2, 0),
            accident_on(None, 5, 5),
            accident_on(Some("not a date"), 5, 5),
        ];
        let trend = monthly_accident_trend(&rows, DEFAULT_TREND_MONTHS);
        assert_eq!(
            trend,
            vec![
                TrendPoint { label: "Jan 2025".into(), accidents: 1, deaths: 0, injured: 1 },
                TrendPoint { label: "Feb 2025".into(), accidents: 2, deaths: 3, injured: 2 },
            ]
        );
    }

    #[test]
    fn monthly_trend_keeps_most_recent_twelve_months() {
        let rows: Vec<AccidentRecord> = (0..18)
            .map(|i| {
                let year = 2024 + i / 12;
                let month = i % 12 + 1;
                accident_on(Some(&format!("{}-{:02}-15", year, month)), 0, 0)
            })
            .rev()
            .collect();
        let trend = monthly_accident_trend(&rows, DEFAULT_TREND_MONTHS);
        assert_eq!(trend.len(), 12);
        assert_eq!(trend[0].label, "Jul 2024");
        assert_eq!(trend[11].label, "Jun 2025");
    }

    #[test]
    fn monthly_trend_saturates_huge_counts() {
        let rows = vec![
            accident_on(Some("2025-01-10"), 9_000_000_000_000_000_000, 1),
            accident_on(Some("2025-01-20"), 9_000_000_000_000_000_000, 1),
        ];
        let trend = monthly_accident_trend(&rows, DEFAULT_TREND_MONTHS);
        assert_eq!(trend.len(), 1);
        assert_eq!(trend[0].accidents, 2);
        assert_eq!(trend[0].deaths, i64::MAX);
        assert_eq!(trend[0].injured, 2);
    }

    #[test]
    fn monthly_trend_orders_across_year_boundary() {
        let rows = vec![
            accident_on(Some("2025-01-01"), 0, 0),
            accident_on(Some("2024-12-31"), 0, 0),
        ];
        let labels: Vec<String> =
            monthly_accident_trend(&rows, 12).into_iter().map(|t| t.label).collect();
        assert_eq!(labels, vec!["Dec 2024", "Jan 2025"]);
    }

    #[test]
    fn top_n_limits_to_ten_and_sorts_descending() {
        let schools: Vec<SchoolRecord> = (0..15)
            .flat_map(|p| {
                (0..=p).map(move |_| SchoolRecord {
                    province_name: Some(format!("Province {}", p)),
                    ..SchoolRecord::default()
                })
            })
            .collect();
        let ranked = schools_by_province(&schools, DEFAULT_TOP_N);
        assert_eq!(ranked.len(), 10);
        assert_eq!(ranked[0].label, "Province 14");
        assert_eq!(ranked[0].value, 15.0);
        assert!(ranked.windows(2).all(|w| w[0].value >= w[1].value));
        assert_eq!(ranked.iter().map(|r| r.rank).collect::<Vec<_>>(), (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn top_n_with_few_groups_returns_all_and_ties_keep_first_seen() {
        let publics = vec![
            PublicEntityRecord { city_name: Some("Beta".into()), ..Default::default() },
            PublicEntityRecord { city_name: Some("Alpha".into()), ..Default::default() },
            PublicEntityRecord { city_name: None, ..Default::default() },
        ];
        let ranked = publics_by_city(&publics, DEFAULT_TOP_N);
        let labels: Vec<&str> = ranked.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["Beta", "Alpha", "Unknown City"]);
    }

    #[test]
    fn budget_ranking_sums_amounts_per_event() {
        let budgets: Vec<BudgetRecord> = serde_json::from_str(
            r#"[
                {"event": {"title": "Seminar A"}, "budget_amount": "1,000", "actual_spent": 800},
                {"event": {"title": "Workshop"}, "budget_amount": 1500},
                {"event": {"title": "Seminar A"}, "budget_amount": 700.5},
                {"budget_amount": null}
            ]"#,
        )
        .unwrap();
        let ranked = budget_by_event(&budgets, DEFAULT_TOP_N);
        assert_eq!(ranked[0].label, "Seminar A");
        assert_eq!(ranked[0].value, 1700.5);
        assert_eq!(ranked[1].label, "Workshop");
        assert_eq!(ranked[2].label, "Unknown Event");
        assert_eq!(ranked[2].value, 0.0);
    }

    #[test]
    fn event_type_percentages() {
        let pairs = vec![
            CategoryCount { event_type: Some("seminar".into()), count: Some(3) },
            CategoryCount { event_type: Some("workshop".into()), count: Some(1) },
        ];
        let slices = event_type_distribution(&pairs);
        assert_eq!(slices[0].percentage, Some(75.0));
        assert_eq!(slices[1].percentage, Some(25.0));
    }

    #[test]
    fn event_type_percentages_sum_to_about_one_hundred() {
        let pairs: Vec<CategoryCount> = [1, 1, 1, 7, 13]
            .iter()
            .enumerate()
            .map(|(i, c)| CategoryCount { event_type: Some(format!("t{}", i)), count: Some(*c) })
            .collect();
        let sum: f64 = event_type_distribution(&pairs).iter().filter_map(|s| s.percentage).sum();
        assert!((sum - 100.0).abs() <= 0.05 * pairs.len() as f64, "sum was {}", sum);
    }

    #[test]
    fn event_type_huge_counts_do_not_overflow() {
        let pairs = vec![
            CategoryCount {
                event_type: Some("seminar".into()),
                count: Some(9_000_000_000_000_000_000),
            },
            CategoryCount {
                event_type: Some("workshop".into()),
                count: Some(9_000_000_000_000_000_000),
            },
        ];
        let pcts: Vec<Option<f64>> =
            event_type_distribution(&pairs).iter().map(|s| s.percentage).collect();
        assert_eq!(pcts, vec![Some(50.0), Some(50.0)]);
    }

    #[test]
    fn category_keyed_pairs_keep_their_labels() {
        let pairs: Vec<CategoryCount> = serde_json::from_str(
            r#"[{"category": "seminar", "count": 3}, {"category": "workshop", "count": 1}]"#,
        )
        .unwrap();
        let slices = event_type_distribution(&pairs);
        let labels: Vec<&str> = slices.iter().map(|s| s.event_type.as_str()).collect();
        assert_eq!(labels, vec!["seminar", "workshop"]);
        assert_eq!(slices[0].percentage, Some(75.0));
    }

    #[test]
    fn event_type_zero_total_is_not_computable() {
        let pairs = vec![CategoryCount { event_type: Some("seminar".into()), count: Some(0) }];
        assert_eq!(event_type_distribution(&pairs)[0].percentage, None);
        assert!(event_type_distribution(&[]).is_empty());
    }

    #[test]
    fn counts_raw_events_by_type_in_first_seen_order() {
        let events = vec![
            EventRecord { event_type: Some("workshop".into()), ..Default::default() },
            EventRecord { event_type: Some("seminar".into()), ..Default::default() },
            EventRecord { event_type: Some("workshop".into()), ..Default::default() },
            EventRecord::default(),
        ];
        let pairs = count_event_types(&events);
        assert_eq!(
            pairs,
            vec![
                CategoryCount { event_type: Some("workshop".into()), count: Some(2) },
                CategoryCount { event_type: Some("seminar".into()), count: Some(1) },
                CategoryCount { event_type: Some("Unknown Type".into()), count: Some(1) },
            ]
        );
    }

    #[test]
    fn wraps_words_greedily() {
        assert_eq!(
            wrap_label("Road safety education seminar", DEFAULT_LABEL_MAX_LEN),
            vec!["Road safety", "education", "seminar"]
        );
        assert!(wrap_label("   ", 14).is_empty());
    }

    #[test]
    fn splits_words_longer_than_the_limit() {
        assert_eq!(
            wrap_label("Kecamatan Tanjungpriokbarat", 10),
            vec!["Kecamatan", "Tanjungpri", "okbarat"]
        );
        assert_eq!(wrap_label("abc", 0), vec!["a", "b", "c"]);
    }

    #[test]
    fn wrapped_lines_respect_limit_and_keep_every_character() {
        let text = "Sekolah Menengah Kejuruan Negeri 1 Surabaya Timur Extraordinarilylongword end";
        for max in 1..=20 {
            let lines = wrap_label(text, max);
            assert!(lines.iter().all(|l| l.chars().count() <= max), "max {}: {:?}", max, lines);
            let rebuilt: String = lines.concat().chars().filter(|c| !c.is_whitespace()).collect();
            let original: String = text.chars().filter(|c| !c.is_whitespace()).collect();
            assert_eq!(rebuilt, original);
        }
        let lines = wrap_label("a bb ccc dddd", 6);
        let words: Vec<&str> = lines.iter().flat_map(|l| l.split_whitespace()).collect();
        assert_eq!(words, vec!["a", "bb", "ccc", "dddd"]);
    }
}
