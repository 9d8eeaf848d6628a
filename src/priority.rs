// Education priority matrix.
//
// Levels are assigned by the backend from a 0-100 score; this module only
// buckets the rows by that level and orders each bucket by score. The
// threshold is carried for the caption only and never drives bucketing.
use crate::types::PriorityItem;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityLevel {
    Critical,
    High,
    Medium,
    Low,
}

impl PriorityLevel {
    pub const ALL: [PriorityLevel; 4] = [
        PriorityLevel::Critical,
        PriorityLevel::High,
        PriorityLevel::Medium,
        PriorityLevel::Low,
    ];

    /// Case-insensitive. Unrecognized or missing levels fall into `Low`.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("critical") => PriorityLevel::Critical,
            Some("high") => PriorityLevel::High,
            Some("medium") => PriorityLevel::Medium,
            _ => PriorityLevel::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityLevel::Critical => "critical",
            PriorityLevel::High => "high",
            PriorityLevel::Medium => "medium",
            PriorityLevel::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PriorityBuckets {
    pub critical: Vec<PriorityItem>,
    pub high: Vec<PriorityItem>,
    pub medium: Vec<PriorityItem>,
    pub low: Vec<PriorityItem>,
    /// Display-only cut-off shown alongside the matrix.
    pub threshold: Option<f64>,
}

impl PriorityBuckets {
    pub fn bucket(&self, level: PriorityLevel) -> &[PriorityItem] {
        match level {
            PriorityLevel::Critical => &self.critical,
            PriorityLevel::High => &self.high,
            PriorityLevel::Medium => &self.medium,
            PriorityLevel::Low => &self.low,
        }
    }

    /// One line per level, e.g. `critical: 3  high: 1  medium: 0  low: 7`.
    pub fn counts_line(&self) -> String {
        PriorityLevel::ALL
            .iter()
            .map(|l| format!("{}: {}", l.as_str(), self.bucket(*l).len()))
            .collect::<Vec<_>>()
            .join("  ")
    }

    /// `(critical, high, medium, low)` bucket sizes.
    pub fn counts(&self) -> (usize, usize, usize, usize) {
        (self.critical.len(), self.high.len(), self.medium.len(), self.low.len())
    }

    pub fn total(&self) -> usize {
        self.critical.len() + self.high.len() + self.medium.len() + self.low.len()
    }

    pub fn caption(&self) -> String {
        match self.threshold {
            Some(t) => format!("Districts scoring {:.0} or above need urgent education", t),
            None => "Districts ranked by education priority".to_string(),
        }
    }
}

/// Missing or non-finite scores sort as 0.
pub fn score_of(item: &PriorityItem) -> f64 {
    item.priority_score.filter(|s| s.is_finite()).unwrap_or(0.0)
}

fn by_score_desc(a: &PriorityItem, b: &PriorityItem) -> Ordering {
    score_of(b).partial_cmp(&score_of(a)).unwrap_or(Ordering::Equal)
}

/// Partition `items` into the four levels, each ordered by score
/// descending. Equal scores keep their input order.
pub fn bucket_priorities(items: &[PriorityItem], threshold: Option<f64>) -> PriorityBuckets {
    let mut buckets = PriorityBuckets {
        threshold,
        ..PriorityBuckets::default()
    };
    for item in items {
        let target = match PriorityLevel::parse(item.priority_level.as_deref()) {
            PriorityLevel::Critical => &mut buckets.critical,
            PriorityLevel::High => &mut buckets.high,
            PriorityLevel::Medium => &mut buckets.medium,
            PriorityLevel::Low => &mut buckets.low,
        };
        target.push(item.clone());
    }
    // `sort_by` is stable.
    buckets.critical.sort_by(by_score_desc);
    buckets.high.sort_by(by_score_desc);
    buckets.medium.sort_by(by_score_desc);
    buckets.low.sort_by(by_score_desc);

    let (c, h, m, l) = buckets.counts();
    debug!(critical = c, high = h, medium = m, low = l, "priority buckets");
    buckets
}
