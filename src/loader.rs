// Loading backend exports from disk.
//
// Each collection is a JSON or CSV file named after it. JSON may be a bare
// array or a paginated page (`{"count", "next", "previous", "results"}`).
// Rows that fail to deserialize are counted and skipped; a missing file is
// an empty collection.
use crate::error::{ReportError, Result};
use crate::types::{
    AccidentRecord, BudgetRecord, CategoryCount, EventRecord, MarketShareSuggestion,
    PriorityItem, PublicEntityRecord, SchoolRecord,
};
use csv::{ReaderBuilder, Trim};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub accidents: Vec<AccidentRecord>,
    pub schools: Vec<SchoolRecord>,
    pub publics: Vec<PublicEntityRecord>,
    pub events: Vec<EventRecord>,
    pub budgets: Vec<BudgetRecord>,
    pub market_share: Vec<MarketShareSuggestion>,
    pub priority: Vec<PriorityItem>,
    /// Pre-aggregated event-type counts; empty when the backend did not
    /// export them.
    pub event_types: Vec<CategoryCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionReport {
    pub name: String,
    pub path: Option<PathBuf>,
    pub rows: usize,
    pub parse_errors: usize,
}

impl CollectionReport {
    pub fn is_missing(&self) -> bool {
        self.path.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub collections: Vec<CollectionReport>,
}

impl LoadReport {
    pub fn total_rows(&self) -> usize {
        self.collections.iter().map(|c| c.rows).sum()
    }

    pub fn parse_errors(&self) -> usize {
        self.collections.iter().map(|c| c.parse_errors).sum()
    }

    pub fn missing(&self) -> Vec<&str> {
        self.collections
            .iter()
            .filter(|c| c.is_missing())
            .map(|c| c.name.as_str())
            .collect()
    }
}

/// Load one collection file. Returns the parsed rows and how many rows were
/// skipped because they could not be deserialized.
pub fn load_collection<T: DeserializeOwned>(path: &Path) -> Result<(Vec<T>, usize)> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => Err(ReportError::UnsupportedFormat(format!(
            "{} (extension {:?})",
            path.display(),
            other
        ))),
    }
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<(Vec<T>, usize)> {
    let raw = std::fs::read_to_string(path)?;
    let doc: Value = serde_json::from_str(&raw)?;
    let items = match doc {
        Value::Array(items) => items,
        Value::Object(mut page) => match page.remove("results") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(ReportError::UnsupportedFormat(format!(
                    "{}: expected an array or a page with `results`",
                    path.display()
                )))
            }
        },
        _ => {
            return Err(ReportError::UnsupportedFormat(format!(
                "{}: expected an array or a page with `results`",
                path.display()
            )))
        }
    };

    let mut rows = Vec::with_capacity(items.len());
    let mut parse_errors = 0usize;
    for item in items {
        match serde_json::from_value::<T>(item) {
            Ok(r) => rows.push(r),
            Err(e) => {
                parse_errors += 1;
                warn!(file = %path.display(), error = %e, "skipping malformed row");
            }
        }
    }
    Ok((rows, parse_errors))
}

fn load_csv<T: DeserializeOwned>(path: &Path) -> Result<(Vec<T>, usize)> {
    let mut rdr = ReaderBuilder::new().flexible(true).trim(Trim::All).from_path(path)?;
    let mut rows = Vec::new();
    let mut parse_errors = 0usize;
    for result in rdr.deserialize::<T>() {
        match result {
            Ok(r) => rows.push(r),
            Err(e) => {
                parse_errors += 1;
                warn!(file = %path.display(), error = %e, "skipping malformed row");
            }
        }
    }
    Ok((rows, parse_errors))
}

fn find_export(dir: &Path, name: &str) -> Option<PathBuf> {
    ["json", "csv"]
        .iter()
        .map(|ext| dir.join(format!("{}.{}", name, ext)))
        .find(|p| p.is_file())
}

fn load_named<T: DeserializeOwned>(
    dir: &Path,
    name: &str,
    report: &mut LoadReport,
) -> Result<Vec<T>> {
    let Some(path) = find_export(dir, name) else {
        warn!(
            collection = name,
            dir = %dir.display(),
            "no export found, using an empty collection"
        );
        report.collections.push(CollectionReport {
            name: name.to_string(),
            path: None,
            rows: 0,
            parse_errors: 0,
        });
        return Ok(Vec::new());
    };
    let (rows, parse_errors) = load_collection::<T>(&path)?;
    info!(collection = name, rows = rows.len(), parse_errors, "loaded export");
    report.collections.push(CollectionReport {
        name: name.to_string(),
        path: Some(path),
        rows: rows.len(),
        parse_errors,
    });
    Ok(rows)
}

/// Load every collection the dashboard uses from `dir`.
pub fn load_dataset(dir: &Path) -> Result<(Dataset, LoadReport)> {
    let mut report = LoadReport::default();
    let data = Dataset {
        accidents: load_named(dir, "accidents", &mut report)?,
        schools: load_named(dir, "schools", &mut report)?,
        publics: load_named(dir, "publics", &mut report)?,
        events: load_named(dir, "events", &mut report)?,
        budgets: load_named(dir, "budgets", &mut report)?,
        market_share: load_named(dir, "market_share", &mut report)?,
        priority: load_named(dir, "priority", &mut report)?,
        event_types: load_named(dir, "event_types", &mut report)?,
    };
    Ok((data, report))
}
