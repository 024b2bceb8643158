// src/process/pipeline.rs

use serde::Serialize;
use std::collections::HashSet;
use tracing::{info, warn};

use crate::error::{PipelineError, Result};
use crate::process::correct::{correct_department, correct_departments};
use crate::process::raw_table::{RawRecord, RawTable};
use crate::process::sanitize::sanitize;
use crate::process::utils::{normalize_str, parse_number, parse_year, title_case};

/// A row that carried all three essential keys; text cells not yet coerced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyedRecord {
    pub year: String,
    pub department: String,
    pub municipality: String,
    pub department_code: Option<String>,
    pub population: Option<String>,
    pub enrollment_rate: Option<String>,
    pub net_coverage: Option<String>,
    pub gross_coverage: Option<String>,
}

/// A keyed row whose percentage metrics have been coerced and screened.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SanitizedRecord {
    pub year: String,
    pub department: String,
    pub municipality: String,
    pub department_code: Option<String>,
    pub population: Option<String>,
    pub enrollment_rate: Option<f64>,
    pub net_coverage: Option<f64>,
    pub gross_coverage: Option<f64>,
}

/// Output row of the cleaning pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanRecord {
    pub year: i32,
    /// Canonical, title-cased for display (`"Bogota"`).
    pub department: String,
    /// Normalized: lower-case, accent-free, trimmed.
    pub municipality: String,
    pub department_code: Option<String>,
    pub population: Option<f64>,
    pub enrollment_rate: Option<f64>,
    pub net_coverage: Option<f64>,
    pub gross_coverage: Option<f64>,
}

/// Row accounting for one run: how much was discarded, and why.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanStats {
    pub original_count: usize,
    pub clean_count: usize,
    /// Rows without department, municipality or a usable year.
    pub dropped_missing_keys: usize,
    pub dropped_duplicates: usize,
    /// Cells that could not be coerced to a number and became missing.
    pub coercion_warnings: usize,
    pub negatives_blanked: usize,
}

impl CleanStats {
    pub fn dropped(&self) -> usize {
        self.original_count - self.clean_count
    }
}

/// Cleaned records plus the accounting for the run that produced them.
#[derive(Debug, Clone, Default)]
pub struct Cleaned {
    pub records: Vec<CleanRecord>,
    pub stats: CleanStats,
}

/// Normalize, canonicalize and title-case a department name the same way the
/// pipeline does, so user-supplied names match the cleaned values.
pub fn canonical_department(name: &str) -> String {
    title_case(correct_department(&normalize_str(name)).trim())
}

impl From<&CleanRecord> for RawRecord {
    fn from(r: &CleanRecord) -> Self {
        Self {
            year: Some(r.year.to_string()),
            department: Some(r.department.clone()),
            municipality: Some(r.municipality.clone()),
            department_code: r.department_code.clone(),
            population: r.population.map(|v| v.to_string()),
            enrollment_rate: r.enrollment_rate.map(|v| v.to_string()),
            net_coverage: r.net_coverage.map(|v| v.to_string()),
            gross_coverage: r.gross_coverage.map(|v| v.to_string()),
        }
    }
}

fn keyed(r: &RawRecord) -> Option<KeyedRecord> {
    Some(KeyedRecord {
        year: r.year.clone()?,
        department: r.department.clone()?,
        municipality: r.municipality.clone()?,
        department_code: r.department_code.clone(),
        population: r.population.clone(),
        enrollment_rate: r.enrollment_rate.clone(),
        net_coverage: r.net_coverage.clone(),
        gross_coverage: r.gross_coverage.clone(),
    })
}

/// Year and population compare by the value step 8 coerces them to, so
/// `"2020"` and `"2020.0"` are the same row and so are `"n/a"` and `"s.d."`
/// populations.
#[derive(PartialEq, Eq, Hash)]
enum CellKey {
    Missing,
    Number(u64),
    Text(String),
}

impl CellKey {
    fn number(v: Option<f64>) -> Self {
        match v {
            // -0.0 and 0.0 are the same value
            Some(v) if v == 0.0 => CellKey::Number(0f64.to_bits()),
            Some(v) => CellKey::Number(v.to_bits()),
            None => CellKey::Missing,
        }
    }

    fn coerced(raw: Option<&str>) -> Self {
        match raw {
            None => CellKey::Missing,
            Some(s) => match parse_number(s) {
                Some(v) => Self::number(Some(v)),
                None => CellKey::Text(s.to_string()),
            },
        }
    }
}

fn row_key(r: &SanitizedRecord) -> Vec<CellKey> {
    vec![
        CellKey::coerced(Some(&r.year)),
        CellKey::Text(r.department.clone()),
        CellKey::Text(r.municipality.clone()),
        r.department_code
            .as_ref()
            .map_or(CellKey::Missing, |c| CellKey::Text(c.clone())),
        CellKey::number(r.population.as_deref().and_then(parse_number)),
        CellKey::number(r.enrollment_rate),
        CellKey::number(r.net_coverage),
        CellKey::number(r.gross_coverage),
    ]
}

/// Keep the first occurrence of each exact duplicate.
fn drop_duplicates(records: Vec<SanitizedRecord>) -> Vec<SanitizedRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|r| seen.insert(row_key(r)))
        .collect()
}

/// Run the cleaning pipeline over a raw feed.
///
/// Steps, in order: project, drop rows missing an essential key, normalize
/// text, canonicalize departments, sanitize metrics, drop exact duplicates,
/// title-case departments, coerce year and population.
///
/// Fails only when a required column is absent from the feed; every
/// cell-level problem is resolved by substituting a missing value.
#[tracing::instrument(level = "info", skip(raw), fields(rows = raw.len()))]
pub fn clean(raw: &RawTable) -> Result<Cleaned> {
    let original_count = raw.len();
    if raw.is_empty() {
        warn!("raw feed is empty; nothing to clean");
        return Ok(Cleaned::default());
    }

    let missing = raw.missing_columns();
    if !missing.is_empty() {
        return Err(PipelineError::Schema { missing });
    }

    // 1) + 2) projection happened at decode time; drop rows without keys
    let keyed_rows: Vec<KeyedRecord> = raw.records.iter().filter_map(keyed).collect();
    let mut dropped_missing_keys = original_count - keyed_rows.len();

    // 3) normalize free text
    let normalized: Vec<KeyedRecord> = keyed_rows
        .into_iter()
        .map(|mut r| {
            r.department = normalize_str(&r.department);
            r.municipality = normalize_str(&r.municipality);
            r
        })
        .collect();

    // 4) + 5)
    let corrected = correct_departments(normalized);
    let (sanitized, metric_stats) = sanitize(corrected);

    // 6)
    let before_dedup = sanitized.len();
    let unique = drop_duplicates(sanitized);
    let dropped_duplicates = before_dedup - unique.len();

    // 7) + 8)
    let mut coercion_warnings = metric_stats.coercion_warnings;
    let mut records = Vec::with_capacity(unique.len());
    for r in unique {
        let Some(year) = parse_year(&r.year) else {
            warn!(year = %r.year, "year is not numeric; dropping row");
            coercion_warnings += 1;
            dropped_missing_keys += 1;
            continue;
        };
        let population = match r.population.as_deref() {
            None => None,
            Some(raw) => {
                let parsed = parse_number(raw);
                if parsed.is_none() {
                    coercion_warnings += 1;
                }
                parsed
            }
        };
        records.push(CleanRecord {
            year,
            department: title_case(r.department.trim()),
            municipality: r.municipality,
            department_code: r.department_code,
            population,
            enrollment_rate: r.enrollment_rate,
            net_coverage: r.net_coverage,
            gross_coverage: r.gross_coverage,
        });
    }

    let stats = CleanStats {
        original_count,
        clean_count: records.len(),
        dropped_missing_keys,
        dropped_duplicates,
        coercion_warnings,
        negatives_blanked: metric_stats.negatives_blanked,
    };

    if stats.coercion_warnings > 0 {
        warn!(
            cells = stats.coercion_warnings,
            "cells could not be coerced to numbers and were set to missing"
        );
    }
    info!(
        original = stats.original_count,
        clean = stats.clean_count,
        missing_keys = stats.dropped_missing_keys,
        duplicates = stats.dropped_duplicates,
        negatives = stats.negatives_blanked,
        "cleaning finished"
    );

    Ok(Cleaned { records, stats })
}
