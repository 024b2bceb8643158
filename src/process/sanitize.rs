// src/process/sanitize.rs

use tracing::debug;

use crate::process::pipeline::{KeyedRecord, SanitizedRecord};
use crate::process::utils::parse_number;

/// Per-run counters for the metric columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SanitizeStats {
    /// Cells present but not numeric, replaced by missing.
    pub coercion_warnings: usize,
    /// Cells holding a negative percentage, replaced by missing.
    pub negatives_blanked: usize,
}

/// Coerce one metric cell. Non-numeric and negative values become `None`;
/// the row itself is always kept.
pub fn sanitize_metric(
    column: &'static str,
    raw: Option<&str>,
    stats: &mut SanitizeStats,
) -> Option<f64> {
    let raw = raw?;
    let Some(value) = parse_number(raw) else {
        debug!(column, raw, "non-numeric metric replaced by missing");
        stats.coercion_warnings += 1;
        return None;
    };
    if value < 0.0 {
        debug!(column, value, "negative metric replaced by missing");
        stats.negatives_blanked += 1;
        return None;
    }
    Some(value)
}

/// Coerce the three percentage columns of every record.
pub fn sanitize(records: Vec<KeyedRecord>) -> (Vec<SanitizedRecord>, SanitizeStats) {
    use crate::process::raw_table::columns;

    let mut stats = SanitizeStats::default();
    let out = records
        .into_iter()
        .map(|r| SanitizedRecord {
            enrollment_rate: sanitize_metric(
                columns::ENROLLMENT_RATE,
                r.enrollment_rate.as_deref(),
                &mut stats,
            ),
            net_coverage: sanitize_metric(
                columns::NET_COVERAGE,
                r.net_coverage.as_deref(),
                &mut stats,
            ),
            gross_coverage: sanitize_metric(
                columns::GROSS_COVERAGE,
                r.gross_coverage.as_deref(),
                &mut stats,
            ),
            year: r.year,
            department: r.department,
            municipality: r.municipality,
            department_code: r.department_code,
            population: r.population,
        })
        .collect();
    (out, stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negatives_become_missing_not_zero() {
        let mut stats = SanitizeStats::default();
        for raw in ["-5", "-0.01", "-100", " -3.5 "] {
            assert_eq!(sanitize_metric("cobertura_neta", Some(raw), &mut stats), None);
        }
        assert_eq!(stats.negatives_blanked, 4);
        assert_eq!(stats.coercion_warnings, 0);
    }

    #[test]
    fn non_numeric_becomes_missing_and_is_counted() {
        let mut stats = SanitizeStats::default();
        assert_eq!(sanitize_metric("cobertura_neta", Some("s.d."), &mut stats), None);
        assert_eq!(sanitize_metric("cobertura_neta", None, &mut stats), None);
        assert_eq!(sanitize_metric("cobertura_neta", Some("0"), &mut stats), Some(0.0));
        assert_eq!(sanitize_metric("cobertura_neta", Some("95.2"), &mut stats), Some(95.2));
        assert_eq!(stats.coercion_warnings, 1);
    }

    #[test]
    fn keeps_every_row() {
        let records = vec![
            KeyedRecord {
                year: "2020".into(),
                department: "bogota".into(),
                municipality: "bogota".into(),
                net_coverage: Some("-5".into()),
                ..KeyedRecord::default()
            },
            KeyedRecord {
                year: "2020".into(),
                department: "bogota".into(),
                municipality: "bogota".into(),
                net_coverage: Some("95.2".into()),
                gross_coverage: Some("abc".into()),
                ..KeyedRecord::default()
            },
        ];
        let (out, stats) = sanitize(records);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].net_coverage, None);
        assert_eq!(out[1].net_coverage, Some(95.2));
        assert_eq!(out[1].gross_coverage, None);
        assert_eq!(stats.negatives_blanked, 1);
        assert_eq!(stats.coercion_warnings, 1);
    }
}
