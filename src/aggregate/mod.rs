// src/aggregate/mod.rs

pub mod choropleth;
pub mod stats;

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::process::columns;
use crate::schema::FactRow;
pub use stats::Summary;

/// The four measures carried by the fact table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    Population,
    EnrollmentRate,
    NetCoverage,
    GrossCoverage,
}

impl Measure {
    pub const ALL: [Measure; 4] = [
        Measure::Population,
        Measure::EnrollmentRate,
        Measure::NetCoverage,
        Measure::GrossCoverage,
    ];

    /// Fact-table column name.
    pub fn column(self) -> &'static str {
        match self {
            Measure::Population => columns::POPULATION,
            Measure::EnrollmentRate => columns::ENROLLMENT_RATE,
            Measure::NetCoverage => columns::NET_COVERAGE,
            Measure::GrossCoverage => columns::GROSS_COVERAGE,
        }
    }

    /// Display label used by charts and the map legend.
    pub fn label(self) -> &'static str {
        match self {
            Measure::Population => "Población 5-16",
            Measure::EnrollmentRate => "Tasa de Matriculación 5-16 (%)",
            Measure::NetCoverage => "Cobertura Neta (%)",
            Measure::GrossCoverage => "Cobertura Bruta (%)",
        }
    }

    /// Percentages only; population is a head count.
    pub fn is_percentage(self) -> bool {
        !matches!(self, Measure::Population)
    }

    pub fn value(self, fact: &FactRow) -> Option<f64> {
        match self {
            Measure::Population => fact.population,
            Measure::EnrollmentRate => fact.enrollment_rate,
            Measure::NetCoverage => fact.net_coverage,
            Measure::GrossCoverage => fact.gross_coverage,
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per year, a summary of every measure over the rows of that year.
pub fn yearly_stats<'a, I>(facts: I) -> BTreeMap<i32, BTreeMap<Measure, Summary>>
where
    I: IntoIterator<Item = &'a FactRow>,
{
    let mut by_year: BTreeMap<i32, Vec<&FactRow>> = BTreeMap::new();
    for f in facts {
        by_year.entry(f.id_tiempo).or_default().push(f);
    }
    by_year
        .into_iter()
        .map(|(year, rows)| {
            let per_measure = Measure::ALL
                .iter()
                .map(|&m| {
                    let summary = Summary::from_values(rows.iter().filter_map(|f| m.value(f)));
                    (m, summary)
                })
                .collect();
            (year, per_measure)
        })
        .collect()
}

/// Mean of `measure` per group. Missing values are skipped; a group whose
/// values are all missing maps to `None`.
pub fn mean_by_group<'a, I, K, F>(facts: I, group: F, measure: Measure) -> BTreeMap<K, Option<f64>>
where
    I: IntoIterator<Item = &'a FactRow>,
    K: Ord,
    F: Fn(&FactRow) -> K,
{
    let mut groups: BTreeMap<K, Vec<f64>> = BTreeMap::new();
    for f in facts {
        groups.entry(group(f)).or_default().extend(measure.value(f));
    }
    groups
        .into_iter()
        .map(|(k, values)| (k, stats::mean(values)))
        .collect()
}

pub fn filter_by_year<'a, I>(facts: I, year: i32) -> Vec<&'a FactRow>
where
    I: IntoIterator<Item = &'a FactRow>,
{
    facts.into_iter().filter(|f| f.id_tiempo == year).collect()
}

pub fn filter_by_departments<'a, I>(facts: I, departments: &BTreeSet<String>) -> Vec<&'a FactRow>
where
    I: IntoIterator<Item = &'a FactRow>,
{
    facts
        .into_iter()
        .filter(|f| departments.contains(&f.department))
        .collect()
}

/// National mean of a measure per year.
pub fn national_series<'a, I>(facts: I, measure: Measure) -> BTreeMap<i32, Option<f64>>
where
    I: IntoIterator<Item = &'a FactRow>,
{
    mean_by_group(facts, |f| f.id_tiempo, measure)
}

/// Departments by mean of a measure, highest first; departments without any
/// present value go last.
pub fn department_ranking<'a, I>(facts: I, measure: Measure) -> Vec<(String, Option<f64>)>
where
    I: IntoIterator<Item = &'a FactRow>,
{
    let mut ranking: Vec<(String, Option<f64>)> =
        mean_by_group(facts, |f| f.department.clone(), measure)
            .into_iter()
            .collect();
    ranking.sort_by(|(_, a), (_, b)| match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(a),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    ranking
}

/// Yearly mean of a measure for each selected department.
pub fn department_series<'a, I>(
    facts: I,
    departments: &BTreeSet<String>,
    measure: Measure,
) -> BTreeMap<String, BTreeMap<i32, Option<f64>>>
where
    I: IntoIterator<Item = &'a FactRow>,
{
    let selected = filter_by_departments(facts, departments);
    let mut series: BTreeMap<String, BTreeMap<i32, Option<f64>>> = BTreeMap::new();
    for ((department, year), mean) in mean_by_group(
        selected,
        |f| (f.department.clone(), f.id_tiempo),
        measure,
    ) {
        series.entry(department).or_default().insert(year, mean);
    }
    series
}
