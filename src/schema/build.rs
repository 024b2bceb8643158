// src/schema/build.rs

use std::collections::{BTreeSet, HashSet};
use tracing::info;

use crate::process::CleanRecord;
use crate::schema::key::geo_key;
use crate::schema::types::{FactRow, GeoRow, StarSchema, TimeRow};

/// Derive the time dimension, geographic dimension and fact table from
/// cleaned records. Geographic rows keep first-seen order.
#[tracing::instrument(level = "info", skip(records), fields(records = records.len()))]
pub fn build(records: &[CleanRecord]) -> StarSchema {
    let years: BTreeSet<i32> = records.iter().map(|r| r.year).collect();
    let time: Vec<TimeRow> = years
        .into_iter()
        .map(|year| TimeRow {
            year,
            id_tiempo: year,
        })
        .collect();

    let mut seen = HashSet::new();
    let mut geo = Vec::new();
    for r in records {
        let triple = (
            r.department_code.as_deref(),
            r.department.as_str(),
            r.municipality.as_str(),
        );
        if seen.insert(triple) {
            geo.push(GeoRow {
                department_code: r.department_code.clone(),
                department: r.department.clone(),
                municipality: r.municipality.clone(),
                id_geografico: geo_key(&r.department, &r.municipality),
            });
        }
    }

    let facts: Vec<FactRow> = records
        .iter()
        .map(|r| FactRow {
            year: r.year,
            department: r.department.clone(),
            municipality: r.municipality.clone(),
            id_tiempo: r.year,
            id_geografico: geo_key(&r.department, &r.municipality),
            population: r.population,
            enrollment_rate: r.enrollment_rate,
            net_coverage: r.net_coverage,
            gross_coverage: r.gross_coverage,
        })
        .collect();

    info!(
        time = time.len(),
        geo = geo.len(),
        facts = facts.len(),
        "star schema built"
    );
    StarSchema::new(time, geo, facts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn record(year: i32, code: &str, department: &str, municipality: &str) -> CleanRecord {
        CleanRecord {
            year,
            department: department.into(),
            municipality: municipality.into(),
            department_code: Some(code.into()),
            population: Some(1000.0),
            enrollment_rate: Some(90.0),
            net_coverage: Some(85.0),
            gross_coverage: Some(101.0),
        }
    }

    #[test]
    fn time_dimension_is_distinct_and_ascending() {
        let records = vec![
            record(2020, "05", "Antioquia", "medellin"),
            record(2018, "05", "Antioquia", "medellin"),
            record(2019, "05", "Antioquia", "medellin"),
            record(2020, "05", "Antioquia", "envigado"),
        ];
        let star = build(&records);
        let years: Vec<i32> = star.time().iter().map(|t| t.id_tiempo).collect();
        assert_eq!(years, vec![2018, 2019, 2020]);
        assert!(star.time().iter().all(|t| t.id_tiempo == t.year));
        assert_eq!(star.latest_year(), Some(2020));
        assert_eq!(star.geo().len(), 2);
        assert_eq!(star.facts().len(), 4);
    }

    #[test]
    fn every_fact_key_resolves_in_both_dimensions() {
        let records = vec![
            record(2019, "11", "Bogota", "bogota"),
            record(2020, "76", "Valle Del Cauca", "buga la grande"),
            record(2020, "88", "San Andres", "providencia"),
        ];
        let star = build(&records);
        let geo_ids: HashSet<&str> = star.geo().iter().map(|g| g.id_geografico.as_str()).collect();
        let time_ids: HashSet<i32> = star.time().iter().map(|t| t.id_tiempo).collect();
        for f in star.facts() {
            assert!(geo_ids.contains(f.id_geografico.as_str()), "orphan {}", f.id_geografico);
            assert!(time_ids.contains(&f.id_tiempo));
        }
        assert_eq!(star.geo()[1].id_geografico, "valle_del_cauca_buga_la_grande");
    }

    #[test]
    fn empty_input_gives_empty_tables() {
        let star = build(&[]);
        assert!(star.is_empty());
        assert!(star.time().is_empty());
        assert!(star.geo().is_empty());
        assert_eq!(star.latest_year(), None);
    }
}
