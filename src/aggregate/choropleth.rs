// src/aggregate/choropleth.rs

use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

use super::{stats::mean, Measure};
use crate::schema::{FactRow, GeoRow, StarSchema};

/// Map-side department code: zero-padded to two characters (`"5"` → `"05"`).
/// This namespace is unrelated to `id_geografico`.
pub fn pad_department_code(code: &str) -> String {
    format!("{:0>2}", code.trim())
}

/// A fact paired with its geographic row. The time join only filters, since
/// `id_tiempo` is the year itself.
#[derive(Debug, Clone, Copy)]
pub struct JoinedFact<'a> {
    pub fact: &'a FactRow,
    pub geo: &'a GeoRow,
}

/// Inner join of the fact table with both dimensions. When several geographic
/// rows share a key every match produces its own joined row.
pub fn join(star: &StarSchema) -> Vec<JoinedFact<'_>> {
    let mut geo_by_key: HashMap<&str, Vec<&GeoRow>> = HashMap::new();
    for g in star.geo() {
        geo_by_key.entry(g.id_geografico.as_str()).or_default().push(g);
    }
    let years: HashSet<i32> = star.time().iter().map(|t| t.id_tiempo).collect();

    let mut joined = Vec::with_capacity(star.facts().len());
    for fact in star.facts() {
        if !years.contains(&fact.id_tiempo) {
            continue;
        }
        if let Some(geos) = geo_by_key.get(fact.id_geografico.as_str()) {
            joined.extend(geos.iter().map(|&geo| JoinedFact { fact, geo }));
        }
    }
    joined
}

/// Mean of `measure` per zero-padded department code for one year, the
/// table a choropleth layer is keyed on. Rows without a code are skipped.
pub fn department_code_means(
    star: &StarSchema,
    year: i32,
    measure: Measure,
) -> BTreeMap<String, Option<f64>> {
    let mut by_code: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for j in join(star).into_iter().filter(|j| j.fact.id_tiempo == year) {
        let Some(code) = j.geo.department_code.as_deref() else {
            continue;
        };
        by_code
            .entry(pad_department_code(code))
            .or_default()
            .extend(measure.value(j.fact));
    }
    debug!(year, measure = measure.column(), departments = by_code.len(), "map values");
    by_code
        .into_iter()
        .map(|(code, values)| (code, mean(values)))
        .collect()
}
