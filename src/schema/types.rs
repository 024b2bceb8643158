// src/schema/types.rs

/// One row per distinct year; the year is its own key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRow {
    pub year: i32,
    pub id_tiempo: i32,
}

/// One row per distinct (code, department, municipality) triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeoRow {
    pub department_code: Option<String>,
    pub department: String,
    pub municipality: String,
    pub id_geografico: String,
}

/// One row per cleaned record, keyed into both dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct FactRow {
    pub year: i32,
    pub department: String,
    pub municipality: String,
    pub id_tiempo: i32,
    pub id_geografico: String,
    pub population: Option<f64>,
    pub enrollment_rate: Option<f64>,
    pub net_coverage: Option<f64>,
    pub gross_coverage: Option<f64>,
}

/// The three tables produced by one pipeline run. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct StarSchema {
    time: Vec<TimeRow>,
    geo: Vec<GeoRow>,
    facts: Vec<FactRow>,
}

impl StarSchema {
    pub(crate) fn new(time: Vec<TimeRow>, geo: Vec<GeoRow>, facts: Vec<FactRow>) -> Self {
        Self { time, geo, facts }
    }

    /// Distinct years, ascending.
    pub fn time(&self) -> &[TimeRow] {
        &self.time
    }

    pub fn geo(&self) -> &[GeoRow] {
        &self.geo
    }

    pub fn facts(&self) -> &[FactRow] {
        &self.facts
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn latest_year(&self) -> Option<i32> {
        self.time.last().map(|t| t.id_tiempo)
    }
}
