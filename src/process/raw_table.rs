// src/process/raw_table.rs

use serde_json::{Map, Value};
use std::collections::BTreeSet;

use crate::error::Result;

/// Wire names of the columns the open-data feed publishes.
pub mod columns {
    pub const YEAR: &str = "a_o";
    pub const DEPARTMENT: &str = "departamento";
    pub const MUNICIPALITY: &str = "municipio";
    pub const DEPARTMENT_CODE: &str = "c_digo_departamento";
    pub const POPULATION: &str = "poblaci_n_5_16";
    pub const ENROLLMENT_RATE: &str = "tasa_matriculaci_n_5_16";
    pub const NET_COVERAGE: &str = "cobertura_neta";
    pub const GROSS_COVERAGE: &str = "cobertura_bruta";

    pub const REQUIRED: [&str; 8] = [
        YEAR,
        DEPARTMENT,
        MUNICIPALITY,
        DEPARTMENT_CODE,
        POPULATION,
        ENROLLMENT_RATE,
        NET_COVERAGE,
        GROSS_COVERAGE,
    ];
}

/// One row of the feed, projected to the columns the pipeline uses.
/// Every cell is kept as text exactly as received; `None` is a missing cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub year: Option<String>,
    pub department: Option<String>,
    pub municipality: Option<String>,
    pub department_code: Option<String>,
    pub population: Option<String>,
    pub enrollment_rate: Option<String>,
    pub net_coverage: Option<String>,
    pub gross_coverage: Option<String>,
}

/// The feed as delivered: the rows plus the set of column names seen on any row.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub columns: BTreeSet<String>,
    pub records: Vec<RawRecord>,
}

fn cell(row: &Map<String, Value>, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

impl RawRecord {
    fn from_json_row(row: &Map<String, Value>) -> Self {
        Self {
            year: cell(row, columns::YEAR),
            department: cell(row, columns::DEPARTMENT),
            municipality: cell(row, columns::MUNICIPALITY),
            department_code: cell(row, columns::DEPARTMENT_CODE),
            population: cell(row, columns::POPULATION),
            enrollment_rate: cell(row, columns::ENROLLMENT_RATE),
            net_coverage: cell(row, columns::NET_COVERAGE),
            gross_coverage: cell(row, columns::GROSS_COVERAGE),
        }
    }
}

impl RawTable {
    /// Build from already typed records; all required columns count as present.
    pub fn from_records(records: Vec<RawRecord>) -> Self {
        let columns = if records.is_empty() {
            BTreeSet::new()
        } else {
            columns::REQUIRED.iter().map(|c| c.to_string()).collect()
        };
        Self { columns, records }
    }

    /// Decode JSON objects, keeping the union of their keys as the column set.
    pub fn from_json_rows(rows: &[Map<String, Value>]) -> Self {
        let mut columns = BTreeSet::new();
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            columns.extend(row.keys().cloned());
            records.push(RawRecord::from_json_row(row));
        }
        Self { columns, records }
    }

    /// Decode a JSON array of objects.
    pub fn from_json_str(body: &str) -> Result<Self> {
        let rows: Vec<Map<String, Value>> = serde_json::from_str(body)?;
        Ok(Self::from_json_rows(&rows))
    }

    /// Required columns no row carries, in declaration order.
    pub fn missing_columns(&self) -> Vec<String> {
        columns::REQUIRED
            .iter()
            .filter(|c| !self.columns.contains(**c))
            .map(|c| c.to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_strings_numbers_and_nulls() -> anyhow::Result<()> {
        let body = r#"[
            {"a_o": "2020", "departamento": "ANTIOQUIA", "municipio": "Medellín",
             "c_digo_departamento": 5, "poblaci_n_5_16": "400000",
             "tasa_matriculaci_n_5_16": 88.5, "cobertura_neta": null,
             "cobertura_bruta": "101.3", "extra": "ignored"},
            {"a_o": 2021, "departamento": "ANTIOQUIA"}
        ]"#;
        let table = RawTable::from_json_str(body)?;
        assert_eq!(table.len(), 2);
        assert!(table.missing_columns().is_empty());
        assert!(table.columns.contains("extra"));

        let first = &table.records[0];
        assert_eq!(first.department_code.as_deref(), Some("5"));
        assert_eq!(first.enrollment_rate.as_deref(), Some("88.5"));
        assert_eq!(first.net_coverage, None);

        let second = &table.records[1];
        assert_eq!(second.year.as_deref(), Some("2021"));
        assert_eq!(second.municipality, None);
        Ok(())
    }

    #[test]
    fn reports_columns_absent_from_every_row() -> anyhow::Result<()> {
        let table = RawTable::from_json_str(
            r#"[{"a_o": "2020", "departamento": "x", "municipio": "y"}]"#,
        )?;
        assert_eq!(
            table.missing_columns(),
            vec![
                columns::DEPARTMENT_CODE,
                columns::POPULATION,
                columns::ENROLLMENT_RATE,
                columns::NET_COVERAGE,
                columns::GROSS_COVERAGE,
            ]
        );
        Ok(())
    }

    #[test]
    fn rejects_non_array_payloads() {
        assert!(RawTable::from_json_str(r#"{"error": "throttled"}"#).is_err());
    }
}
