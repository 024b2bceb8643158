// src/report.rs

use anyhow::Result;
use arrow::{record_batch::RecordBatch, util::display::array_value_to_string};
use prettytable::{format, Cell, Row, Table};
use std::collections::BTreeMap;

use crate::aggregate::{Measure, Summary};
use crate::process::CleanStats;
use crate::schema::StarSchema;

fn header(names: &[&str]) -> Row {
    Row::new(
        names
            .iter()
            .map(|n| Cell::new(n).style_spec("bFg"))
            .collect(),
    )
}

fn new_table(names: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(header(names));
    table
}

fn num(v: Option<f64>) -> Cell {
    let text = v.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v));
    Cell::new(&text).style_spec("r")
}

fn count(n: usize) -> Cell {
    Cell::new(&n.to_string()).style_spec("r")
}

/// Row accounting plus the size of each star-schema table.
pub fn overview(stats: &CleanStats, star: &StarSchema) -> Table {
    let mut table = new_table(&["Item", "Rows"]);
    for (name, n) in [
        ("Registros originales", stats.original_count),
        ("Registros válidos", stats.clean_count),
        ("Sin llaves esenciales", stats.dropped_missing_keys),
        ("Duplicados", stats.dropped_duplicates),
        ("Celdas no numéricas", stats.coercion_warnings),
        ("Métricas negativas", stats.negatives_blanked),
        ("Dimensión tiempo", star.time().len()),
        ("Dimensión geográfica", star.geo().len()),
        ("Tabla de hechos", star.facts().len()),
    ] {
        table.add_row(Row::new(vec![Cell::new(name), count(n)]));
    }
    table
}

/// One row per (year, measure) with the descriptive statistics.
pub fn yearly(stats: &BTreeMap<i32, BTreeMap<Measure, Summary>>) -> Table {
    let mut table = new_table(&[
        "Año", "Medida", "n", "mean", "std", "min", "max", "median",
    ]);
    for (year, per_measure) in stats {
        for (measure, s) in per_measure {
            table.add_row(Row::new(vec![
                Cell::new(&year.to_string()),
                Cell::new(measure.column()),
                count(s.count),
                num(s.mean),
                num(s.std),
                num(s.min),
                num(s.max),
                num(s.median),
            ]));
        }
    }
    table
}

/// Two-column table of labelled means, in the given order.
pub fn means<K: ToString>(key: &str, measure: Measure, rows: &[(K, Option<f64>)]) -> Table {
    let mut table = new_table(&[key, measure.label()]);
    for (k, v) in rows {
        table.add_row(Row::new(vec![Cell::new(&k.to_string()), num(*v)]));
    }
    table
}

/// Departments as rows, years as columns.
pub fn series(measure: Measure, data: &BTreeMap<String, BTreeMap<i32, Option<f64>>>) -> Table {
    let years: Vec<i32> = {
        let mut ys: Vec<i32> = data.values().flat_map(|s| s.keys().copied()).collect();
        ys.sort_unstable();
        ys.dedup();
        ys
    };
    let year_labels: Vec<String> = years.iter().map(|y| y.to_string()).collect();
    let mut names = vec![measure.column()];
    names.extend(year_labels.iter().map(String::as_str));

    let mut table = new_table(&names);
    for (department, by_year) in data {
        let mut cells = vec![Cell::new(department)];
        cells.extend(years.iter().map(|y| num(by_year.get(y).copied().flatten())));
        table.add_row(Row::new(cells));
    }
    table
}

/// First `head` rows of an Arrow batch, every column rendered as text.
pub fn head(batch: &RecordBatch, rows: usize) -> Result<Table> {
    let schema = batch.schema();
    let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    let mut table = new_table(&names);
    for row in 0..batch.num_rows().min(rows) {
        let mut cells = Vec::with_capacity(batch.num_columns());
        for col in batch.columns() {
            cells.push(Cell::new(&array_value_to_string(col, row)?));
        }
        table.add_row(Row::new(cells));
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yearly_table_has_a_row_per_year_and_measure() {
        let mut per_measure = BTreeMap::new();
        for m in Measure::ALL {
            per_measure.insert(m, Summary::from_values([1.0, 2.0]));
        }
        let stats = BTreeMap::from([(2019, per_measure.clone()), (2020, per_measure)]);
        let table = yearly(&stats);
        assert_eq!(table.len(), 8);
        let rendered = table.to_string();
        assert!(rendered.contains("cobertura_neta"));
        assert!(rendered.contains("1.50"));
    }

    #[test]
    fn missing_values_render_as_dash() {
        let rows = vec![("Bogota".to_string(), Some(97.0)), ("Vaupes".to_string(), None)];
        let rendered = means("Departamento", Measure::EnrollmentRate, &rows).to_string();
        assert!(rendered.contains("97.00"));
        assert!(rendered.contains(" - "));
    }

    #[test]
    fn batch_table_is_capped_at_head() -> Result<()> {
        use crate::schema::{arrow::time_batch, TimeRow};
        let rows: Vec<TimeRow> = (2015..2021)
            .map(|y| TimeRow {
                year: y,
                id_tiempo: y,
            })
            .collect();
        let table = head(&time_batch(&rows)?, 3)?;
        assert_eq!(table.len(), 3);
        assert!(table.to_string().contains("id_tiempo"));
        Ok(())
    }

    #[test]
    fn series_table_spans_all_years() {
        let series_data = BTreeMap::from([
            ("Bogota".to_string(), BTreeMap::from([(2019, Some(90.0))])),
            ("Huila".to_string(), BTreeMap::from([(2020, Some(80.0))])),
        ]);
        let table = series(Measure::NetCoverage, &series_data);
        assert_eq!(table.len(), 2);
        let rendered = table.to_string();
        assert!(rendered.contains("2019") && rendered.contains("2020"));
    }
}
