// src/schema/arrow.rs

use anyhow::{Context, Result};
use arrow::{
    array::{ArrayRef, Float64Array, Int32Array, StringArray},
    datatypes::{DataType, Field, Schema},
    json::ArrayWriter,
    record_batch::RecordBatch,
};
use std::sync::Arc;

use super::types::{FactRow, GeoRow, StarSchema, TimeRow};
use crate::process::columns;

/// Arrow schema of the time dimension: `a_o`, `id_tiempo`.
pub fn time_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new(columns::YEAR, DataType::Int32, false),
        Field::new("id_tiempo", DataType::Int32, false),
    ]))
}

/// Arrow schema of the geographic dimension.
pub fn geo_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new(columns::DEPARTMENT_CODE, DataType::Utf8, true),
        Field::new(columns::DEPARTMENT, DataType::Utf8, false),
        Field::new(columns::MUNICIPALITY, DataType::Utf8, false),
        Field::new("id_geografico", DataType::Utf8, false),
    ]))
}

/// Arrow schema of the fact table. Measures are nullable.
pub fn fact_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new(columns::YEAR, DataType::Int32, false),
        Field::new(columns::DEPARTMENT, DataType::Utf8, false),
        Field::new(columns::MUNICIPALITY, DataType::Utf8, false),
        Field::new("id_tiempo", DataType::Int32, false),
        Field::new("id_geografico", DataType::Utf8, false),
        Field::new(columns::POPULATION, DataType::Float64, true),
        Field::new(columns::ENROLLMENT_RATE, DataType::Float64, true),
        Field::new(columns::NET_COVERAGE, DataType::Float64, true),
        Field::new(columns::GROSS_COVERAGE, DataType::Float64, true),
    ]))
}

pub fn time_batch(rows: &[TimeRow]) -> Result<RecordBatch> {
    let cols: Vec<ArrayRef> = vec![
        Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.year))),
        Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.id_tiempo))),
    ];
    RecordBatch::try_new(time_schema(), cols).context("building time dimension batch")
}

pub fn geo_batch(rows: &[GeoRow]) -> Result<RecordBatch> {
    let cols: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter(
            rows.iter().map(|r| r.department_code.as_deref()),
        )),
        Arc::new(StringArray::from_iter_values(
            rows.iter().map(|r| r.department.as_str()),
        )),
        Arc::new(StringArray::from_iter_values(
            rows.iter().map(|r| r.municipality.as_str()),
        )),
        Arc::new(StringArray::from_iter_values(
            rows.iter().map(|r| r.id_geografico.as_str()),
        )),
    ];
    RecordBatch::try_new(geo_schema(), cols).context("building geographic dimension batch")
}

pub fn fact_batch(rows: &[FactRow]) -> Result<RecordBatch> {
    let measure = |f: fn(&FactRow) -> Option<f64>| -> ArrayRef {
        Arc::new(Float64Array::from_iter(rows.iter().map(f)))
    };
    let cols: Vec<ArrayRef> = vec![
        Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.year))),
        Arc::new(StringArray::from_iter_values(
            rows.iter().map(|r| r.department.as_str()),
        )),
        Arc::new(StringArray::from_iter_values(
            rows.iter().map(|r| r.municipality.as_str()),
        )),
        Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.id_tiempo))),
        Arc::new(StringArray::from_iter_values(
            rows.iter().map(|r| r.id_geografico.as_str()),
        )),
        measure(|r: &FactRow| r.population),
        measure(|r: &FactRow| r.enrollment_rate),
        measure(|r: &FactRow| r.net_coverage),
        measure(|r: &FactRow| r.gross_coverage),
    ];
    RecordBatch::try_new(fact_schema(), cols).context("building fact table batch")
}

/// The three tables as Arrow batches, in (time, geo, facts) order.
pub fn star_batches(star: &StarSchema) -> Result<[RecordBatch; 3]> {
    Ok([
        time_batch(star.time())?,
        geo_batch(star.geo())?,
        fact_batch(star.facts())?,
    ])
}

/// Render a batch as a JSON array of row objects; missing cells are omitted.
pub fn batch_to_json(batch: &RecordBatch) -> Result<String> {
    let mut writer = ArrayWriter::new(Vec::new());
    writer.write_batches(&[batch]).context("writing JSON rows")?;
    writer.finish().context("finishing JSON array")?;
    String::from_utf8(writer.into_inner()).context("JSON writer produced invalid UTF-8")
}
