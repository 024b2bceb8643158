use anyhow::{bail, Result};
use clap::Parser;
use edustar::{
    aggregate::{self, choropleth, Measure},
    cli::{Cli, Command},
    fetch,
    process::canonical_department,
    report,
    schema::{self, batch_to_json},
    Snapshot, SnapshotStore,
};
use reqwest::Client;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Serialize)]
struct SummaryOut<'a> {
    stats: &'a edustar::process::CleanStats,
    time_rows: usize,
    geo_rows: usize,
    fact_rows: usize,
    yearly: BTreeMap<i32, BTreeMap<Measure, aggregate::Summary>>,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: &Cli, snapshot: &Snapshot) -> Result<()> {
    let star = snapshot.star();
    let facts = star.facts();

    match &cli.command {
        Command::Summary => {
            let yearly = aggregate::yearly_stats(facts);
            if cli.json {
                print_json(&SummaryOut {
                    stats: snapshot.stats(),
                    time_rows: star.time().len(),
                    geo_rows: star.geo().len(),
                    fact_rows: facts.len(),
                    yearly,
                })?;
            } else {
                println!("\n--- Limpieza y validación ---");
                report::overview(snapshot.stats(), star).printstd();
                println!("\n--- Estadísticas descriptivas por año ---");
                report::yearly(&yearly).printstd();
            }
        }

        Command::Ranking { measure } => {
            let ranking = aggregate::department_ranking(facts, *measure);
            if cli.json {
                print_json(&ranking)?;
            } else {
                report::means("Departamento", *measure, &ranking).printstd();
            }
        }

        Command::National { measure } => {
            let national = aggregate::national_series(facts, *measure);
            if cli.json {
                print_json(&national)?;
            } else {
                let rows: Vec<(i32, Option<f64>)> = national.into_iter().collect();
                report::means("Año", *measure, &rows).printstd();
            }
        }

        Command::Series {
            departments,
            measure,
        } => {
            let wanted: BTreeSet<String> =
                departments.iter().map(|d| canonical_department(d)).collect();
            let series = aggregate::department_series(facts, &wanted, *measure);
            for missing in wanted.iter().filter(|d| !series.contains_key(*d)) {
                warn!(department = %missing, "department not present in the data");
            }
            if cli.json {
                print_json(&series)?;
            } else {
                report::series(*measure, &series).printstd();
            }
        }

        Command::Map { year, measure } => {
            if !measure.is_percentage() {
                bail!("the map shows percentage measures only, not {}", measure.column());
            }
            let Some(year) = year.or_else(|| star.latest_year()) else {
                println!("No data available.");
                return Ok(());
            };
            let means = choropleth::department_code_means(star, year, *measure);
            if cli.json {
                print_json(&means)?;
            } else {
                println!("\n--- {} por departamento - {} ---", measure.label(), year);
                let rows: Vec<(String, Option<f64>)> = means.into_iter().collect();
                report::means("DPTO", *measure, &rows).printstd();
            }
        }

        Command::Tables { head } => {
            let batches = schema::star_batches(star)?;
            for (name, batch) in ["tiempo", "geografica", "hechos"].iter().zip(batches.iter()) {
                let preview = batch.slice(0, batch.num_rows().min(*head));
                if cli.json {
                    println!("{}", batch_to_json(&preview)?);
                } else {
                    println!("\n--- {} ({} filas) ---", name, batch.num_rows());
                    report::head(&preview, *head)?.printstd();
                }
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!(?cli, "startup");

    // ─── 2) load raw rows; failures degrade to an empty feed ─────────
    let client = Client::new();
    let raw = fetch::load_or_empty(&client, &cli.source()).await;

    // ─── 3) run the pipeline and publish the snapshot ───────────────
    let store = SnapshotStore::new();
    let snapshot = store.refresh(&raw)?;
    if let Err(e) = snapshot.ensure_non_empty() {
        warn!("{}", e);
        println!("No data available.");
        return Ok(());
    }

    // ─── 4) answer the query ─────────────────────────────────────────
    run(&cli, &snapshot)?;

    info!("all done");
    Ok(())
}
