// src/snapshot.rs

use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};
use tracing::{error, info};

use crate::error::{PipelineError, Result};
use crate::process::{clean, CleanStats, RawTable};
use crate::schema::{self, StarSchema};

/// Everything one pipeline run produces. Immutable once built; superseded,
/// never merged, by the next run.
#[derive(Debug, Clone)]
pub struct Snapshot {
    stats: CleanStats,
    star: StarSchema,
    built_at: DateTime<Utc>,
}

impl Snapshot {
    /// Clean the raw feed and derive the star schema from it.
    pub fn build(raw: &RawTable) -> Result<Self> {
        let cleaned = clean(raw)?;
        let star = schema::build(&cleaned.records);
        Ok(Self {
            stats: cleaned.stats,
            star,
            built_at: Utc::now(),
        })
    }

    pub fn stats(&self) -> &CleanStats {
        &self.stats
    }

    pub fn star(&self) -> &StarSchema {
        &self.star
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    /// For consumers that want to report "no data" instead of rendering
    /// empty tables.
    pub fn ensure_non_empty(&self) -> Result<()> {
        if self.star.is_empty() {
            return Err(PipelineError::EmptyInput);
        }
        Ok(())
    }
}

/// Holds the latest published snapshot. A refresh publishes only after the
/// whole pipeline succeeded; readers never see a partial run.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    current: RwLock<Option<Arc<Snapshot>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<Arc<Snapshot>> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        *self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(Arc::clone(&snapshot));
        snapshot
    }

    /// Run the pipeline over `raw` and swap the result in. On failure the
    /// previously published snapshot stays in place.
    pub fn refresh(&self, raw: &RawTable) -> Result<Arc<Snapshot>> {
        match Snapshot::build(raw) {
            Ok(snapshot) => {
                let published = self.publish(snapshot);
                info!(
                    facts = published.star().facts().len(),
                    built_at = %published.built_at(),
                    "snapshot published"
                );
                Ok(published)
            }
            Err(e) => {
                error!(error = %e, "pipeline run failed; keeping previous snapshot");
                Err(e)
            }
        }
    }
}
