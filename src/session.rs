//! Loaded-batch state for an interactive session.
//!
//! The engine itself is pure; `Dashboard` only remembers the base
//! population and which recomputation is current. Recomputation is split
//! into request / run / commit so that a caller running it off-thread can
//! never let an older result overwrite a newer one.

use crate::classify::classify;
use crate::config::ReportConfig;
use crate::error::{ClaimsError, Result};
use crate::filter::{filter_options, recompute, FilterOptions, Recomputation};
use crate::normalize::normalize_rows;
use crate::reports::summarize;
use crate::types::{ClaimRecord, FilterSpec, ProcessedData, RawRow, Summary};

/// A pending recomputation, tagged with the generation it was issued at.
#[derive(Debug, Clone)]
pub struct RecomputeRequest {
    pub generation: u64,
    pub spec: FilterSpec,
}

impl RecomputeRequest {
    pub fn run(&self, base: &[ClaimRecord], cfg: &ReportConfig) -> Result<RecomputeOutcome> {
        Ok(RecomputeOutcome {
            generation: self.generation,
            result: recompute(base, &self.spec, cfg)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct RecomputeOutcome {
    pub generation: u64,
    pub result: Recomputation,
}

/// Normalize and classify a decoded batch. An empty batch is rejected
/// before anything else runs.
pub fn ingest(rows: Vec<RawRow>, cfg: &ReportConfig) -> Result<ProcessedData> {
    if rows.is_empty() {
        return Err(ClaimsError::EmptyInput);
    }
    log::info!("Ingesting {} rows", rows.len());
    Ok(classify(normalize_rows(rows, cfg), cfg))
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    config: ReportConfig,
    processed: ProcessedData,
    options: FilterOptions,
    full: Summary,
    current: Recomputation,
    requested: u64,
    committed: u64,
}

impl Dashboard {
    /// Ingest a batch and compute the full-population summary. The base
    /// population is the registered bucket.
    pub fn load(rows: Vec<RawRow>, config: ReportConfig) -> Result<Self> {
        let processed = ingest(rows, &config)?;
        let base = processed.registered();
        let options = filter_options(base, &config);
        let full = summarize(base, &config)?;
        let current = Recomputation {
            spec: FilterSpec::default(),
            filtered: base.to_vec(),
            summary: full.clone(),
        };
        Ok(Dashboard {
            config,
            processed,
            options,
            full,
            current,
            requested: 0,
            committed: 0,
        })
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    pub fn processed(&self) -> &ProcessedData {
        &self.processed
    }

    pub fn base(&self) -> &[ClaimRecord] {
        self.processed.registered()
    }

    pub fn filter_options(&self) -> &FilterOptions {
        &self.options
    }

    /// Summary of the whole base population, unaffected by filters.
    pub fn full_summary(&self) -> &Summary {
        &self.full
    }

    pub fn current(&self) -> &Recomputation {
        &self.current
    }

    pub fn spec(&self) -> &FilterSpec {
        &self.current.spec
    }

    /// Issue a new recomputation. Any request issued earlier is superseded.
    pub fn request(&mut self, spec: FilterSpec) -> RecomputeRequest {
        self.requested += 1;
        RecomputeRequest { generation: self.requested, spec }
    }

    /// Install a finished recomputation if it is the latest one requested.
    /// Returns `false` when the outcome was stale and has been dropped.
    pub fn commit(&mut self, outcome: RecomputeOutcome) -> bool {
        if outcome.generation < self.requested || outcome.generation <= self.committed {
            log::warn!(
                "Discarding stale recomputation #{} (latest #{})",
                outcome.generation,
                self.requested
            );
            return false;
        }
        self.committed = outcome.generation;
        self.current = outcome.result;
        true
    }

    /// Request, run and commit in one go.
    pub fn apply_filters(&mut self, spec: FilterSpec) -> Result<&Recomputation> {
        let req = self.request(spec);
        let outcome = req.run(self.processed.registered(), &self.config)?;
        self.commit(outcome);
        Ok(&self.current)
    }
}
