//! Persisting generated samples.
//!
//! A sample is written as `<design>_<n>.csv` with one row per unit and a
//! `<design>_<n>.json` side-file holding its [`SampleMeta`]. The weight
//! matrix is not persisted; it is rebuilt from `n` and `k` when needed.
//!
//! [`SampleMeta`]: spillover_types::SampleMeta

use std::path::{Path, PathBuf};

use tracing::info;

use spillover_sim::SpatialSample;
use spillover_types::SampleRecord;

use crate::delimited::write_delimited;
use crate::error::DataError;
use crate::frame::{Column, Frame};

/// Paths written by [`write_sample`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleFiles {
    /// The delimited data file.
    pub data: PathBuf,
    /// The JSON metadata side-file.
    pub meta: PathBuf,
}

/// Convert a sample into a frame.
///
/// Columns: `unit, row, col, Y, Y_1, Y_0, D, X, WD`; designs with an
/// outcome lag add `WY, Y_no_spill, Y_1_no_spill, Y_0_no_spill`; the
/// backdoor design adds `WD_assignment`.
pub fn sample_to_frame(sample: &SpatialSample) -> Result<Frame, DataError> {
    let records = sample.records();
    let col = |f: fn(&SampleRecord) -> f64| Column::Numeric(records.iter().map(f).collect());

    let mut frame = Frame::new()
        .with_column("unit", col(|r| r.unit as f64))?
        .with_column("row", col(|r| r.row as f64))?
        .with_column("col", col(|r| r.col as f64))?
        .with_column("Y", col(|r| r.outcomes.y))?
        .with_column("Y_1", col(|r| r.outcomes.y1))?
        .with_column("Y_0", col(|r| r.outcomes.y0))?
        .with_column("D", col(|r| f64::from(r.d)))?
        .with_column("X", col(|r| r.x))?
        .with_column("WD", col(|r| r.wd))?;

    if sample.design().has_outcome_lag() {
        frame.push_column("WY", col(|r| r.wy.unwrap_or(f64::NAN)))?;
        frame.push_column("Y_no_spill", col(|r| r.no_spill.map_or(f64::NAN, |o| o.y)))?;
        frame.push_column("Y_1_no_spill", col(|r| r.no_spill.map_or(f64::NAN, |o| o.y1)))?;
        frame.push_column("Y_0_no_spill", col(|r| r.no_spill.map_or(f64::NAN, |o| o.y0)))?;
    }
    if records.iter().any(|r| r.wd_assignment.is_some()) {
        frame.push_column("WD_assignment", col(|r| r.wd_assignment.unwrap_or(f64::NAN)))?;
    }
    Ok(frame)
}

/// Write a sample and its metadata into `dir`, creating it if needed.
///
/// # Errors
///
/// Returns [`DataError::Io`] if the directory or either file cannot be
/// written, or [`DataError::Json`] if the metadata fails to serialize.
pub fn write_sample(sample: &SpatialSample, dir: &Path) -> Result<SampleFiles, DataError> {
    std::fs::create_dir_all(dir).map_err(|source| DataError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let stem = format!("{}_{}", sample.design(), sample.len());
    let data = dir.join(format!("{stem}.csv"));
    let meta = dir.join(format!("{stem}.json"));

    write_delimited(&sample_to_frame(sample)?, &data, ',')?;
    let json = serde_json::to_string_pretty(sample.meta())?;
    std::fs::write(&meta, json).map_err(|source| DataError::Io {
        path: meta.clone(),
        source,
    })?;

    info!(
        run_id = %sample.meta().run_id,
        data = %data.display(),
        meta = %meta.display(),
        "sample written"
    );
    Ok(SampleFiles { data, meta })
}
