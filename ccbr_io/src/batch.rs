//! Batch collection of whole dataset areas.
//!
//! Each area directory contains one subdirectory per room. Every room is
//! collected independently; a failing room is logged and recorded in the
//! [`IngestReport`] while the remaining rooms are still written.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::config::IngestConfig;
use crate::error::{CcbrIoError, Result};
use crate::format::write_scene;
use crate::scene::{collect_scene, ANNOTATIONS_DIR};

/// A room that could not be collected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneFailure {
    /// Room directory.
    pub scene: PathBuf,
    /// Error description.
    pub error: String,
}

/// Outcome of a batch ingestion job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Files written, in room order.
    pub written: Vec<PathBuf>,
    /// Rooms that failed.
    pub failed: Vec<SceneFailure>,
}

impl IngestReport {
    /// Number of rooms processed.
    pub fn total(&self) -> usize {
        self.written.len() + self.failed.len()
    }

    fn merge(&mut self, other: IngestReport) {
        self.written.extend(other.written);
        self.failed.extend(other.failed);
    }
}

/// Output file name for a room: `<area>_<room>.<ext>`.
pub fn scene_output_name(area: &str, room: &str, config: &IngestConfig) -> String {
    format!("{}_{}.{}", area, room, config.format.extension())
}

/// Room directories of an area, in name order.
pub fn scene_dirs(area_dir: &Path) -> Result<Vec<PathBuf>> {
    if !area_dir.is_dir() {
        return Err(CcbrIoError::MissingArea {
            path: area_dir.to_path_buf(),
        });
    }

    let mut scenes: Vec<PathBuf> = fs::read_dir(area_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_dir())
        .collect();
    scenes.sort();

    if scenes.is_empty() {
        return Err(CcbrIoError::EmptyArea {
            path: area_dir.to_path_buf(),
        });
    }
    Ok(scenes)
}

/// Collect one room and write it into `out_dir`. Returns the written path.
///
/// The room directory name must be valid UTF-8, it becomes part of the
/// output file name.
pub fn collect_room(
    area: &str,
    scene_dir: &Path,
    out_dir: &Path,
    config: &IngestConfig,
) -> Result<PathBuf> {
    let room = scene_dir
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| CcbrIoError::InvalidSceneName {
            path: scene_dir.to_path_buf(),
        })?;
    let out_path = out_dir.join(scene_output_name(area, room, config));

    let scene = collect_scene(&scene_dir.join(ANNOTATIONS_DIR), &config.class_map)?;
    write_scene(&scene, &out_path, config.format)?;

    log::info!("{:?}: {} points -> {:?}", scene_dir, scene.nrows(), out_path);
    Ok(out_path)
}

/// Collect every room of one area.
///
/// Fails only when the area itself is missing or empty.
pub fn collect_area(
    data_root: &Path,
    area: &str,
    out_dir: &Path,
    config: &IngestConfig,
) -> Result<IngestReport> {
    let scenes = scene_dirs(&data_root.join(area))?;
    fs::create_dir_all(out_dir)?;
    log::info!("{}: {} scenes", area, scenes.len());

    let results: Vec<(PathBuf, Result<PathBuf>)> = scenes
        .par_iter()
        .map(|scene| (scene.clone(), collect_room(area, scene, out_dir, config)))
        .collect();

    let mut report = IngestReport::default();
    for (scene, result) in results {
        match result {
            Ok(path) => report.written.push(path),
            Err(e) => {
                log::warn!("{:?}: skipped: {}", scene, e);
                report.failed.push(SceneFailure {
                    scene,
                    error: e.to_string(),
                });
            }
        }
    }
    Ok(report)
}

/// Collect every room of several areas into `out_dir`.
pub fn collect_areas<S: AsRef<str>>(
    data_root: &Path,
    areas: &[S],
    out_dir: &Path,
    config: &IngestConfig,
) -> Result<IngestReport> {
    let mut report = IngestReport::default();
    for area in areas {
        report.merge(collect_area(data_root, area.as_ref(), out_dir, config)?);
    }

    log::info!(
        "ingestion finished: {} written, {} failed",
        report.written.len(),
        report.failed.len()
    );
    Ok(report)
}
