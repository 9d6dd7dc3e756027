//! Collection of per-room annotation files into one labeled point array.
//!
//! A room directory holds an `Annotations/` folder with one text file per
//! object instance, named `<class>_<index>.txt`. Each line is `x y z r g b`.

use std::fs;
use std::path::{Path, PathBuf};

use ndarray::{Array2, Axis};

use crate::config::ClassMap;
use crate::error::{CcbrIoError, Result};

/// Columns per annotation row (`x y z r g b`).
pub const POINT_COLUMNS: usize = 6;

/// Columns per labeled point (`x y z r g b label`).
pub const SCENE_COLUMNS: usize = POINT_COLUMNS + 1;

/// Name of the annotation folder inside a room directory.
pub const ANNOTATIONS_DIR: &str = "Annotations";

/// Class name encoded in an annotation file name (prefix before the first `_`).
pub fn class_name_of(path: &Path) -> Option<&str> {
    let stem = path.file_stem()?.to_str()?;
    stem.split('_').next().filter(|s| !s.is_empty())
}

/// Parse one annotation file into an `[n, 6]` array.
pub fn read_annotation(path: &Path) -> Result<Array2<f32>> {
    let contents = fs::read_to_string(path)?;
    let mut values = Vec::new();
    let mut rows = 0;

    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let row: Vec<f32> = line
            .split_whitespace()
            .map(str::parse::<f32>)
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| CcbrIoError::Parse {
                path: path.to_path_buf(),
                line: index + 1,
                message: e.to_string(),
            })?;

        if row.len() != POINT_COLUMNS {
            return Err(CcbrIoError::Parse {
                path: path.to_path_buf(),
                line: index + 1,
                message: format!("expected {} columns, got {}", POINT_COLUMNS, row.len()),
            });
        }

        values.extend(row);
        rows += 1;
    }

    Ok(Array2::from_shape_vec((rows, POINT_COLUMNS), values)?)
}

/// List the `*.txt` annotation files of a directory in name order.
pub fn annotation_files(anno_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(anno_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    files.sort();
    Ok(files)
}

/// Collect every annotation file of a room into an `[n, 7]` array.
///
/// The seventh column is the class label from `class_map`; file names whose
/// class is unknown receive the fallback label.
pub fn collect_scene(anno_dir: &Path, class_map: &ClassMap) -> Result<Array2<f32>> {
    let mut parts = Vec::new();

    for file in annotation_files(anno_dir)? {
        let class = class_name_of(&file).unwrap_or_default();
        if !class_map.contains(class) {
            log::debug!("{:?}: class {:?} not in class list, using fallback", file, class);
        }
        let label = class_map.label_of(class) as f32;

        let points = read_annotation(&file)?;
        let labels = Array2::from_elem((points.nrows(), 1), label);
        parts.push(ndarray::concatenate(Axis(1), &[points.view(), labels.view()])?);
    }

    let rows: usize = parts.iter().map(|part| part.nrows()).sum();
    if rows == 0 {
        return Err(CcbrIoError::EmptyScene {
            path: anno_dir.to_path_buf(),
        });
    }

    // Single copy into the final buffer.
    let views: Vec<_> = parts.iter().map(|part| part.view()).collect();
    Ok(ndarray::concatenate(Axis(0), &views)?)
}
