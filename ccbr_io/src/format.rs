//! Scene file formats.
//!
//! # Numpy
//!
//! `.npy` file holding an `f32` array of shape `[n, 7]`.
//!
//! # Text
//!
//! ```text
//! x y z r g b label
//! 0.125000 1.500000 2.000000 255 128 0 3
//! ```
//!
//! Coordinates are written with six decimals; colour and label columns are
//! truncated to integers.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use ndarray::Array2;
use ndarray_npy::{read_npy, write_npy};

use crate::config::OutputFormat;
use crate::error::{CcbrIoError, Result};
use crate::scene::SCENE_COLUMNS;

/// Write a labeled scene in the requested format.
pub fn write_scene(scene: &Array2<f32>, path: &Path, format: OutputFormat) -> Result<()> {
    check_columns(scene)?;
    match format {
        OutputFormat::Numpy => write_npy(path, scene)?,
        OutputFormat::Text => write_text(scene, path)?,
    }
    Ok(())
}

/// Write a labeled scene as XYZRGBL text lines.
pub fn write_text(scene: &Array2<f32>, path: &Path) -> Result<()> {
    check_columns(scene)?;
    let mut writer = BufWriter::new(File::create(path)?);
    for row in scene.rows() {
        writeln!(
            writer,
            "{:.6} {:.6} {:.6} {} {} {} {}",
            row[0], row[1], row[2], row[3] as i64, row[4] as i64, row[5] as i64, row[6] as i64
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// Load a `.npy` scene written by [`write_scene`].
pub fn load_scene(path: &Path) -> Result<Array2<f32>> {
    let scene: Array2<f32> = read_npy(path)?;
    check_columns(&scene)?;
    Ok(scene)
}

fn check_columns(scene: &Array2<f32>) -> Result<()> {
    if scene.ncols() != SCENE_COLUMNS {
        return Err(CcbrIoError::InvalidScene {
            expected: SCENE_COLUMNS,
            got: scene.ncols(),
        });
    }
    Ok(())
}
