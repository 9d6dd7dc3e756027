//! ccbr_io - data ingestion for few-shot point-cloud segmentation.
//!
//! Turns raw per-room annotation folders (one text file per object instance,
//! `x y z r g b` per line) into labeled point arrays that the model consumes.
//!
//! # Core Types
//!
//! - [`ClassMap`]: class-name to label mapping with a fallback class
//! - [`IngestConfig`]: class map plus output format, passed to every call
//! - [`IngestReport`]: written files and per-room failures of a batch job
//!
//! # Example
//!
//! ```ignore
//! use ccbr_io::{collect_areas, ClassMap, IngestConfig, OutputFormat};
//!
//! let class_map = ClassMap::from_file("meta/s3dis_classnames.txt", "clutter")?;
//! let config = IngestConfig::new(class_map).with_format(OutputFormat::Numpy);
//!
//! let report = collect_areas(
//!     Path::new("Stanford3dDataset_v1.2_Aligned_Version"),
//!     &["Area_1", "Area_2"],
//!     Path::new("datasets/S3DIS/scenes/data"),
//!     &config,
//! )?;
//! println!("{} scenes written, {} failed", report.written.len(), report.failed.len());
//! ```

#![warn(missing_docs)]

pub mod batch;
pub mod config;
pub mod error;
pub mod format;
pub mod scene;

pub use batch::{
    collect_area, collect_areas, collect_room, scene_dirs, scene_output_name, IngestReport,
    SceneFailure,
};
pub use config::{ClassMap, IngestConfig, OutputFormat, DEFAULT_FALLBACK_CLASS};
pub use error::{CcbrIoError, Result};
pub use format::{load_scene, write_scene, write_text};
pub use scene::{
    annotation_files, class_name_of, collect_scene, read_annotation, ANNOTATIONS_DIR,
    POINT_COLUMNS, SCENE_COLUMNS,
};
