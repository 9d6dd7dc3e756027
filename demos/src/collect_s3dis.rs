//! S3DIS scene collection
//!
//! Walks the raw dataset areas, merges every room's per-object annotation
//! files into one labeled `x y z r g b label` array and writes it as
//! `<area>_<room>.npy` (or `.txt`).
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --bin collect_s3dis -- <data_root> <out_dir> \
//!     [--format numpy|txt] [--classes s3dis_classnames.txt] [Area_1 Area_2 ...]
//! ```

use std::env;
use std::path::PathBuf;
use std::process;

use instant::Instant;

use ccbr_io::{collect_areas, ClassMap, IngestConfig, OutputFormat, DEFAULT_FALLBACK_CLASS};

const S3DIS_CLASSES: [&str; 13] = [
    "ceiling", "floor", "wall", "beam", "column", "window", "door", "table", "chair", "sofa",
    "bookcase", "board", "clutter",
];

const S3DIS_AREAS: [&str; 6] = ["Area_1", "Area_2", "Area_3", "Area_4", "Area_5", "Area_6"];

struct Args {
    data_root: PathBuf,
    out_dir: PathBuf,
    format: OutputFormat,
    classes: Option<PathBuf>,
    areas: Vec<String>,
}

fn parse_args() -> Result<Args, String> {
    let mut positional = Vec::new();
    let mut format = OutputFormat::default();
    let mut classes = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--format" => {
                let value = args.next().ok_or("--format needs a value")?;
                format = value.parse().map_err(|e| format!("{}", e))?;
            }
            "--classes" => {
                classes = Some(PathBuf::from(args.next().ok_or("--classes needs a path")?));
            }
            _ => positional.push(arg),
        }
    }

    if positional.len() < 2 {
        return Err("expected <data_root> <out_dir>".to_string());
    }
    let areas = if positional.len() > 2 {
        positional[2..].to_vec()
    } else {
        S3DIS_AREAS.iter().map(|a| a.to_string()).collect()
    };

    Ok(Args {
        data_root: PathBuf::from(&positional[0]),
        out_dir: PathBuf::from(&positional[1]),
        format,
        classes,
        areas,
    })
}

fn main() {
    env_logger::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!(
                "Usage: collect_s3dis <data_root> <out_dir> [--format numpy|txt] [--classes file] [areas...]"
            );
            process::exit(2);
        }
    };

    let class_map = match &args.classes {
        Some(path) => ClassMap::from_file(path, DEFAULT_FALLBACK_CLASS),
        None => ClassMap::new(&S3DIS_CLASSES[..], DEFAULT_FALLBACK_CLASS),
    };
    let class_map = match class_map {
        Ok(map) => map,
        Err(e) => {
            eprintln!("Error loading class names: {}", e);
            process::exit(1);
        }
    };

    println!("Classes ({}): {}", class_map.len(), class_map.names().join(", "));
    println!("Areas: {}", args.areas.join(", "));
    println!("Output: {} ({})", args.out_dir.display(), args.format);

    if let Err(e) = std::fs::create_dir_all(&args.out_dir) {
        eprintln!("Error creating '{}': {}", args.out_dir.display(), e);
        process::exit(1);
    }

    let config = IngestConfig::new(class_map).with_format(args.format);

    let start = Instant::now();
    let report = match collect_areas(&args.data_root, &args.areas, &args.out_dir, &config) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    let elapsed = start.elapsed();

    println!();
    println!(
        "Wrote {} of {} scenes in {:.2}s",
        report.written.len(),
        report.total(),
        elapsed.as_secs_f64()
    );
    for failure in &report.failed {
        println!("  FAILED {}: {}", failure.scene.display(), failure.error);
    }
}
