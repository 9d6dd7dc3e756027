//! Ingestion configuration: class-name mapping and output format.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::{CcbrIoError, Result};

/// Class used for annotation files whose name is not in the class list.
pub const DEFAULT_FALLBACK_CLASS: &str = "clutter";

/// Mapping from class name to integer label.
///
/// Labels are the positions of the names in the class list. Unknown names
/// resolve to the label of the fallback class, which must be in the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMap {
    names: Vec<String>,
    labels: HashMap<String, u32>,
    fallback: u32,
}

impl ClassMap {
    /// Build a class map from an ordered list of class names.
    pub fn new<S: AsRef<str>>(names: &[S], fallback: &str) -> Result<Self> {
        if names.is_empty() {
            return Err(CcbrIoError::InvalidClassMap {
                message: "class list is empty".to_string(),
            });
        }

        let names: Vec<String> = names.iter().map(|n| n.as_ref().to_string()).collect();
        let mut labels = HashMap::with_capacity(names.len());
        for (label, name) in names.iter().enumerate() {
            if labels.insert(name.clone(), label as u32).is_some() {
                return Err(CcbrIoError::InvalidClassMap {
                    message: format!("duplicate class name {name}"),
                });
            }
        }

        let fallback = *labels
            .get(fallback)
            .ok_or_else(|| CcbrIoError::InvalidClassMap {
                message: format!("fallback class {fallback} is not in the class list"),
            })?;

        Ok(Self {
            names,
            labels,
            fallback,
        })
    }

    /// Load a class list with one name per line.
    ///
    /// Trailing whitespace is stripped and blank lines are skipped.
    pub fn from_file<P: AsRef<Path>>(path: P, fallback: &str) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        let names: Vec<&str> = contents
            .lines()
            .map(str::trim_end)
            .filter(|l| !l.is_empty())
            .collect();
        Self::new(&names, fallback)
    }

    /// Label for a class name, falling back for unknown names.
    #[inline]
    pub fn label_of(&self, name: &str) -> u32 {
        self.labels.get(name).copied().unwrap_or(self.fallback)
    }

    /// Whether the name is in the class list.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.labels.contains_key(name)
    }

    /// Label of the fallback class.
    #[inline]
    pub fn fallback_label(&self) -> u32 {
        self.fallback
    }

    /// Class names in label order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of classes.
    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false for a constructed map.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// File format for collected scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `.npy` array of `f32` with shape `[n, 7]`.
    #[default]
    Numpy,
    /// Text file, one `x y z r g b label` line per point.
    Text,
}

impl OutputFormat {
    /// File extension used for this format.
    pub const fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Numpy => "npy",
            OutputFormat::Text => "txt",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = CcbrIoError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "numpy" | "npy" => Ok(OutputFormat::Numpy),
            "txt" | "text" => Ok(OutputFormat::Text),
            other => Err(CcbrIoError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Numpy => write!(f, "numpy"),
            OutputFormat::Text => write!(f, "txt"),
        }
    }
}

/// Configuration threaded through every ingestion call.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Class-name to label mapping.
    pub class_map: ClassMap,
    /// Output file format.
    pub format: OutputFormat,
}

impl IngestConfig {
    /// Create a configuration writing `.npy` files.
    pub fn new(class_map: ClassMap) -> Self {
        Self {
            class_map,
            format: OutputFormat::default(),
        }
    }

    /// Set the output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s3dis_names() -> Vec<&'static str> {
        vec![
            "ceiling", "floor", "wall", "beam", "column", "window", "door", "table", "chair",
            "sofa", "bookcase", "board", "clutter",
        ]
    }

    #[test]
    fn test_labels_follow_list_order() {
        let map = ClassMap::new(&s3dis_names(), DEFAULT_FALLBACK_CLASS).unwrap();
        assert_eq!(map.label_of("ceiling"), 0);
        assert_eq!(map.label_of("chair"), 8);
        assert_eq!(map.len(), 13);
    }

    #[test]
    fn test_unknown_class_falls_back() {
        let map = ClassMap::new(&s3dis_names(), DEFAULT_FALLBACK_CLASS).unwrap();
        assert!(!map.contains("stairs"));
        assert_eq!(map.label_of("stairs"), 12);
        assert_eq!(map.fallback_label(), 12);
    }

    #[test]
    fn test_missing_fallback_rejected() {
        let err = ClassMap::new(&["floor", "wall"], DEFAULT_FALLBACK_CLASS).unwrap_err();
        assert!(matches!(err, CcbrIoError::InvalidClassMap { .. }));
    }

    #[test]
    fn test_duplicate_rejected() {
        assert!(ClassMap::new(&["wall", "wall", "clutter"], "clutter").is_err());
        assert!(ClassMap::new::<&str>(&[], "clutter").is_err());
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("numpy".parse::<OutputFormat>().unwrap(), OutputFormat::Numpy);
        assert_eq!("txt".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!(matches!(
            "ply".parse::<OutputFormat>(),
            Err(CcbrIoError::UnknownFormat(ref f)) if f == "ply"
        ));
        assert_eq!(OutputFormat::Text.extension(), "txt");
    }
}
