// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for site plan feature extraction

use crate::error::{Error, Result};
use crate::moments::Moments;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// A 2D point in image space (pixel centers, origin top-left)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<imageproc::point::Point<i32>> for Point2D {
    fn from(p: imageproc::point::Point<i32>) -> Self {
        Self::new(p.x as f64, p.y as f64)
    }
}

/// A connected foreground blob found in the binary mask
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    /// External boundary, in tracing order
    pub boundary: Vec<Point2D>,
    /// Enclosed polygon area in square pixels
    pub area: f64,
    /// Raw spatial moments of the boundary polygon
    pub moments: Moments,
}

impl Region {
    pub fn new(boundary: Vec<Point2D>, area: f64, moments: Moments) -> Self {
        Self {
            boundary,
            area,
            moments,
        }
    }

    /// Build a region from its boundary, deriving area and moments
    pub fn from_boundary(boundary: Vec<Point2D>) -> Self {
        let area = Self::calculate_area(&boundary);
        let moments = Moments::from_polygon(&boundary);
        Self::new(boundary, area, moments)
    }

    /// Calculate polygon area using shoelace formula
    pub fn calculate_area(points: &[Point2D]) -> f64 {
        let n = points.len();
        if n < 3 {
            return 0.0;
        }

        let mut area = 0.0;
        for i in 0..n {
            let j = (i + 1) % n;
            area += points[i].x * points[j].y;
            area -= points[j].x * points[i].y;
        }

        (area / 2.0).abs()
    }
}

/// Area-derived size bucket of a detected property
///
/// Rendered as the literals `small`, `medium` and `large`; downstream
/// consumers reject anything else.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SizeClass {
    Small,
    Medium,
    Large,
}

impl SizeClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            SizeClass::Small => "small",
            SizeClass::Medium => "medium",
            SizeClass::Large => "large",
        }
    }
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SizeClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "small" => Ok(SizeClass::Small),
            "medium" => Ok(SizeClass::Medium),
            "large" => Ok(SizeClass::Large),
            other => Err(Error::InvalidSize(other.to_string())),
        }
    }
}

/// One row of the feature table
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeatureRecord {
    /// Output-space x (`image_width - cy`)
    pub x: i64,
    /// Output-space y (`cx`)
    pub y: i64,
    pub size: SizeClass,
    /// 1-based, contiguous over emitted records
    pub property_id: u32,
}

/// Ordered feature records extracted from one image
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeatureTable {
    /// Source image width
    pub image_width: u32,
    /// Source image height
    pub image_height: u32,
    pub records: Vec<FeatureRecord>,
}

impl FeatureTable {
    pub fn new(image_width: u32, image_height: u32) -> Self {
        Self {
            image_width,
            image_height,
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Order in which accepted regions receive property ids
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RegionOrder {
    /// Order the contour tracer discovered the regions in
    #[default]
    Discovery,
    /// Top-to-bottom, then left-to-right by image-space centroid
    Position,
}

/// Configuration for the extraction pipeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Gaussian blur kernel size (must be odd); sigma is derived from it
    pub blur_kernel_size: u32,
    /// Pixels strictly brighter than this become foreground
    pub threshold: u8,
    /// Exclusive lower bound on accepted region area (square pixels)
    pub min_area: f64,
    /// Exclusive upper bound on accepted region area (square pixels)
    pub max_area: f64,
    /// Smallest area classified as medium
    pub medium_min_area: f64,
    /// Smallest area classified as large
    pub large_min_area: f64,
    pub order: RegionOrder,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            blur_kernel_size: 5,
            threshold: 200,
            min_area: 50.0,
            max_area: 1000.0,
            medium_min_area: 200.0,
            large_min_area: 500.0,
            order: RegionOrder::Discovery,
        }
    }
}

impl ExtractionConfig {
    /// Load a (possibly partial) configuration from a JSON file
    ///
    /// Fields missing from the file keep their default values.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| Error::ConfigFile {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.blur_kernel_size == 0 || self.blur_kernel_size % 2 == 0 {
            return Err(Error::InvalidConfig(format!(
                "blur_kernel_size must be a positive odd number, got {}",
                self.blur_kernel_size
            )));
        }
        if self.min_area < 0.0 || self.min_area >= self.max_area {
            return Err(Error::InvalidConfig(format!(
                "area band ({}, {}) is empty",
                self.min_area, self.max_area
            )));
        }
        if self.medium_min_area > self.large_min_area {
            return Err(Error::InvalidConfig(format!(
                "medium_min_area ({}) exceeds large_min_area ({})",
                self.medium_min_area, self.large_min_area
            )));
        }
        Ok(())
    }

    /// Size bucket for an accepted region area
    pub fn size_class(&self, area: f64) -> SizeClass {
        if area < self.medium_min_area {
            SizeClass::Small
        } else if area < self.large_min_area {
            SizeClass::Medium
        } else {
            SizeClass::Large
        }
    }

    /// Whether an area falls inside the open acceptance band
    pub fn accepts_area(&self, area: f64) -> bool {
        self.min_area < area && area < self.max_area
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_area() {
        // Square 10x10
        let boundary = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(10.0, 0.0),
            Point2D::new(10.0, 10.0),
            Point2D::new(0.0, 10.0),
        ];

        let area = Region::calculate_area(&boundary);
        assert!((area - 100.0).abs() < 0.001);
    }

    #[test]
    fn test_calculate_area_degenerate() {
        assert_eq!(Region::calculate_area(&[]), 0.0);
        assert_eq!(
            Region::calculate_area(&[Point2D::new(1.0, 1.0), Point2D::new(5.0, 1.0)]),
            0.0
        );
    }

    #[test]
    fn test_size_class_boundaries() {
        let config = ExtractionConfig::default();
        assert_eq!(config.size_class(51.0), SizeClass::Small);
        assert_eq!(config.size_class(199.5), SizeClass::Small);
        assert_eq!(config.size_class(200.0), SizeClass::Medium);
        assert_eq!(config.size_class(499.5), SizeClass::Medium);
        assert_eq!(config.size_class(500.0), SizeClass::Large);
        assert_eq!(config.size_class(999.0), SizeClass::Large);
    }

    #[test]
    fn test_area_band_is_open() {
        let config = ExtractionConfig::default();
        assert!(!config.accepts_area(50.0));
        assert!(config.accepts_area(50.5));
        assert!(config.accepts_area(999.5));
        assert!(!config.accepts_area(1000.0));
    }

    #[test]
    fn test_size_class_literals() {
        for size in [SizeClass::Small, SizeClass::Medium, SizeClass::Large] {
            assert_eq!(size.as_str().parse::<SizeClass>().unwrap(), size);
        }

        let err = "huge".parse::<SizeClass>().unwrap_err();
        assert!(matches!(err, Error::InvalidSize(ref s) if s == "huge"));
        assert!(err.to_string().starts_with("Invalid property size"));
        assert!("Small".parse::<SizeClass>().is_err());
    }

    #[test]
    fn test_size_class_serde() {
        let json = serde_json::to_string(&SizeClass::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
    }

    #[test]
    fn test_validate_rejects_bad_config() {
        let even_kernel = ExtractionConfig {
            blur_kernel_size: 4,
            ..Default::default()
        };
        assert!(matches!(even_kernel.validate(), Err(Error::InvalidConfig(_))));

        let inverted_band = ExtractionConfig {
            min_area: 1000.0,
            max_area: 50.0,
            ..Default::default()
        };
        assert!(inverted_band.validate().is_err());

        let unordered_sizes = ExtractionConfig {
            medium_min_area: 600.0,
            large_min_area: 500.0,
            ..Default::default()
        };
        assert!(unordered_sizes.validate().is_err());

        assert!(ExtractionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_missing_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("typo.json");

        let err = ExtractionConfig::from_json_file(&path).unwrap_err();

        assert!(matches!(err, Error::ConfigRead { .. }));
        assert!(err.to_string().starts_with("Cannot read configuration file"));
    }

    #[test]
    fn test_partial_json_config() {
        let config: ExtractionConfig =
            serde_json::from_str(r#"{ "threshold": 180, "order": "position" }"#).unwrap();
        assert_eq!(config.threshold, 180);
        assert_eq!(config.order, RegionOrder::Position);
        assert_eq!(config.blur_kernel_size, 5);
        assert_eq!(config.max_area, 1000.0);
    }
}
