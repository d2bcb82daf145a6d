// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Property point extraction from raster site plans
//!
//! This crate turns a site-plan or floor-plan image into a table of
//! property points:
//! 1. Loading the raster image
//! 2. Grayscale reduction and Gaussian smoothing
//! 3. Fixed-threshold binarization of light regions
//! 4. External contour tracing
//! 5. Area filtering, centroid, size classification and id assignment
//! 6. CSV export of `x, y, size, property_id`
//!
//! # Usage
//!
//! ```rust,ignore
//! use siteplan_vision::{extract_features, load_image, save_feature_table, ExtractionConfig};
//!
//! let image = load_image("plan.png")?;
//! let table = extract_features(&image, &ExtractionConfig::default())?;
//! save_feature_table(&table, "detected_houses_coordinates.csv")?;
//! ```

pub mod classifier;
pub mod error;
pub mod exporter;
pub mod image_ops;
pub mod loader;
pub mod moments;
pub mod region_detector;
pub mod types;

// Re-export commonly used types and functions
pub use classifier::{classify_regions, rotate_to_output};
pub use error::{Error, Result};
pub use exporter::{
    feature_table_to_json, feature_table_to_string, load_feature_table, read_feature_table,
    save_feature_table, write_feature_table,
};
pub use image_ops::{gaussian_blur, gaussian_kernel, rgba_to_grayscale, threshold, to_grayscale};
pub use loader::load_image;
pub use moments::Moments;
pub use region_detector::{detect_regions, ContourRegionDetector, RegionDetector};
pub use types::{
    ExtractionConfig, FeatureRecord, FeatureTable, Point2D, Region, RegionOrder, SizeClass,
};

use image::{DynamicImage, GrayImage};
use std::path::Path;

/// Smooth and binarize a grayscale image into a foreground mask
pub fn segment(grayscale: &GrayImage, config: &ExtractionConfig) -> GrayImage {
    let blurred = gaussian_blur(grayscale, config.blur_kernel_size);
    let mask = threshold(&blurred, config.threshold);

    tracing::debug!(
        kernel = config.blur_kernel_size,
        threshold = config.threshold,
        foreground = image_ops::foreground_count(&mask),
        "Segmented image"
    );

    mask
}

/// Extract the feature table from a grayscale image using a given detector
///
/// Each stage only borrows the previous stage's buffer, which is released
/// as soon as the next one has been produced.
pub fn detect_features_with<D: RegionDetector + ?Sized>(
    grayscale: &GrayImage,
    config: &ExtractionConfig,
    detector: &D,
) -> Result<FeatureTable> {
    config.validate()?;

    let width = grayscale.width();
    let height = grayscale.height();

    let mask = segment(grayscale, config);
    let regions = detector.detect_external_regions(&mask);
    drop(mask);

    Ok(classify_regions(regions, width, height, config))
}

/// Extract the feature table from a grayscale image
pub fn detect_features(grayscale: &GrayImage, config: &ExtractionConfig) -> Result<FeatureTable> {
    detect_features_with(grayscale, config, &ContourRegionDetector)
}

/// Extract the feature table from any decoded image
pub fn extract_features(image: &DynamicImage, config: &ExtractionConfig) -> Result<FeatureTable> {
    let grayscale = to_grayscale(image);
    detect_features(&grayscale, config)
}

/// Extract the feature table from raw RGBA pixel data
///
/// # Arguments
///
/// * `rgba_data` - RGBA pixel data (4 bytes per pixel)
/// * `width` - Image width
/// * `height` - Image height
/// * `config` - Extraction configuration
pub fn extract_features_from_rgba(
    rgba_data: &[u8],
    width: u32,
    height: u32,
    config: &ExtractionConfig,
) -> Result<FeatureTable> {
    let grayscale = rgba_to_grayscale(rgba_data, width, height);
    detect_features(&grayscale, config)
}

/// Full pipeline: load `image_path`, extract features, write `output_path`
///
/// A load failure aborts before any processing. The table is only written
/// once extraction has completed, and it is written atomically.
pub fn run(
    image_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<FeatureTable> {
    let image_path = image_path.as_ref();
    let output_path = output_path.as_ref();

    let image = load_image(image_path)?;
    let table = extract_features(&image, config)?;
    drop(image);

    save_feature_table(&table, output_path)?;

    tracing::info!(
        image = %image_path.display(),
        output = %output_path.display(),
        properties = table.len(),
        "Extracted property coordinates"
    );

    Ok(table)
}
