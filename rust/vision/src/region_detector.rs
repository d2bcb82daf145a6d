// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Blob extraction via external contour finding

use crate::types::{Point2D, Region};
use image::GrayImage;
use imageproc::contours::{find_contours, BorderType, Contour};

/// Finds candidate feature regions in a binary mask
///
/// Implementations must report external boundaries only (a blob with a
/// hole is one solid region, and blobs inside holes are ignored) and must
/// return regions in the order they were discovered.
pub trait RegionDetector {
    fn detect_external_regions(&self, mask: &GrayImage) -> Vec<Region>;
}

/// Suzuki–Abe border following, backed by `imageproc::contours`
///
/// Regions come out in raster-scan order of their first boundary pixel.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContourRegionDetector;

impl RegionDetector for ContourRegionDetector {
    fn detect_external_regions(&self, mask: &GrayImage) -> Vec<Region> {
        let contours = find_contours::<i32>(mask);
        let total = contours.len();

        let regions: Vec<Region> = contours
            .into_iter()
            .filter(is_external)
            .map(|contour| {
                let boundary = contour.points.into_iter().map(Point2D::from).collect();
                Region::from_boundary(boundary)
            })
            .collect();

        tracing::debug!(
            contours = total,
            external = regions.len(),
            "Traced mask contours"
        );

        regions
    }
}

/// Outermost borders only: holes and everything nested in them are skipped
fn is_external(contour: &Contour<i32>) -> bool {
    matches!(contour.border_type, BorderType::Outer) && contour.parent.is_none()
}

/// Detect external regions with the default contour tracer
pub fn detect_regions(mask: &GrayImage) -> Vec<Region> {
    ContourRegionDetector.detect_external_regions(mask)
}
