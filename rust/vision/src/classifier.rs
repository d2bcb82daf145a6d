// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Region classification into feature records
//!
//! Each region, in the order given, goes through:
//! 1. Area filter: kept only when `min_area < area < max_area`
//! 2. Centroid `(trunc(m10 / m00), trunc(m01 / m00))`, skipped when `m00 == 0`
//! 3. Rotation into output space: `x = image_width - cy`, `y = cx`
//! 4. Size bucket from the area
//! 5. Property id, counting only emitted records
//!
//! Dropped regions never produce an error and never consume an id.

use crate::types::{
    ExtractionConfig, FeatureRecord, FeatureTable, Region, RegionOrder, SizeClass,
};

/// Accepted region, before an id is assigned
#[derive(Debug, Clone, Copy)]
struct Candidate {
    cx: i64,
    cy: i64,
    size: SizeClass,
}

/// Rotate an image-space centroid 90° clockwise into output space
///
/// Output consumers depend on exactly this mapping.
pub fn rotate_to_output(cx: i64, cy: i64, image_width: u32) -> (i64, i64) {
    (image_width as i64 - cy, cx)
}

/// Classify regions into a feature table
///
/// `image_width`/`image_height` are the dimensions of the image the regions
/// were traced in.
pub fn classify_regions(
    regions: Vec<Region>,
    image_width: u32,
    image_height: u32,
    config: &ExtractionConfig,
) -> FeatureTable {
    let total = regions.len();
    let mut candidates: Vec<Candidate> = regions
        .into_iter()
        .enumerate()
        .filter_map(|(index, region)| accept_region(index, &region, config))
        .collect();

    if config.order == RegionOrder::Position {
        candidates.sort_by_key(|c| (c.cy, c.cx));
    }

    let mut table = FeatureTable::new(image_width, image_height);
    let mut next_id: u32 = 1;
    for candidate in candidates {
        let (x, y) = rotate_to_output(candidate.cx, candidate.cy, image_width);
        table.records.push(FeatureRecord {
            x,
            y,
            size: candidate.size,
            property_id: next_id,
        });
        next_id += 1;
    }

    tracing::debug!(
        regions = total,
        accepted = table.len(),
        dropped = total - table.len(),
        "Classified regions"
    );

    table
}

fn accept_region(index: usize, region: &Region, config: &ExtractionConfig) -> Option<Candidate> {
    if !config.accepts_area(region.area) {
        tracing::trace!(index, area = region.area, "Region outside area band");
        return None;
    }

    let Some((cx, cy)) = region.moments.centroid() else {
        tracing::trace!(index, area = region.area, "Region has zero m00");
        return None;
    };

    Some(Candidate {
        cx: cx.trunc() as i64,
        cy: cy.trunc() as i64,
        size: config.size_class(region.area),
    })
}
