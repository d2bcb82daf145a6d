// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Runs the extraction pipeline on a generated site plan
//!
//! Run with: cargo run -p siteplan-vision --example synthetic_plan

use image::{DynamicImage, Rgb, RgbImage};
use siteplan_vision::{
    extract_features, feature_table_to_string, save_feature_table, ExtractionConfig, RegionOrder,
};

fn main() {
    println!("=== Site Plan Extraction Demo ===\n");

    let plan = create_synthetic_site_plan();
    println!("Plan: {}x{} pixels", plan.width(), plan.height());

    let config = ExtractionConfig::default();
    let table = match extract_features(&plan, &config) {
        Ok(table) => table,
        Err(e) => {
            eprintln!("Extraction failed: {}", e);
            std::process::exit(1);
        }
    };

    println!("Detected {} properties (discovery order):", table.len());
    print!("{}", feature_table_to_string(&table));

    let by_position = ExtractionConfig {
        order: RegionOrder::Position,
        ..config
    };
    if let Ok(sorted) = extract_features(&plan, &by_position) {
        println!("\nSame plan, ids by position:");
        print!("{}", feature_table_to_string(&sorted));
    }

    let output = std::env::temp_dir().join("synthetic_plan_houses.csv");
    match save_feature_table(&table, &output) {
        Ok(()) => println!("\nSaved to {}", output.display()),
        Err(e) => eprintln!("\nCould not save table: {}", e),
    }
}

/// Dark green background, light grey houses of varying size, some noise
fn create_synthetic_site_plan() -> DynamicImage {
    let mut img = RgbImage::from_pixel(320, 240, Rgb([34, 85, 40]));

    // Road
    for y in 110..130 {
        for x in 0..320 {
            img.put_pixel(x, y, Rgb([90, 90, 90]));
        }
    }

    // (x, y, width, height) of each house footprint
    let houses = [
        (20, 20, 12, 14),
        (60, 25, 18, 20),
        (110, 15, 26, 26),
        (200, 30, 14, 12),
        (40, 150, 30, 22),
        (150, 160, 16, 16),
        (240, 145, 24, 30),
    ];
    for (hx, hy, w, h) in houses {
        for y in hy..hy + h {
            for x in hx..hx + w {
                img.put_pixel(x, y, Rgb([235, 235, 230]));
            }
        }
    }

    // Isolated bright specks that should be filtered as noise
    for (x, y) in [(300, 10), (10, 220), (180, 100)] {
        img.put_pixel(x, y, Rgb([255, 255, 255]));
    }

    // A large light lot that exceeds the area band
    for y in 170..225 {
        for x in 80..130 {
            img.put_pixel(x, y, Rgb([240, 240, 240]));
        }
    }

    DynamicImage::ImageRgb8(img)
}
