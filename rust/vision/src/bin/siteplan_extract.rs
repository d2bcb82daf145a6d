// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: Extract property coordinates from a site plan image (CSV output)
//!
//! Usage:
//!   siteplan-extract <image_path> [options]

use siteplan_vision::{
    detect_features, feature_table_to_json, load_image, save_feature_table, to_grayscale,
    ExtractionConfig, FeatureTable, RegionOrder, SizeClass,
};
use std::env;
use std::error::Error as _;
use std::process;

const DEFAULT_OUTPUT: &str = "detected_houses_coordinates.csv";

struct Options {
    image_path: String,
    output_path: String,
    config_path: Option<String>,
    threshold: Option<u8>,
    order: Option<RegionOrder>,
    json: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(env::var("RUST_LOG").unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let options = match parse_options(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {}", message);
            print_usage();
            process::exit(2);
        }
    };

    if let Err(e) = run(&options) {
        eprintln!("Error: {}", e);
        let mut source = e.source();
        while let Some(cause) = source {
            eprintln!("  caused by: {}", cause);
            source = cause.source();
        }
        process::exit(1);
    }
}

fn parse_options(args: &[String]) -> Result<Options, String> {
    let mut options = Options {
        image_path: args[1].clone(),
        output_path: DEFAULT_OUTPUT.to_string(),
        config_path: None,
        threshold: None,
        order: None,
        json: false,
    };

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--output" => options.output_path = flag_value(args, &mut i)?.to_string(),
            "--config" => options.config_path = Some(flag_value(args, &mut i)?.to_string()),
            "--threshold" => {
                let value = flag_value(args, &mut i)?;
                let parsed = value
                    .parse()
                    .map_err(|_| format!("Invalid threshold value: {}", value))?;
                options.threshold = Some(parsed);
            }
            "--order" => {
                options.order = Some(match flag_value(args, &mut i)? {
                    "discovery" => RegionOrder::Discovery,
                    "position" => RegionOrder::Position,
                    other => return Err(format!("Invalid order: {}", other)),
                });
            }
            "--json" => options.json = true,
            other if !other.starts_with('-') && i == 2 => {
                options.output_path = other.to_string();
            }
            other => return Err(format!("Unknown option: {}", other)),
        }
        i += 1;
    }

    Ok(options)
}

fn flag_value<'a>(args: &'a [String], i: &mut usize) -> Result<&'a str, String> {
    let flag = &args[*i];
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("Missing value for {}", flag))
}

fn run(options: &Options) -> siteplan_vision::Result<()> {
    let mut config = match &options.config_path {
        Some(path) => ExtractionConfig::from_json_file(path)?,
        None => ExtractionConfig::default(),
    };
    if let Some(threshold) = options.threshold {
        config.threshold = threshold;
    }
    if let Some(order) = options.order {
        config.order = order;
    }

    let say = |line: String| {
        if !options.json {
            println!("{}", line);
        }
    };

    say("=== Site Plan Property Extraction ===".into());
    say(format!("[1/3] Loading image: {}", options.image_path));
    let image = load_image(&options.image_path)?;
    say(format!("  Image size: {}x{} pixels", image.width(), image.height()));

    say(format!(
        "[2/3] Detecting properties (blur {}x{}, threshold > {}, area {}..{})",
        config.blur_kernel_size,
        config.blur_kernel_size,
        config.threshold,
        config.min_area,
        config.max_area
    ));
    let grayscale = to_grayscale(&image);
    drop(image);
    let table = detect_features(&grayscale, &config)?;
    for line in summary(&table) {
        say(line);
    }

    say(format!("[3/3] Writing CSV file: {}", options.output_path));
    save_feature_table(&table, &options.output_path)?;

    if options.json {
        println!("{}", feature_table_to_json(&table)?);
    } else {
        println!();
        println!("Property coordinates saved to {}", options.output_path);
    }

    Ok(())
}

fn summary(table: &FeatureTable) -> Vec<String> {
    let count = |size: SizeClass| table.records.iter().filter(|r| r.size == size).count();
    vec![
        format!("  Properties detected: {}", table.len()),
        format!(
            "    small: {}  medium: {}  large: {}",
            count(SizeClass::Small),
            count(SizeClass::Medium),
            count(SizeClass::Large)
        ),
    ]
}

fn print_usage() {
    println!(
        r#"Site Plan Property Extraction
=============================

Detects light-colored building footprints in a site plan image and writes
their rotated centroid coordinates, size class and property id as CSV.

USAGE:
  siteplan-extract <image_path> [output_csv] [OPTIONS]

ARGUMENTS:
  <image_path>              Path to site plan image (PNG, JPEG, BMP)
  [output_csv]              Output CSV path (default: {DEFAULT_OUTPUT})

OPTIONS:
  --output <path>           Output CSV path
  --config <path>           JSON extraction config (missing fields use defaults)
  --threshold <0-255>       Foreground threshold (default: 200)
  --order <discovery|position>
                            Property id order (default: discovery)
  --json                    Print the table as JSON instead of progress output
  -h, --help                Show this help message

OUTPUT COLUMNS:
  x            image_width - centroid_y
  y            centroid_x
  size         small (< 200 px²), medium (< 500 px²), large
  property_id  1-based, in detection order

LOGGING:
  RUST_LOG=debug siteplan-extract plan.png"#
    );
}
