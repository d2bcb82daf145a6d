// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Raster image loading

use crate::error::{Error, Result};
use image::{DynamicImage, ImageError, ImageReader};
use std::path::Path;

/// Decode a raster image (PNG, JPEG, BMP) from disk
///
/// The format is sniffed from the file contents, falling back to the
/// extension. Missing, unreadable, and undecodable files all fail with
/// [`Error::ImageLoad`].
pub fn load_image(path: impl AsRef<Path>) -> Result<DynamicImage> {
    let path = path.as_ref();
    let load_error = |source: ImageError| Error::ImageLoad {
        path: path.to_path_buf(),
        source,
    };

    let image = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| load_error(ImageError::IoError(e)))?
        .decode()
        .map_err(load_error)?;

    tracing::debug!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        color = ?image.color(),
        "Loaded image"
    );

    Ok(image)
}
