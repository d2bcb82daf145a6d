// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Image processing operations: grayscale reduction, smoothing, binarization

use image::{DynamicImage, GrayImage, ImageBuffer, Luma};

/// Intensity written for mask foreground pixels
pub const FOREGROUND: u8 = 255;
/// Intensity written for mask background pixels
pub const BACKGROUND: u8 = 0;

/// Reduce any decoded image to a single 8-bit intensity channel
///
/// 8-bit grayscale input is passed through unchanged. Everything else goes
/// through RGBA and the BT.601 luminance weights.
pub fn to_grayscale(image: &DynamicImage) -> GrayImage {
    match image {
        DynamicImage::ImageLuma8(gray) => gray.clone(),
        other => {
            let rgba = other.to_rgba8();
            rgba_to_grayscale(rgba.as_raw(), rgba.width(), rgba.height())
        }
    }
}

/// Convert RGBA bytes to grayscale image
pub fn rgba_to_grayscale(rgba: &[u8], width: u32, height: u32) -> GrayImage {
    let mut gray = GrayImage::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let i = (y as usize * width as usize + x as usize) * 4;
            if i + 2 < rgba.len() {
                let r = rgba[i] as f32;
                let g = rgba[i + 1] as f32;
                let b = rgba[i + 2] as f32;
                // Standard luminance formula (ITU-R BT.601)
                let luma = (0.299 * r + 0.587 * g + 0.114 * b).round().min(255.0) as u8;
                gray.put_pixel(x, y, Luma([luma]));
            }
        }
    }

    gray
}

/// Standard deviation implied by a Gaussian kernel size
///
/// Same rule the common vision toolkits apply when sigma is left at zero.
pub fn gaussian_sigma(kernel_size: u32) -> f32 {
    0.3 * ((kernel_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalized 1D Gaussian taps for an odd `kernel_size`
pub fn gaussian_kernel(kernel_size: u32) -> Vec<f32> {
    let sigma = gaussian_sigma(kernel_size);
    let radius = (kernel_size / 2) as i32;

    let taps: Vec<f32> = (-radius..=radius)
        .map(|i| (-((i * i) as f32) / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f32 = taps.iter().sum();

    taps.into_iter().map(|t| t / sum).collect()
}

/// Apply Gaussian blur for noise reduction
///
/// The kernel is exactly `kernel_size` taps wide in each direction. Both
/// passes run in floating point and the result is rounded once; borders
/// are padded by replicating the edge pixel.
pub fn gaussian_blur(image: &GrayImage, kernel_size: u32) -> GrayImage {
    let kernel = gaussian_kernel(kernel_size);

    let intensity: ImageBuffer<Luma<f32>, Vec<f32>> =
        ImageBuffer::from_fn(image.width(), image.height(), |x, y| {
            Luma([image.get_pixel(x, y).0[0] as f32])
        });
    let blurred = imageproc::filter::separable_filter_equal(&intensity, &kernel);

    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let value = blurred.get_pixel(x, y).0[0];
        Luma([value.round().clamp(0.0, 255.0) as u8])
    })
}

/// Fixed threshold: pixels strictly above `threshold_value` become foreground
pub fn threshold(image: &GrayImage, threshold_value: u8) -> GrayImage {
    let mut result = GrayImage::new(image.width(), image.height());

    for (x, y, pixel) in image.enumerate_pixels() {
        let value = if pixel.0[0] > threshold_value {
            FOREGROUND
        } else {
            BACKGROUND
        };
        result.put_pixel(x, y, Luma([value]));
    }

    result
}

/// Count of foreground pixels in a binary mask
pub fn foreground_count(mask: &GrayImage) -> usize {
    mask.pixels().filter(|p| p.0[0] == FOREGROUND).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_threshold_is_strict() {
        let mut img = GrayImage::new(3, 1);
        img.put_pixel(0, 0, Luma([199]));
        img.put_pixel(1, 0, Luma([200]));
        img.put_pixel(2, 0, Luma([201]));

        let result = threshold(&img, 200);

        assert_eq!(result.get_pixel(0, 0).0[0], BACKGROUND);
        assert_eq!(result.get_pixel(1, 0).0[0], BACKGROUND);
        assert_eq!(result.get_pixel(2, 0).0[0], FOREGROUND);
        assert_eq!(foreground_count(&result), 1);
    }

    #[test]
    fn test_threshold_output_is_binary() {
        let mut img = GrayImage::new(16, 16);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = Luma([((x * 16 + y) % 256) as u8]);
        }

        let result = threshold(&img, 128);

        assert!(result
            .pixels()
            .all(|p| p.0[0] == FOREGROUND || p.0[0] == BACKGROUND));
    }

    #[test]
    fn test_rgba_to_grayscale() {
        let rgba = vec![
            255, 255, 255, 255, // White
            0, 0, 0, 255, // Black
            255, 0, 0, 255, // Red
            0, 255, 0, 255, // Green
        ];
        let gray = rgba_to_grayscale(&rgba, 2, 2);

        assert_eq!(gray.get_pixel(0, 0).0[0], 255);
        assert_eq!(gray.get_pixel(1, 0).0[0], 0);
        assert_eq!(gray.get_pixel(0, 1).0[0], 76);
        assert_eq!(gray.get_pixel(1, 1).0[0], 150);
    }

    #[test]
    fn test_to_grayscale_keeps_luma_input() {
        let mut img = GrayImage::new(4, 3);
        img.put_pixel(2, 1, Luma([42]));

        let gray = to_grayscale(&DynamicImage::ImageLuma8(img.clone()));

        assert_eq!(gray, img);
    }

    #[test]
    fn test_to_grayscale_from_rgb() {
        let mut img = RgbImage::new(5, 4);
        img.put_pixel(1, 1, Rgb([230, 230, 230]));

        let gray = to_grayscale(&DynamicImage::ImageRgb8(img));

        assert_eq!(gray.dimensions(), (5, 4));
        assert_eq!(gray.get_pixel(1, 1).0[0], 230);
        assert_eq!(gray.get_pixel(0, 0).0[0], 0);
    }

    #[test]
    fn test_gaussian_sigma_from_kernel_size() {
        assert_relative_eq!(gaussian_sigma(5), 1.1, epsilon = 1e-6);
        assert_relative_eq!(gaussian_sigma(3), 0.8, epsilon = 1e-6);
        assert!(gaussian_sigma(1) > 0.0);
    }

    #[test]
    fn test_gaussian_kernel_taps() {
        let kernel = gaussian_kernel(5);

        assert_eq!(kernel.len(), 5);
        assert_relative_eq!(kernel.iter().sum::<f32>(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(kernel[0], kernel[4]);
        assert_relative_eq!(kernel[1], kernel[3]);
        assert_relative_eq!(kernel[2], 0.36955, epsilon = 1e-4);
        assert_relative_eq!(kernel[1], 0.24446, epsilon = 1e-4);
        assert_relative_eq!(kernel[0], 0.07076, epsilon = 1e-4);
        assert_eq!(gaussian_kernel(1), vec![1.0]);
    }

    #[test]
    fn test_blur_reaches_two_pixels_only() {
        let mut img = GrayImage::new(21, 1);
        img.put_pixel(10, 0, Luma([255]));

        let blurred = gaussian_blur(&img, 5);

        assert_eq!(blurred.get_pixel(10, 0).0[0], 94);
        assert_eq!(blurred.get_pixel(9, 0).0[0], 62);
        assert_eq!(blurred.get_pixel(8, 0).0[0], 18);
        assert_eq!(blurred.get_pixel(7, 0).0[0], 0);
        assert_eq!(blurred.get_pixel(13, 0).0[0], 0);
    }

    #[test]
    fn test_dim_block_mask_matches_five_tap_blur() {
        // 24 x 24 block at 217 on black: the rim one pixel in stays just
        // above 200 along the sides, but not in the corners
        let mut img = GrayImage::new(60, 60);
        for y in 18..42 {
            for x in 18..42 {
                img.put_pixel(x, y, Luma([217]));
            }
        }

        let mask = threshold(&gaussian_blur(&img, 5), 200);

        assert_eq!(foreground_count(&mask), 22 * 22 - 4);
        assert_eq!(mask.get_pixel(19, 30).0[0], FOREGROUND);
        assert_eq!(mask.get_pixel(19, 19).0[0], BACKGROUND);
        assert_eq!(mask.get_pixel(18, 30).0[0], BACKGROUND);
    }

    #[test]
    fn test_rgba_index_uses_full_row_stride() {
        let (width, height) = (3, 2);
        let mut rgba = vec![0u8; width as usize * height as usize * 4];
        let last = rgba.len() - 4;
        rgba[last..].copy_from_slice(&[255, 255, 255, 255]);

        let gray = rgba_to_grayscale(&rgba, width, height);

        assert_eq!(gray.get_pixel(2, 1).0[0], 255);
        assert_eq!(gray.get_pixel(2, 0).0[0], 0);
    }

    #[test]
    fn test_blur_preserves_dimensions_and_flat_regions() {
        let mut img = GrayImage::new(40, 30);
        for pixel in img.pixels_mut() {
            *pixel = Luma([120]);
        }

        let blurred = gaussian_blur(&img, 5);

        assert_eq!(blurred.dimensions(), (40, 30));
        assert!(blurred.pixels().all(|p| p.0[0] == 120));
    }

    #[test]
    fn test_blur_softens_block_edges() {
        let mut img = GrayImage::new(40, 40);
        for y in 10..30 {
            for x in 10..30 {
                img.put_pixel(x, y, Luma([255]));
            }
        }

        let blurred = gaussian_blur(&img, 5);

        let edge = blurred.get_pixel(10, 20).0[0];
        let inside = blurred.get_pixel(20, 20).0[0];
        assert!(edge < 255 && edge > 0);
        assert!(inside >= 250);
    }
}
