//! Image preprocessing before recognition.

use image::{DynamicImage, GenericImageView};
use tracing::debug;

/// Rotates and downscales images ahead of OCR.
pub struct ImagePreprocessor {
    /// Maximum image dimension.
    max_size: u32,
    /// Counter-clockwise rotation in degrees.
    rotate_degrees: u32,
}

impl ImagePreprocessor {
    /// Create a new preprocessor with default settings.
    pub fn new() -> Self {
        Self {
            max_size: 2048,
            rotate_degrees: 0,
        }
    }

    /// Set maximum image dimension.
    pub fn with_max_size(mut self, size: u32) -> Self {
        self.max_size = size;
        self
    }

    /// Set the counter-clockwise rotation, the way PIL's `rotate` turns an
    /// image. Values are taken modulo 360 and rounded down to a quarter turn.
    pub fn with_rotation(mut self, degrees: u32) -> Self {
        self.rotate_degrees = (degrees % 360) / 90 * 90;
        self
    }

    /// Rotate, then shrink so the longer side fits `max_size`.
    pub fn prepare(&self, image: &DynamicImage) -> DynamicImage {
        let rotated = match self.rotate_degrees {
            90 => image.rotate270(),
            180 => image.rotate180(),
            270 => image.rotate90(),
            _ => image.clone(),
        };

        let (width, height) = rotated.dimensions();
        let (new_width, new_height) = self.calculate_resize_dimensions(width, height);
        if (new_width, new_height) == (width, height) {
            return rotated;
        }

        debug!(
            "Resizing image from {}x{} to {}x{}",
            width, height, new_width, new_height
        );
        rotated.resize_exact(new_width, new_height, image::imageops::FilterType::Lanczos3)
    }

    fn calculate_resize_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        let longer = width.max(height);
        if longer <= self.max_size || longer == 0 {
            return (width, height);
        }

        let scale = self.max_size as f32 / longer as f32;
        let new_width = ((width as f32 * scale).round() as u32).max(1);
        let new_height = ((height as f32 * scale).round() as u32).max(1);
        (new_width, new_height)
    }
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_dimensions() {
        let preprocessor = ImagePreprocessor::new().with_max_size(1000);
        assert_eq!(preprocessor.calculate_resize_dimensions(800, 600), (800, 600));
        assert_eq!(preprocessor.calculate_resize_dimensions(2000, 1000), (1000, 500));
        assert_eq!(preprocessor.calculate_resize_dimensions(500, 4000), (125, 1000));
    }

    #[test]
    fn test_rotation_swaps_dimensions() {
        let image = DynamicImage::new_rgb8(40, 10);

        let rotated = ImagePreprocessor::new().with_rotation(90).prepare(&image);
        assert_eq!(rotated.dimensions(), (10, 40));

        let upside_down = ImagePreprocessor::new().with_rotation(180).prepare(&image);
        assert_eq!(upside_down.dimensions(), (40, 10));

        let full_turn = ImagePreprocessor::new().with_rotation(450).prepare(&image);
        assert_eq!(full_turn.dimensions(), (10, 40));
    }

    /// 2x1 image with a red pixel in the top-right corner.
    fn marked_image() -> DynamicImage {
        let mut pixels = image::RgbImage::new(2, 1);
        pixels.put_pixel(1, 0, image::Rgb([255, 0, 0]));
        DynamicImage::ImageRgb8(pixels)
    }

    #[test]
    fn test_rotation_is_counter_clockwise() {
        let red = image::Rgb([255, 0, 0]);

        // A quarter turn left moves the top-right corner to the top-left.
        let left = ImagePreprocessor::new().with_rotation(90).prepare(&marked_image());
        let left = left.to_rgb8();
        assert_eq!(left.dimensions(), (1, 2));
        assert_eq!(*left.get_pixel(0, 0), red);

        let right = ImagePreprocessor::new().with_rotation(270).prepare(&marked_image());
        let right = right.to_rgb8();
        assert_eq!(*right.get_pixel(0, 1), red);

        let flipped = ImagePreprocessor::new().with_rotation(180).prepare(&marked_image());
        assert_eq!(*flipped.to_rgb8().get_pixel(0, 0), red);
    }

    #[test]
    fn test_prepare_downscales_after_rotation() {
        let image = DynamicImage::new_rgb8(400, 100);
        let prepared = ImagePreprocessor::new()
            .with_rotation(270)
            .with_max_size(200)
            .prepare(&image);
        assert_eq!(prepared.dimensions(), (50, 200));
    }
}
