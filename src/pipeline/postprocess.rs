//! Image post-processing: grayscale, rotation, PNG persistence.
//!
//! Rotation is restricted to right angles, so "expand the canvas to fit"
//! comes for free — a quarter turn just swaps width and height, no
//! resampling and no corner clipping.

use crate::config::Rotation;
use crate::error::ConvertError;
use image::DynamicImage;
use std::path::Path;

/// Apply the requested transforms in order: grayscale first, then rotation.
pub fn apply_transforms(image: DynamicImage, grayscale: bool, rotation: Rotation) -> DynamicImage {
    let image = if grayscale { image.grayscale() } else { image };
    rotate(image, rotation)
}

/// Rotate counter-clockwise by the given right angle.
fn rotate(image: DynamicImage, rotation: Rotation) -> DynamicImage {
    match rotation {
        Rotation::None => image,
        // `rotate90`/`rotate270` turn clockwise; counter-clockwise is the
        // opposite one.
        Rotation::Ccw90 => image.rotate270(),
        Rotation::Ccw180 => image.rotate180(),
        Rotation::Ccw270 => image.rotate90(),
    }
}

/// Persist the image as PNG. The parent directory must already exist.
pub fn save_png(image: &DynamicImage, path: &Path) -> Result<(), ConvertError> {
    image
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| ConvertError::SaveFailed {
            path: path.to_path_buf(),
            source: e,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn sample(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([200, 10, 10, 255]),
        ))
    }

    #[test]
    fn quarter_turns_swap_dimensions() {
        let rotated = apply_transforms(sample(40, 20), false, Rotation::Ccw90);
        assert_eq!((rotated.width(), rotated.height()), (20, 40));

        let rotated = apply_transforms(sample(40, 20), false, Rotation::Ccw270);
        assert_eq!((rotated.width(), rotated.height()), (20, 40));
    }

    #[test]
    fn half_turn_keeps_dimensions() {
        let rotated = apply_transforms(sample(40, 20), false, Rotation::Ccw180);
        assert_eq!((rotated.width(), rotated.height()), (40, 20));
    }

    #[test]
    fn grayscale_collapses_channels() {
        let gray = apply_transforms(sample(8, 8), true, Rotation::None);
        assert_eq!(gray.color().channel_count(), 1);
    }

    #[test]
    fn save_png_writes_a_decodable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.png");
        save_png(&sample(4, 4), &path).unwrap();

        let reloaded = image::open(&path).unwrap();
        assert_eq!((reloaded.width(), reloaded.height()), (4, 4));
    }

    #[test]
    fn save_png_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("page.png");
        assert!(matches!(
            save_png(&sample(4, 4), &path),
            Err(ConvertError::SaveFailed { .. })
        ));
    }
}
