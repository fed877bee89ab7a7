//! Image post-processing: content trim and aspect-aware resize.
//!
//! Both operations work on the saved file and write in place unless a
//! distinct output path is given. When both are requested, trim runs first.

use image::imageops::FilterType;
use image::GenericImageView;
use std::path::Path;

use crate::config::ResizeOptions;
use crate::error::TweetshotError;

/// Crop the image to the bounding box of everything that differs from the
/// background color, taken from the top-left corner pixel, with zero
/// tolerance. A uniform image is left unchanged.
pub fn trim_image(input: &Path, output: Option<&Path>) -> Result<(), TweetshotError> {
    let output = output.unwrap_or(input);
    let img = open_image(input)?;
    let background = img.get_pixel(0, 0);

    let (width, height) = img.dimensions();
    let mut min_x = width;
    let mut min_y = height;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    let mut found = false;

    for (x, y, pixel) in img.pixels() {
        if pixel != background {
            found = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    let result = if found {
        img.crop_imm(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1)
    } else {
        img
    };
    save_image(&result, output)
}

/// Resize the image. With both dimensions set the target box is used as-is;
/// with only one, the other is scaled to preserve the aspect ratio. Neither
/// dimension set is a configuration error.
pub fn resize_image(
    input: &Path,
    output: Option<&Path>,
    options: &ResizeOptions,
) -> Result<(), TweetshotError> {
    let output = output.unwrap_or(input);
    let img = open_image(input)?;
    let (old_width, old_height) = img.dimensions();
    let (new_width, new_height) = target_dimensions(old_width, old_height, options)?;
    let resized = img.resize_exact(new_width, new_height, FilterType::Lanczos3);
    save_image(&resized, output)
}

pub(crate) fn target_dimensions(
    old_width: u32,
    old_height: u32,
    options: &ResizeOptions,
) -> Result<(u32, u32), TweetshotError> {
    let width = options.width.filter(|w| *w > 0);
    let height = options.height.filter(|h| *h > 0);
    match (width, height) {
        (Some(w), Some(h)) => Ok((w, h)),
        (Some(w), None) => {
            let scale = f64::from(w) / f64::from(old_width);
            Ok((w, (f64::from(old_height) * scale) as u32))
        }
        (None, Some(h)) => {
            let scale = f64::from(h) / f64::from(old_height);
            Ok(((f64::from(old_width) * scale) as u32, h))
        }
        (None, None) => Err(TweetshotError::ImageProcessing(format!(
            "incorrect resize parameters: width = {:?}, height = {:?}",
            options.width, options.height
        ))),
    }
}

fn open_image(path: &Path) -> Result<image::DynamicImage, TweetshotError> {
    image::open(path).map_err(|e| {
        TweetshotError::ImageProcessing(format!("can't open image {}: {e}", path.display()))
    })
}

fn save_image(img: &image::DynamicImage, path: &Path) -> Result<(), TweetshotError> {
    img.save(path).map_err(|e| {
        TweetshotError::ImageProcessing(format!("can't save image {}: {e}", path.display()))
    })
}
