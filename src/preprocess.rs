use crate::error::PredictError;
use image::{imageops::FilterType, ImageError};
use ndarray::{Array, Ix4};

pub const INPUT_SIZE: u32 = 224;
pub const INPUT_CHANNELS: usize = 3;

/// Decodes raw image bytes into a `1x224x224x3` batch with channels scaled to `[0, 1]`.
pub fn transform_image(image_data: &[u8]) -> Result<Array<f32, Ix4>, PredictError> {
    let image_reader = image::ImageReader::new(std::io::Cursor::new(image_data))
        .with_guessed_format()
        .map_err(ImageError::from)?;

    let original_img = image_reader.decode()?;

    // Grayscale, alpha and palette sources all collapse to plain RGB before resizing.
    let rgb = original_img.to_rgb8();
    let img = image::imageops::resize(&rgb, INPUT_SIZE, INPUT_SIZE, FilterType::CatmullRom);

    let side = INPUT_SIZE as usize;
    let pixels = img
        .into_raw()
        .into_iter()
        .map(|value| (value as f32) / 255.)
        .collect::<Vec<f32>>();

    Array::from_shape_vec((1, side, side, INPUT_CHANNELS), pixels)
        .map_err(|e| PredictError::Processing(format!("invalid input shape: {}", e)))
}
