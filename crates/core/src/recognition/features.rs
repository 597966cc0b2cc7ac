//! Feature extraction from decoded images.

use image::imageops::FilterType;
use image::DynamicImage;

/// Side length of the colour layout grid.
pub const GRID_SIZE: u32 = 8;

/// Histogram bins per RGB channel.
pub const HISTOGRAM_BINS: usize = 8;

/// Output dimensionality of [`ColorLayoutExtractor`].
pub const COLOR_LAYOUT_DIMENSION: usize =
    (GRID_SIZE * GRID_SIZE * 3) as usize + 3 * HISTOGRAM_BINS;

/// Turns a decoded image into a fixed-length embedding.
///
/// Implementations must be deterministic: the same pixels always produce the
/// same vector. The output does not need to be normalised.
pub trait FeatureExtractor: Send + Sync {
    fn extract(&self, image: &DynamicImage) -> Vec<f32>;

    /// Length of the vectors returned by [`FeatureExtractor::extract`].
    fn dimension(&self) -> usize;
}

/// Colour layout descriptor: a coarse RGB thumbnail plus a colour histogram.
///
/// The thumbnail is centred per channel so overall brightness shifts move
/// the embedding less than changes in coat pattern do.
#[derive(Debug, Default, Clone, Copy)]
pub struct ColorLayoutExtractor;

impl FeatureExtractor for ColorLayoutExtractor {
    fn extract(&self, image: &DynamicImage) -> Vec<f32> {
        let rgb = image
            .resize_exact(GRID_SIZE, GRID_SIZE, FilterType::Triangle)
            .to_rgb8();

        let mut channels: [Vec<f32>; 3] = Default::default();
        for pixel in rgb.pixels() {
            for (c, value) in pixel.0.iter().enumerate() {
                channels[c].push(f32::from(*value) / 255.0);
            }
        }

        let mut features = Vec::with_capacity(COLOR_LAYOUT_DIMENSION);
        for channel in &channels {
            let mean = channel.iter().sum::<f32>() / channel.len() as f32;
            features.extend(channel.iter().map(|v| v - mean));
        }

        features.extend(color_histogram(image));
        features
    }

    fn dimension(&self) -> usize {
        COLOR_LAYOUT_DIMENSION
    }
}

/// Per-channel histogram over the full-resolution image, as pixel fractions.
fn color_histogram(image: &DynamicImage) -> Vec<f32> {
    let rgb = image.to_rgb8();
    let mut bins = vec![0u32; 3 * HISTOGRAM_BINS];
    let width = 256 / HISTOGRAM_BINS;
    for pixel in rgb.pixels() {
        for (c, value) in pixel.0.iter().enumerate() {
            bins[c * HISTOGRAM_BINS + usize::from(*value) / width] += 1;
        }
    }
    let total = (rgb.width() as f32 * rgb.height() as f32).max(1.0);
    bins.into_iter().map(|count| count as f32 / total).collect()
}
