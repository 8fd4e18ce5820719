use std::collections::HashSet;

use image::{Rgba, RgbaImage};
use log::info;
use rand::Rng;

use crate::error::SketchError;

/// Candidate line colors taken from the source image. Never empty.
#[derive(Clone, Debug)]
pub struct Palette {
    colors: Vec<Rgba<u8>>,
}

impl Palette {
    /// Scan `image` in raster order. With `unique`, each color is kept only at its first
    /// occurrence; otherwise every pixel contributes, so sampling is weighted by frequency.
    pub fn build(image: &RgbaImage, unique: bool) -> Result<Self, SketchError> {
        let mut colors = Vec::new();
        if unique {
            let mut seen = HashSet::new();
            for pixel in image.pixels() {
                if seen.insert(*pixel) {
                    colors.push(*pixel);
                }
            }
        } else {
            colors.extend(image.pixels().copied());
        }

        if colors.is_empty() {
            return Err(SketchError::EmptyPalette);
        }
        info!("{} colors in palette", colors.len());
        Ok(Palette { colors })
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn colors(&self) -> &[Rgba<u8>] {
        &self.colors
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Rgba<u8> {
        self.colors[rng.gen_range(0..self.colors.len())]
    }
}
