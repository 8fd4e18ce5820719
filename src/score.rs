use image::{Rgba, RgbaImage};

/// Squared euclidean distance over the R, G, B and A channels.
pub fn pixel_distance(a: &Rgba<u8>, b: &Rgba<u8>) -> f64 {
    a.0.iter()
        .zip(b.0.iter())
        .map(|(c1, c2)| (*c2 as f64 - *c1 as f64).powi(2))
        .sum()
}

/// Distance summed over every pixel. Used for reporting, the engine itself only scores segments.
pub fn image_distance(a: &RgbaImage, b: &RgbaImage) -> f64 {
    debug_assert_eq!(a.dimensions(), b.dimensions());
    a.pixels()
        .zip(b.pixels())
        .map(|(p1, p2)| pixel_distance(p1, p2))
        .sum()
}
