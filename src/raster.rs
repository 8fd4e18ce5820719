use image::{Rgba, RgbaImage};

use crate::score::pixel_distance;

/// Integer Bresenham traversal from `(x0, y0)` to `(x1, y1)`, both endpoints included.
///
/// Midpoint ties are always resolved toward the lexicographically smaller endpoint, so a
/// segment and its reverse cover the same pixels, visited in opposite order.
#[derive(Clone, Debug)]
pub struct Bresenham {
    x: i32,
    y: i32,
    x1: i32,
    y1: i32,
    dx: i32,
    dy: i32,
    sx: i32,
    sy: i32,
    err: i32,
    lenient: bool,
    done: bool,
}

impl Bresenham {
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        let dx = (x1 - x0).abs();
        let dy = (y1 - y0).abs();
        Bresenham {
            x: x0,
            y: y0,
            x1,
            y1,
            dx,
            dy,
            sx: if x0 < x1 { 1 } else { -1 },
            sy: if y0 < y1 { 1 } else { -1 },
            err: dx - dy,
            lenient: (x1, y1) < (x0, y0),
            done: false,
        }
    }
}

impl Iterator for Bresenham {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<(i32, i32)> {
        if self.done {
            return None;
        }
        let point = (self.x, self.y);
        if self.x == self.x1 && self.y == self.y1 {
            self.done = true;
            return Some(point);
        }

        let e2 = 2 * self.err;
        let step_x = if self.lenient { e2 >= -self.dy } else { e2 > -self.dy };
        let step_y = if self.lenient { e2 <= self.dx } else { e2 < self.dx };
        if step_x {
            self.err -= self.dy;
            self.x += self.sx;
        }
        if step_y {
            self.err += self.dx;
            self.y += self.sy;
        }
        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        let left = (self.x1 - self.x).abs().max((self.y1 - self.y).abs()) as usize + 1;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Bresenham {}

fn in_bounds(image: &RgbaImage, x: i32, y: i32) -> Option<(u32, u32)> {
    if x < 0 || y < 0 {
        return None;
    }
    let (x, y) = (x as u32, y as u32);
    (x < image.width() && y < image.height()).then_some((x, y))
}

/// Visit the in-bounds pixels of a segment. Pixels outside the image are skipped, the
/// traversal itself is not clipped.
pub fn for_each_pixel<F>(image: &RgbaImage, x0: i32, y0: i32, x1: i32, y1: i32, mut f: F)
where
    F: FnMut(u32, u32),
{
    Bresenham::new(x0, y0, x1, y1)
        .filter_map(|(x, y)| in_bounds(image, x, y))
        .for_each(|(x, y)| f(x, y));
}

pub fn draw_line(image: &mut RgbaImage, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgba<u8>) {
    for (x, y) in Bresenham::new(x0, y0, x1, y1) {
        if let Some((x, y)) = in_bounds(image, x, y) {
            image.put_pixel(x, y, color);
        }
    }
}

/// Copy the segment's pixels from `src` into `dst`. Both images must share dimensions.
pub fn copy_line(dst: &mut RgbaImage, src: &RgbaImage, x0: i32, y0: i32, x1: i32, y1: i32) {
    debug_assert_eq!(dst.dimensions(), src.dimensions());
    for_each_pixel(src, x0, y0, x1, y1, |x, y| {
        dst.put_pixel(x, y, *src.get_pixel(x, y));
    });
}

/// Accumulated squared channel distance between `reference` and `candidate` over the segment.
pub fn diff_line(reference: &RgbaImage, candidate: &RgbaImage, x0: i32, y0: i32, x1: i32, y1: i32) -> f64 {
    debug_assert_eq!(reference.dimensions(), candidate.dimensions());
    let mut total = 0.0;
    for_each_pixel(reference, x0, y0, x1, y1, |x, y| {
        total += pixel_distance(reference.get_pixel(x, y), candidate.get_pixel(x, y));
    });
    total
}
