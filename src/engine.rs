use image::{Rgba, RgbaImage};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

use crate::error::SketchError;
use crate::palette::Palette;
use crate::raster::{copy_line, diff_line, draw_line};

const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);

#[derive(Clone, Copy, Debug)]
pub struct EngineSettings {
    /// Upper bound on the offset between the two endpoints, per axis.
    pub line_len: u32,
    /// Score both canvases on the rayon pool instead of sequentially.
    pub parallel: bool,
    pub seed: u64,
}

/// A candidate segment. `to` may lie outside the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Line {
    pub from: (i32, i32),
    pub to: (i32, i32),
    pub color: Rgba<u8>,
}

/// Outcome of a single proposal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Step {
    pub line: Line,
    pub scratch_diff: f64,
    pub best_diff: f64,
    pub converged: bool,
}

/// Hill climber over two canvases.
///
/// `best` holds the best approximation found so far and is the canvas that gets saved.
/// `scratch` receives every proposed line; after each step both canvases agree again on the
/// line's pixels, either because `best` adopted the line or because `scratch` was restored.
pub struct Engine {
    source: RgbaImage,
    palette: Palette,
    scratch: RgbaImage,
    best: RgbaImage,
    rng: Pcg64,
    line_len: i32,
    parallel: bool,
}

impl Engine {
    pub fn new(source: RgbaImage, palette: Palette, settings: EngineSettings) -> Result<Self, SketchError> {
        let (width, height) = source.dimensions();
        if width == 0 || height == 0 {
            return Err(SketchError::EmptyImage { width, height });
        }
        if settings.line_len == 0 {
            return Err(SketchError::InvalidLineLength);
        }
        let line_len = i32::try_from(settings.line_len).map_err(|_| SketchError::InvalidLineLength)?;

        Ok(Engine {
            scratch: RgbaImage::from_pixel(width, height, BACKGROUND),
            best: RgbaImage::from_pixel(width, height, BACKGROUND),
            source,
            palette,
            rng: Pcg64::seed_from_u64(settings.seed),
            line_len,
            parallel: settings.parallel,
        })
    }

    pub fn source(&self) -> &RgbaImage {
        &self.source
    }

    pub fn best(&self) -> &RgbaImage {
        &self.best
    }

    pub fn scratch(&self) -> &RgbaImage {
        &self.scratch
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Random anchor inside the canvas, second endpoint offset by `[-len/2, len - len/2)` per axis.
    pub fn propose(&mut self) -> Line {
        let (width, height) = self.source.dimensions();
        let x0 = self.rng.gen_range(0..width) as i32;
        let y0 = self.rng.gen_range(0..height) as i32;
        let half = self.line_len / 2;
        let x1 = x0 - half + self.rng.gen_range(0..self.line_len);
        let y1 = y0 - half + self.rng.gen_range(0..self.line_len);
        let color = self.palette.sample(&mut self.rng);
        Line { from: (x0, y0), to: (x1, y1), color }
    }

    /// Draw `line` onto the scratch canvas and keep it only if it brings the segment closer
    /// to the source than the best canvas is. Ties are rejected.
    pub fn evaluate(&mut self, line: Line) -> Step {
        let ((x0, y0), (x1, y1)) = (line.from, line.to);
        draw_line(&mut self.scratch, x0, y0, x1, y1, line.color);

        let (source, scratch, best) = (&self.source, &self.scratch, &self.best);
        let (scratch_diff, best_diff) = if self.parallel {
            rayon::join(
                || diff_line(source, scratch, x0, y0, x1, y1),
                || diff_line(source, best, x0, y0, x1, y1),
            )
        } else {
            (
                diff_line(source, scratch, x0, y0, x1, y1),
                diff_line(source, best, x0, y0, x1, y1),
            )
        };

        let converged = scratch_diff < best_diff;
        if converged {
            copy_line(&mut self.best, &self.scratch, x0, y0, x1, y1);
        } else {
            copy_line(&mut self.scratch, &self.best, x0, y0, x1, y1);
        }

        Step { line, scratch_diff, best_diff, converged }
    }

    pub fn step(&mut self) -> Step {
        let line = self.propose();
        self.evaluate(line)
    }
}
