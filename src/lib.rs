//! Approximate images with randomly placed straight lines.
//!
//! Each iteration draws a random segment, colored from the source image's palette, onto a
//! scratch canvas and keeps it only when it brings that segment's pixels closer to the source.
//! Scoring and copying only ever touch the segment, so an iteration costs O(line length).

pub mod config;
pub mod engine;
pub mod error;
pub mod frames;
pub mod palette;
pub mod raster;
pub mod schedule;
pub mod score;
pub mod snapshot;

use std::path::Path;

use anyhow::{bail, Context, Result};
use log::info;

use crate::config::Config;
use crate::engine::Engine;
use crate::frames::{load_frame, FrameSource};
use crate::palette::Palette;
use crate::schedule::Scheduler;
use crate::score::image_distance;
use crate::snapshot::PngWriter;

/// Sketch every input frame. Decode failures abort the run; snapshot failures only get logged.
pub fn run(config: &Config) -> Result<()> {
    let writer = PngWriter::spawn(&config.out_dir)
        .with_context(|| format!("failed to prepare {}", config.out_dir.display()))?;
    let mut scheduler = Scheduler::new(config.schedule(), writer);

    let frames = if config.files.is_empty() {
        FrameSource::numbered(".", config.first_frame, config.frames)
    } else {
        FrameSource::files(config.files.clone())
    };

    let mut processed = 0u64;
    for path in frames {
        info!("opening {}", path.display());
        let source = load_frame(&path)?;
        let palette = Palette::build(&source, config.unique_palette)?;
        let mut engine = Engine::new(source, palette, config.engine_settings(processed))?;

        let summary = scheduler.run_frame(&mut engine);
        info!(
            "{}: {} iterations, {} converged, distance {:.0}",
            path.display(),
            summary.iterations,
            summary.convergences,
            image_distance(engine.source(), engine.best())
        );
        processed += 1;
    }
    scheduler.into_sink().finish();

    if processed == 0 {
        let first = FrameSource::numbered_path(Path::new("."), config.first_frame);
        bail!("no input frames, {} does not exist", first.display());
    }
    info!("end of frames");
    Ok(())
}
