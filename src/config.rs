use std::path::PathBuf;

use clap::Parser;

use crate::engine::EngineSettings;
use crate::schedule::Schedule;

/// Sketch images with lines of random length, orientation and color.
///
/// Line colors are drawn from a palette of the colors found in the input image. Without
/// FILES, numbered frames `input001.png`, `input002.png`, ... are read from the working
/// directory.
#[derive(Parser, Debug, Clone)]
#[command(name = "sketch", version)]
pub struct Config {
    /// Number of iterations per frame (-1 for infinite)
    #[arg(short, long, default_value_t = 5_000_000, allow_negative_numbers = true)]
    pub iterations: i64,

    /// Line length limit
    #[arg(short, long = "line-len", default_value_t = 40, value_parser = clap::value_parser!(u32).range(1..))]
    pub line_len: u32,

    /// Remove duplicate colors from the palette
    #[arg(short = 'p', long)]
    pub unique_palette: bool,

    /// Interval between incremental saves, in seconds (<= 0 disables)
    #[arg(short, long, default_value_t = -1.0, allow_negative_numbers = true)]
    pub save_interval: f64,

    /// Statistics reporting interval, in seconds
    #[arg(short = 't', long, default_value_t = 1.0)]
    pub stat_interval: f64,

    /// Score candidate lines in parallel (slower on short lines)
    #[arg(short = 'P', long)]
    pub parallel: bool,

    /// Number of the first numbered input frame
    #[arg(long, default_value_t = 1)]
    pub first_frame: u32,

    /// Number of numbered input frames to sketch (0 = until one is missing)
    #[arg(short = 'n', long, default_value_t = 0)]
    pub frames: u32,

    /// Seed for the line generator
    #[arg(long, default_value_t = 1)]
    pub seed: u64,

    /// Directory for incremental saves and finished frames
    #[arg(short, long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Input images, processed in order
    pub files: Vec<PathBuf>,
}

impl Config {
    pub fn schedule(&self) -> Schedule {
        Schedule::from_raw(self.iterations, self.save_interval, self.stat_interval)
    }

    /// Frames get distinct but reproducible seeds.
    pub fn engine_settings(&self, frame_index: u64) -> EngineSettings {
        EngineSettings {
            line_len: self.line_len,
            parallel: self.parallel,
            seed: self.seed.wrapping_add(frame_index),
        }
    }
}
