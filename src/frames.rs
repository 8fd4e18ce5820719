use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::RgbaImage;

/// Input frames, either an explicit list or a numbered `inputNNN.png` sequence.
#[derive(Debug)]
pub enum FrameSource {
    Files(std::vec::IntoIter<PathBuf>),
    Numbered {
        dir: PathBuf,
        next: u32,
        /// `None` stops quietly at the first missing file.
        remaining: Option<u32>,
    },
}

impl FrameSource {
    pub fn files(files: Vec<PathBuf>) -> Self {
        FrameSource::Files(files.into_iter())
    }

    /// A `limit` of 0 reads frames until the next one does not exist.
    pub fn numbered(dir: impl Into<PathBuf>, first: u32, limit: u32) -> Self {
        FrameSource::Numbered {
            dir: dir.into(),
            next: first,
            remaining: (limit > 0).then_some(limit),
        }
    }

    pub fn numbered_path(dir: &Path, frame: u32) -> PathBuf {
        dir.join(format!("input{:03}.png", frame))
    }
}

impl Iterator for FrameSource {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        match self {
            FrameSource::Files(files) => files.next(),
            FrameSource::Numbered { dir, next, remaining } => {
                let path = Self::numbered_path(dir, *next);
                match remaining {
                    Some(0) => return None,
                    Some(left) => *left -= 1,
                    None if !path.exists() => return None,
                    None => {}
                }
                *next += 1;
                Some(path)
            }
        }
    }
}

pub fn load_frame(path: &Path) -> Result<RgbaImage> {
    let image = image::open(path).with_context(|| format!("failed to decode {}", path.display()))?;
    Ok(image.to_rgba8())
}
