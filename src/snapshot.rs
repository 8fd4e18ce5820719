use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread::{self, JoinHandle};

use image::RgbaImage;
use log::{error, info};

/// Where canvas snapshots go. `name` is a bare identifier such as `incr003` or `frame001`.
pub trait SnapshotSink {
    fn save(&mut self, name: &str, image: &RgbaImage);
}

struct Job {
    path: PathBuf,
    image: RgbaImage,
}

/// Writes PNG snapshots on a background thread.
///
/// `save` copies the canvas before returning, so the caller may keep mutating it. The
/// handoff is a rendezvous channel: while one snapshot is still being encoded, the next
/// `save` blocks until the writer is free again.
pub struct PngWriter {
    dir: PathBuf,
    sender: Option<SyncSender<Job>>,
    worker: Option<JoinHandle<()>>,
}

impl PngWriter {
    pub fn spawn(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let (sender, receiver) = mpsc::sync_channel(0);
        let worker = thread::Builder::new()
            .name("snapshot-writer".into())
            .spawn(move || write_jobs(receiver))?;

        Ok(PngWriter { dir, sender: Some(sender), worker: Some(worker) })
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.png", name))
    }

    /// Wait for outstanding snapshots to hit the disk.
    pub fn finish(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        drop(self.sender.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("snapshot writer panicked");
            }
        }
    }
}

impl SnapshotSink for PngWriter {
    fn save(&mut self, name: &str, image: &RgbaImage) {
        let job = Job { path: self.path_for(name), image: image.clone() };
        let sent = match &self.sender {
            Some(sender) => sender.send(job).is_ok(),
            None => false,
        };
        if !sent {
            error!("snapshot writer is gone, dropping {}", name);
        }
    }
}

impl Drop for PngWriter {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn write_jobs(receiver: Receiver<Job>) {
    for job in receiver {
        match write_png(&job.path, &job.image) {
            Ok(()) => info!("wrote {}", job.path.display()),
            Err(e) => error!("failed to write {}: {}", job.path.display(), e),
        }
    }
}

fn write_png(path: &Path, image: &RgbaImage) -> image::ImageResult<()> {
    image.save_with_format(path, image::ImageFormat::Png)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("sketch-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn saves_a_copy_of_the_canvas() {
        let dir = scratch_dir("copy");
        let mut writer = PngWriter::spawn(&dir).unwrap();
        let mut canvas = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 255]));

        writer.save("frame001", &canvas);
        // mutations after save must not leak into the snapshot
        canvas.put_pixel(0, 0, Rgba([255, 255, 255, 255]));
        writer.save("frame002", &canvas);
        writer.finish();

        let first = image::open(dir.join("frame001.png")).unwrap().to_rgba8();
        let second = image::open(dir.join("frame002.png")).unwrap().to_rgba8();
        assert_eq!(*first.get_pixel(0, 0), Rgba([10, 20, 30, 255]));
        assert_eq!(*second.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
        assert_eq!(second.dimensions(), (3, 2));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn write_failure_does_not_stop_the_writer() {
        let dir = scratch_dir("failure");
        let mut writer = PngWriter::spawn(&dir).unwrap();
        let canvas = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));

        writer.save("missing/incr001", &canvas);
        writer.save("incr002", &canvas);
        writer.finish();

        assert!(!dir.join("missing/incr001.png").exists());
        assert!(dir.join("incr002.png").exists());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn creates_output_directory() {
        let dir = scratch_dir("mkdir").join("nested");
        let writer = PngWriter::spawn(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(writer.path_for("frame007"), dir.join("frame007.png"));
        drop(writer);

        fs::remove_dir_all(dir.parent().unwrap()).unwrap();
    }
}
