use std::time::{Duration, Instant};

use log::info;

use crate::engine::Engine;
use crate::snapshot::SnapshotSink;

/// Clock reads are too expensive to do on every iteration.
const CADENCE: u64 = 50;

#[derive(Clone, Copy, Debug)]
pub struct Schedule {
    /// `None` runs until the process is killed.
    pub iterations: Option<u64>,
    /// `None` disables checkpoints.
    pub save_interval: Option<Duration>,
    pub stat_interval: Duration,
}

impl Schedule {
    /// Negative iteration counts mean unbounded, non-positive save intervals disable checkpoints.
    pub fn from_raw(iterations: i64, save_interval: f64, stat_interval: f64) -> Self {
        Schedule {
            iterations: u64::try_from(iterations).ok(),
            save_interval: Duration::try_from_secs_f64(save_interval).ok().filter(|d| !d.is_zero()),
            stat_interval: Duration::try_from_secs_f64(stat_interval.max(0.0)).unwrap_or(Duration::MAX),
        }
    }
}

/// Iteration and convergence counts since the last report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub iterations: u64,
    pub convergences: u64,
}

impl Stats {
    pub fn record(&mut self, converged: bool) {
        self.iterations += 1;
        if converged {
            self.convergences += 1;
        }
    }

    pub fn throughput(&self, elapsed: Duration) -> Throughput {
        let secs = elapsed.as_secs_f64().max(f64::EPSILON);
        let per_sec = self.iterations as f64 / secs;
        let converged_per_sec = self.convergences as f64 / secs;
        let percent = if self.iterations == 0 {
            0.0
        } else {
            100.0 * self.convergences as f64 / self.iterations as f64
        };
        Throughput { per_sec, converged_per_sec, percent }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Throughput {
    pub per_sec: f64,
    pub converged_per_sec: f64,
    pub percent: f64,
}

/// Totals for one finished frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameSummary {
    pub iterations: u64,
    pub convergences: u64,
}

/// Drives engines frame after frame and owns the snapshot numbering for the whole run.
///
/// Checkpoints (`incrNNN`) and finished frames (`frameNNN`) are numbered independently,
/// both starting at 1.
pub struct Scheduler<S> {
    schedule: Schedule,
    sink: S,
    next_checkpoint: u32,
    next_frame: u32,
}

impl<S: SnapshotSink> Scheduler<S> {
    pub fn new(schedule: Schedule, sink: S) -> Self {
        Scheduler { schedule, sink, next_checkpoint: 1, next_frame: 1 }
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn run_frame(&mut self, engine: &mut Engine) -> FrameSummary {
        let mut summary = FrameSummary::default();
        let mut stats = Stats::default();
        let mut last_save = Instant::now();
        let mut last_stat = Instant::now();

        let mut i: u64 = 0;
        while self.schedule.iterations.map_or(true, |limit| i < limit) {
            let step = engine.step();
            stats.record(step.converged);
            summary.iterations += 1;
            if step.converged {
                summary.convergences += 1;
            }

            if i % CADENCE == 0 {
                let now = Instant::now();
                if let Some(interval) = self.schedule.save_interval {
                    if now.duration_since(last_save) >= interval {
                        self.checkpoint(engine);
                        last_save = Instant::now();
                    }
                }
                let elapsed = now.duration_since(last_stat);
                if elapsed >= self.schedule.stat_interval {
                    let t = stats.throughput(elapsed);
                    info!(
                        "{:8} iters {:10.2} iter/s {:9.2} converg/s {:6.2}% c/i",
                        i, t.per_sec, t.converged_per_sec, t.percent
                    );
                    stats = Stats::default();
                    last_stat = Instant::now();
                }
            }
            i += 1;
        }

        let name = format!("frame{:03}", self.next_frame);
        self.next_frame += 1;
        self.sink.save(&name, engine.best());
        summary
    }

    fn checkpoint(&mut self, engine: &Engine) {
        let name = format!("incr{:03}", self.next_checkpoint);
        self.next_checkpoint += 1;
        self.sink.save(&name, engine.best());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineSettings;
    use crate::palette::Palette;
    use image::{Rgba, RgbaImage};

    #[derive(Default)]
    struct Recorder {
        saved: Vec<(String, RgbaImage)>,
    }

    impl SnapshotSink for Recorder {
        fn save(&mut self, name: &str, image: &RgbaImage) {
            self.saved.push((name.to_string(), image.clone()));
        }
    }

    impl Recorder {
        fn names(&self) -> Vec<&str> {
            self.saved.iter().map(|(name, _)| name.as_str()).collect()
        }
    }

    fn engine(seed: u64) -> Engine {
        let source = RgbaImage::from_fn(6, 6, |x, y| Rgba([(x * 40) as u8, (y * 40) as u8, 90, 255]));
        let palette = Palette::build(&source, true).unwrap();
        Engine::new(source, palette, EngineSettings { line_len: 4, parallel: false, seed }).unwrap()
    }

    fn quiet(iterations: i64, save_interval: f64) -> Schedule {
        Schedule::from_raw(iterations, save_interval, 3600.0)
    }

    #[test]
    fn raw_configuration_is_normalised() {
        let schedule = Schedule::from_raw(-1, -1.0, 1.0);
        assert_eq!(schedule.iterations, None);
        assert_eq!(schedule.save_interval, None);
        assert_eq!(schedule.stat_interval, Duration::from_secs(1));

        let schedule = Schedule::from_raw(10, 0.5, -2.0);
        assert_eq!(schedule.iterations, Some(10));
        assert_eq!(schedule.save_interval, Some(Duration::from_millis(500)));
        assert_eq!(schedule.stat_interval, Duration::ZERO);

        assert_eq!(Schedule::from_raw(0, 0.0, 0.0).save_interval, None);
    }

    #[test]
    fn runs_exact_budget_and_saves_final_frame() {
        let mut scheduler = Scheduler::new(quiet(500, -1.0), Recorder::default());
        let mut engine = engine(1);

        let summary = scheduler.run_frame(&mut engine);
        assert_eq!(summary.iterations, 500);
        assert!(summary.convergences > 0 && summary.convergences <= 500);
        let sink = scheduler.into_sink();
        assert_eq!(sink.names(), vec!["frame001"]);
        assert_eq!(&sink.saved[0].1, engine.best());
    }

    #[test]
    fn zero_budget_still_saves() {
        let mut scheduler = Scheduler::new(quiet(0, -1.0), Recorder::default());
        let mut engine = engine(2);
        assert_eq!(scheduler.run_frame(&mut engine), FrameSummary::default());
        let sink = scheduler.into_sink();
        assert_eq!(sink.names(), vec!["frame001"]);
        assert!(sink.saved[0].1.pixels().all(|p| *p == Rgba([0, 0, 0, 255])));
    }

    #[test]
    fn frame_numbers_continue_across_frames() {
        let mut scheduler = Scheduler::new(quiet(20, -1.0), Recorder::default());
        for seed in 0..3 {
            scheduler.run_frame(&mut engine(seed));
        }
        assert_eq!(scheduler.into_sink().names(), vec!["frame001", "frame002", "frame003"]);
    }

    #[test]
    fn checkpoints_are_numbered_separately() {
        let schedule = Schedule {
            iterations: Some(1000),
            save_interval: Some(Duration::from_nanos(1)),
            stat_interval: Duration::from_secs(3600),
        };
        let mut scheduler = Scheduler::new(schedule, Recorder::default());
        scheduler.run_frame(&mut engine(4));
        scheduler.run_frame(&mut engine(5));

        let sink = scheduler.into_sink();
        let names = sink.names();
        let checkpoints: Vec<_> = names.iter().filter(|n| n.starts_with("incr")).collect();
        let frames: Vec<_> = names.iter().filter(|n| n.starts_with("frame")).collect();

        assert!(checkpoints.len() >= 2 && checkpoints.len() <= 40);
        for (k, name) in checkpoints.iter().enumerate() {
            assert_eq!(**name, format!("incr{:03}", k + 1));
        }
        assert_eq!(frames, vec![&"frame001", &"frame002"]);
        assert_eq!(names.last(), Some(&"frame002"));
    }

    #[test]
    fn stats_throughput() {
        let mut stats = Stats::default();
        for k in 0..200 {
            stats.record(k % 4 == 0);
        }
        assert_eq!(stats, Stats { iterations: 200, convergences: 50 });

        let t = stats.throughput(Duration::from_secs(2));
        assert_eq!(t.per_sec, 100.0);
        assert_eq!(t.converged_per_sec, 25.0);
        assert_eq!(t.percent, 25.0);
        assert_eq!(Stats::default().throughput(Duration::from_secs(1)).percent, 0.0);
    }
}
