//! Benchmark a detector over a set of annotated records.
//!
//! Records are fetched concurrently, one producer thread per source, and handed over a bounded
//! queue to a single consumer that scores and times them one at a time. Timing therefore never
//! overlaps with another record's detection.

use super::compare::{compare_annotations, Comparison};
use crate::stats::{mean, stdev};
use biopeaks_core::Result;
use crossbeam_channel::bounded;
use log::{info, warn};
use serde::Serialize;
use std::thread;
use std::time::Instant;

/// A raw recording with its reference annotation. Either part may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    /// Identifies the record in reports.
    pub name: String,
    /// Raw samples.
    pub signal: Option<Vec<f64>>,
    /// Reference R-peak indices.
    pub annotation: Option<Vec<usize>>,
}

/// Somewhere a record can be fetched from.
pub trait RecordSource {
    /// Fetch the record. Missing parts are reported as `None` rather than as an error.
    fn fetch(&self) -> Record;
}

impl<F> RecordSource for F
where
    F: Fn() -> Record,
{
    fn fetch(&self) -> Record {
        self()
    }
}

/// Mean wall-clock time of `n_runs` calls of `run`, in milliseconds. `0.0` when `n_runs` is 0.
pub fn time_detector<F, R>(mut run: F, n_runs: usize) -> f64
where
    F: FnMut() -> R,
{
    if n_runs == 0 {
        return 0.0;
    }
    let start = Instant::now();
    for _ in 0..n_runs {
        std::hint::black_box(run());
    }
    start.elapsed().as_secs_f64() * 1000.0 / n_runs as f64
}

/// Settings of a benchmark run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BenchmarkConfig {
    /// Largest offset, in samples, at which a detection still matches an annotation.
    pub tolerance: usize,
    /// Sampling rate of every record, in Hz.
    pub sampling_rate: f64,
    /// Detector calls averaged into a record's run time.
    pub n_runs: usize,
    /// Capacity of the queue between the fetchers and the scorer.
    pub queue_capacity: usize,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            tolerance: 1,
            sampling_rate: 250.0,
            n_runs: 100,
            queue_capacity: 4,
        }
    }
}

/// What happened to one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecordOutcome {
    /// Scored and timed.
    Scored {
        /// Record name.
        name: String,
        /// Match counts.
        comparison: Comparison,
        /// `TP / (TP + FN)`.
        sensitivity: Option<f64>,
        /// `TP / (TP + FP)`.
        precision: Option<f64>,
        /// Mean detector run time in milliseconds.
        avg_time_ms: f64,
    },
    /// Not benchmarked because a part was missing.
    Skipped {
        /// Record name.
        name: String,
    },
    /// The detector returned an error.
    Failed {
        /// Record name.
        name: String,
        /// Rendered error.
        error: String,
    },
}

/// Mean and population standard deviation of a metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Aggregate {
    /// Mean.
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
    /// Values aggregated.
    pub count: usize,
}

impl Aggregate {
    /// Aggregate `values`; all zero when empty.
    pub fn of(values: &[f64]) -> Self {
        let (m, count) = mean::<_, f64>(values.iter());
        let (s, _) = stdev::<_, f64>(values.iter());
        Self {
            mean: m,
            std: s,
            count,
        }
    }
}

/// Per-record outcomes and their summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkReport {
    /// Outcome of every record, in the order they were processed.
    pub records: Vec<RecordOutcome>,
    /// Sensitivity over the scored records where it is defined.
    pub sensitivity: Aggregate,
    /// Precision over the scored records where it is defined.
    pub precision: Aggregate,
    /// Mean run time over the scored records, in milliseconds.
    pub run_time_ms: Aggregate,
}

impl BenchmarkReport {
    fn summarize(records: Vec<RecordOutcome>) -> Self {
        let mut sens = Vec::new();
        let mut prec = Vec::new();
        let mut times = Vec::new();
        for r in &records {
            if let RecordOutcome::Scored {
                sensitivity,
                precision,
                avg_time_ms,
                ..
            } = r
            {
                sens.extend(*sensitivity);
                prec.extend(*precision);
                times.push(*avg_time_ms);
            }
        }
        Self {
            records,
            sensitivity: Aggregate::of(&sens),
            precision: Aggregate::of(&prec),
            run_time_ms: Aggregate::of(&times),
        }
    }
}

/// Scores a detector against annotated records.
#[derive(Debug, Clone)]
pub struct Benchmark<D> {
    detector: D,
    config: BenchmarkConfig,
}

impl<D> Benchmark<D>
where
    D: Fn(&[f64], f64) -> Result<Vec<usize>>,
{
    /// Benchmark `detector`, called with a record's samples and the sampling rate.
    pub fn new(detector: D, config: BenchmarkConfig) -> Self {
        Self { detector, config }
    }

    /// Match the detector's output on `signal` against `annotation`.
    pub fn score_record(&self, signal: &[f64], annotation: &[usize]) -> Result<Comparison> {
        let detected = (self.detector)(signal, self.config.sampling_rate)?;
        Ok(compare_annotations(
            &detected,
            annotation,
            self.config.tolerance,
        ))
    }

    /// Mean run time of the detector on `signal` over the configured number of runs, in
    /// milliseconds.
    pub fn time_record(&self, signal: &[f64]) -> f64 {
        time_detector(
            || (self.detector)(signal, self.config.sampling_rate),
            self.config.n_runs,
        )
    }

    /// Score and time one record. A record missing its signal or its annotation is skipped.
    pub fn process(&self, record: Record) -> RecordOutcome {
        let name = record.name;
        let (Some(signal), Some(annotation)) = (record.signal, record.annotation) else {
            warn!("skipping {name}: missing signal or annotation");
            return RecordOutcome::Skipped { name };
        };
        match self.score_record(&signal, &annotation) {
            Ok(comparison) => {
                let avg_time_ms = self.time_record(&signal);
                let outcome = RecordOutcome::Scored {
                    sensitivity: comparison.sensitivity(),
                    precision: comparison.precision(),
                    comparison,
                    avg_time_ms,
                    name,
                };
                info!("{outcome:?}");
                outcome
            }
            Err(e) => {
                warn!("detector failed on {name}: {e}");
                RecordOutcome::Failed {
                    name,
                    error: e.to_string(),
                }
            }
        }
    }

    /// Fetch every source on its own thread and process the records serially as they arrive.
    pub fn run<S>(&self, sources: &[S]) -> BenchmarkReport
    where
        S: RecordSource + Sync,
    {
        let (tx, rx) = bounded::<Record>(self.config.queue_capacity.max(1));
        let records = thread::scope(|scope| {
            for source in sources {
                let tx = tx.clone();
                scope.spawn(move || {
                    // The receiver lives until every producer is done.
                    let _ = tx.send(source.fetch());
                });
            }
            drop(tx);
            rx.iter().map(|r| self.process(r)).collect::<Vec<_>>()
        });

        let report = BenchmarkReport::summarize(records);
        info!(
            "{} records scored: sensitivity {:.4} ± {:.4}, precision {:.4} ± {:.4}, run time {:.3} ± {:.3} ms",
            report.run_time_ms.count,
            report.sensitivity.mean,
            report.sensitivity.std,
            report.precision.mean,
            report.precision.std,
            report.run_time_ms.mean,
            report.run_time_ms.std
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use biopeaks_core::Error;

    fn record(name: &str, signal: bool, annotation: bool) -> Record {
        Record {
            name: name.into(),
            signal: signal.then(|| vec![0.0; 10]),
            annotation: annotation.then(|| vec![1, 5]),
        }
    }

    fn config() -> BenchmarkConfig {
        BenchmarkConfig {
            tolerance: 1,
            sampling_rate: 100.0,
            n_runs: 2,
            queue_capacity: 1,
        }
    }

    #[test]
    fn skips_when_either_part_is_missing() {
        let bench = Benchmark::new(|_: &[f64], _| Ok(vec![1]), config());
        for (signal, annotation) in [(false, true), (true, false), (false, false)] {
            assert!(matches!(
                bench.process(record("r", signal, annotation)),
                RecordOutcome::Skipped { .. }
            ));
        }
        assert!(matches!(
            bench.process(record("r", true, true)),
            RecordOutcome::Scored { .. }
        ));
    }

    #[test]
    fn aggregate_uses_population_std() {
        let a = Aggregate::of(&[1.0, 3.0]);
        assert_relative_eq!(a.mean, 2.0);
        assert_relative_eq!(a.std, 1.0);
        assert_eq!(a.count, 2);
        assert_eq!(Aggregate::of(&[]), Aggregate::default());
    }

    #[test]
    fn timing_counts_every_run() {
        let mut calls = 0;
        let ms = time_detector(|| calls += 1, 5);
        assert_eq!(calls, 5);
        assert!(ms >= 0.0);
        assert_eq!(time_detector(|| (), 0), 0.0);
    }

    #[test]
    fn runs_all_sources_through_one_consumer() {
        let bench = Benchmark::new(|_: &[f64], _| Ok(vec![1, 8]), config());
        let sources: Vec<Box<dyn Fn() -> Record + Sync>> = vec![
            Box::new(|| record("full", true, true)),
            Box::new(|| record("no-signal", false, true)),
            Box::new(|| record("no-annotation", true, false)),
        ];
        let report = bench.run(&sources);
        assert_eq!(report.records.len(), 3);
        let scored: Vec<_> = report
            .records
            .iter()
            .filter(|r| matches!(r, RecordOutcome::Scored { .. }))
            .collect();
        assert_eq!(scored.len(), 1);
        assert_eq!(report.sensitivity.count, 1);
        assert_relative_eq!(report.sensitivity.mean, 0.5);
        assert_relative_eq!(report.precision.mean, 0.5);
        assert_eq!(report.run_time_ms.count, 1);
    }

    #[test]
    fn detector_errors_are_reported_not_fatal() {
        let bench = Benchmark::new(
            |_: &[f64], _| {
                Err(Error::InsufficientPeaks {
                    found: 0,
                    required: 4,
                })
            },
            config(),
        );
        let outcome = bench.process(record("flat", true, true));
        assert!(matches!(outcome, RecordOutcome::Failed { .. }));
        let report = bench.run(&[|| record("flat", true, true)]);
        assert_eq!(report.sensitivity.count, 0);
    }
}
