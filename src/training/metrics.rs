use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

/// Append-only history of one scalar metric, keyed by global step.
#[derive(Debug, Clone, Default)]
pub struct MetricSeries {
    entries: Vec<(u64, f64)>,
}

impl MetricSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one (step, value) pair. Steps must arrive in increasing order.
    pub fn push(&mut self, step: u64, value: f64) {
        debug_assert!(
            self.entries.last().is_none_or(|&(last, _)| last < step),
            "metric steps must be strictly increasing"
        );
        self.entries.push((step, value));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(u64, f64)] {
        &self.entries
    }
}

/// Running correct/total counts for one evaluation pass.
#[derive(Debug, Default)]
pub struct AccuracyAccumulator {
    correct: usize,
    total: usize,
}

impl AccuracyAccumulator {
    pub fn update(&mut self, correct: usize, total: usize) {
        debug_assert!(correct <= total);
        self.correct += correct;
        self.total += total;
    }

    pub fn correct(&self) -> usize {
        self.correct
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Fraction in `[0, 1]`; zero when nothing was evaluated.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.correct as f64 / self.total as f64
    }
}

/// Persists the loss and accuracy series for offline plotting.
///
/// Every flush rewrites each file from scratch with the full history so far,
/// one `step,value` line per entry, no header. The target directory must
/// already exist; a missing directory is a fatal I/O error.
#[derive(Debug)]
pub struct MetricsLogger {
    loss_path: PathBuf,
    acc_path: PathBuf,
}

impl MetricsLogger {
    pub fn new(dir: &str, stem: &str) -> Self {
        let dir = PathBuf::from(dir);
        Self {
            loss_path: dir.join(format!("{stem}_loss.log")),
            acc_path: dir.join(format!("{stem}_acc.log")),
        }
    }

    /// Rewrites both log files with the series recorded so far.
    pub fn flush(&self, loss: &MetricSeries, accuracy: &MetricSeries) -> Result<()> {
        write_series(&self.loss_path, loss)?;
        write_series(&self.acc_path, accuracy)
    }
}

fn write_series(path: &Path, series: &MetricSeries) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("cannot open metric log {}", path.display()))?;
    let mut out = BufWriter::new(file);
    for &(step, value) in series.entries() {
        writeln!(out, "{step},{value}")?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tn-mnist-{tag}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn series_records_in_order() {
        let mut series = MetricSeries::new();
        series.push(0, 2.5);
        series.push(1, 2.1);
        series.push(5, 1.9);

        assert_eq!(series.len(), 3);
        assert_eq!(series.entries()[2], (5, 1.9));
    }

    #[test]
    fn accumulator_stays_within_bounds() {
        let mut counts = AccuracyAccumulator::default();
        counts.update(3, 4);
        counts.update(4, 4);

        assert_eq!(counts.correct(), 7);
        assert_eq!(counts.total(), 8);
        assert!(counts.accuracy() >= 0.0 && counts.accuracy() <= 1.0);
        assert!((counts.accuracy() - 0.875).abs() < 1e-12);

        let empty = AccuracyAccumulator::default();
        assert_eq!(empty.accuracy(), 0.0);
    }

    #[test]
    fn flush_writes_one_line_per_entry() {
        let dir = scratch_dir("flush-lines");
        let logger = MetricsLogger::new(dir.to_str().unwrap(), "mps_bond_2_phys_2");

        let mut loss = MetricSeries::new();
        loss.push(0, 2.5);
        loss.push(1, 2.25);
        let mut acc = MetricSeries::new();
        acc.push(0, 0.125);

        logger.flush(&loss, &acc).unwrap();

        let loss_log = fs::read_to_string(dir.join("mps_bond_2_phys_2_loss.log")).unwrap();
        assert_eq!(loss_log, "0,2.5\n1,2.25\n");
        let acc_log = fs::read_to_string(dir.join("mps_bond_2_phys_2_acc.log")).unwrap();
        assert_eq!(acc_log, "0,0.125\n");
    }

    #[test]
    fn flush_is_idempotent_for_a_snapshot() {
        let dir = scratch_dir("flush-idem");
        let logger = MetricsLogger::new(dir.to_str().unwrap(), "sbs1d_bond_2_phys_2");

        let mut loss = MetricSeries::new();
        loss.push(0, 1.75);
        loss.push(50, 0.5);
        let acc = MetricSeries::new();

        logger.flush(&loss, &acc).unwrap();
        let first = fs::read(dir.join("sbs1d_bond_2_phys_2_loss.log")).unwrap();
        logger.flush(&loss, &acc).unwrap();
        let second = fs::read(dir.join("sbs1d_bond_2_phys_2_loss.log")).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn flush_fails_without_the_target_directory() {
        let dir = std::env::temp_dir()
            .join(format!("tn-mnist-missing-{}", std::process::id()))
            .join("nope");
        let logger = MetricsLogger::new(dir.to_str().unwrap(), "mps_bond_2_phys_2");

        assert!(logger
            .flush(&MetricSeries::new(), &MetricSeries::new())
            .is_err());
    }
}
