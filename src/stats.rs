//! Kinetic-energy distribution reporting.
//!
//! Companion analysis for the converter: sweep a directory of dumps, collect
//! the `ke` field, and report the energy at a set of upper-tail fractions.

use std::path::Path;

use crate::error::Result;
use crate::particle::DumpReader;

/// Upper-tail fractions reported by the stats tool: the energy below which
/// the given fraction of the hottest particles lies.
pub const TAIL_FRACTIONS: [f64; 6] = [0.3, 0.03, 0.003, 3e-4, 3e-5, 3e-6];

/// Accumulates kinetic energies across dump files.
#[derive(Default)]
pub struct EnergyStats {
    samples: Vec<f32>,
}

impl EnergyStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every particle's kinetic energy from one dump. Returns the
    /// number of particles read.
    pub fn add_file(&mut self, path: &Path) -> Result<u64> {
        let mut reader = DumpReader::open(path)?;
        self.samples.reserve(reader.record_count() as usize);
        let mut read = 0;
        while let Some(particle) = reader.next_particle()? {
            self.samples.push(particle.ke);
            read += 1;
        }
        Ok(read)
    }

    /// Sort the collected energies and produce the report.
    pub fn finish(mut self) -> EnergyReport {
        self.samples.sort_by(f32::total_cmp);
        EnergyReport {
            samples: self.samples,
        }
    }
}

/// Sorted kinetic energies, queryable by tail fraction.
pub struct EnergyReport {
    samples: Vec<f32>,
}

impl EnergyReport {
    pub fn total(&self) -> usize {
        self.samples.len()
    }

    /// Energy at the start of the hottest `fraction` of particles, or `None`
    /// for an empty report. Fractions that floor to zero particles resolve
    /// to the hottest sample.
    pub fn tail_value(&self, fraction: f64) -> Option<f32> {
        let n = self.samples.len();
        if n == 0 {
            return None;
        }
        let tail = (n as f64 * fraction) as usize;
        let index = n.saturating_sub(tail).min(n - 1);
        Some(self.samples[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(values: impl IntoIterator<Item = f32>) -> EnergyReport {
        let mut samples: Vec<f32> = values.into_iter().collect();
        samples.sort_by(f32::total_cmp);
        EnergyReport { samples }
    }

    #[test]
    fn tail_fraction_indexes_from_the_hot_end() {
        let report = report((0..100).map(|v| v as f32));
        assert_eq!(report.tail_value(0.3), Some(70.0));
        assert_eq!(report.tail_value(0.03), Some(97.0));
    }

    #[test]
    fn tiny_fractions_clamp_to_the_hottest_sample() {
        let report = report((0..10).map(|v| v as f32));
        assert_eq!(report.tail_value(3e-6), Some(9.0));
    }

    #[test]
    fn empty_report_has_no_tail() {
        assert_eq!(report([]).tail_value(0.3), None);
    }
}
