//! Per-sample stage timing, compiled in only with the `profiling` feature.

#[cfg(feature = "profiling")]
use crate::common::*;

/// Records the elapsed time of each loading stage of one pair.
#[cfg(feature = "profiling")]
#[derive(Debug)]
pub struct Timing {
    name: &'static str,
    index: usize,
    start: Instant,
    instant: Instant,
    stages: Vec<(&'static str, Duration)>,
}

#[cfg(not(feature = "profiling"))]
#[derive(Debug)]
pub struct Timing;

impl Timing {
    /// Start timing the pair at `index`.
    pub fn for_pair(name: &'static str, index: usize) -> Self {
        #[cfg(feature = "profiling")]
        {
            let now = Instant::now();
            Self {
                name,
                index,
                start: now,
                instant: now,
                stages: vec![],
            }
        }

        #[cfg(not(feature = "profiling"))]
        {
            let _ = (name, index);
            Self
        }
    }

    /// Close the current stage under `stage`.
    pub fn set_record(&mut self, stage: &'static str) {
        #[cfg(feature = "profiling")]
        {
            let now = Instant::now();
            self.stages.push((stage, now - self.instant));
            self.instant = now;
        }

        #[cfg(not(feature = "profiling"))]
        let _ = stage;
    }

    /// The names of the closed stages in order. Empty without profiling.
    pub fn stages(&self) -> Vec<&'static str> {
        #[cfg(feature = "profiling")]
        {
            self.stages.iter().map(|(stage, _)| *stage).collect()
        }

        #[cfg(not(feature = "profiling"))]
        {
            vec![]
        }
    }

    pub fn report(&self) {
        #[cfg(feature = "profiling")]
        {
            let total = self.instant - self.start;
            let slowest = self
                .stages
                .iter()
                .max_by_key(|(_, elapsed)| *elapsed)
                .map(|(stage, _)| *stage)
                .unwrap_or("none");
            info!(
                "{} #{} took {:?}, slowest stage '{}'",
                self.name, self.index, total, slowest
            );
            self.stages.iter().for_each(|(stage, elapsed)| {
                info!("- #{} {}\t{:?}", self.index, stage, elapsed);
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_are_recorded_in_order() {
        let mut timing = Timing::for_pair("paired sample", 7);
        timing.set_record("fetch");
        timing.set_record("decode");
        timing.report();

        if cfg!(feature = "profiling") {
            assert_eq!(timing.stages(), vec!["fetch", "decode"]);
        } else {
            assert!(timing.stages().is_empty());
        }
    }
}
