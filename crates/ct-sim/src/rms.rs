//! Sliding one-cycle RMS estimator.

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// RMS value plus whether the window had filled when it was computed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RmsReading {
    pub value: f64,
    /// True until a full window of samples has been seen.
    pub provisional: bool,
}

/// Fixed-capacity ring buffer with a running sum of squares.
///
/// Each update is O(1). The running sum is rebuilt from the buffer every
/// time the write head wraps, which bounds floating-point drift to one
/// window's worth of additions and keeps replay bit-identical.
#[derive(Debug, Clone)]
pub struct RmsWindow {
    buf: Vec<f64>,
    head: usize,
    len: usize,
    sum_sq: f64,
}

impl RmsWindow {
    pub fn new(capacity: usize) -> SimResult<Self> {
        if capacity == 0 {
            return Err(SimError::InvalidParameter {
                what: "RMS window capacity must be positive",
            });
        }
        Ok(Self {
            buf: vec![0.0; capacity],
            head: 0,
            len: 0,
            sum_sq: 0.0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Push one sample and return the RMS over the samples now in the window.
    pub fn update(&mut self, sample: f64) -> RmsReading {
        let sq = sample * sample;
        if self.is_full() {
            self.sum_sq -= self.buf[self.head] * self.buf[self.head];
        } else {
            self.len += 1;
        }
        self.buf[self.head] = sample;
        self.sum_sq += sq;

        self.head += 1;
        if self.head == self.capacity() {
            self.head = 0;
            self.sum_sq = self.buf.iter().map(|x| x * x).sum();
        }

        self.reading()
    }

    /// Current reading, or `None` before the first sample.
    pub fn current(&self) -> Option<RmsReading> {
        (!self.is_empty()).then(|| self.reading())
    }

    pub fn reset(&mut self) {
        self.buf.fill(0.0);
        self.head = 0;
        self.len = 0;
        self.sum_sq = 0.0;
    }

    fn reading(&self) -> RmsReading {
        let mean_sq = self.sum_sq.max(0.0) / self.len as f64;
        RmsReading {
            value: mean_sq.sqrt(),
            provisional: !self.is_full(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ct_core::{Tolerances, nearly_equal};

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(RmsWindow::new(0).is_err());
    }

    #[test]
    fn provisional_until_full() {
        let mut w = RmsWindow::new(4).unwrap();
        assert!(w.current().is_none());

        let r = w.update(3.0);
        assert!(r.provisional);
        assert_eq!(r.value, 3.0);

        let r = w.update(-4.0);
        assert!(r.provisional);
        assert!(nearly_equal(r.value, 12.5f64.sqrt(), Tolerances::default()));

        w.update(0.0);
        let r = w.update(0.0);
        assert!(!r.provisional);
        assert!(nearly_equal(r.value, 6.25f64.sqrt(), Tolerances::default()));
    }

    #[test]
    fn oldest_sample_is_evicted() {
        let mut w = RmsWindow::new(2).unwrap();
        w.update(10.0);
        w.update(1.0);
        let r = w.update(1.0);
        assert!(!r.provisional);
        assert!(nearly_equal(r.value, 1.0, Tolerances::default()));
    }

    #[test]
    fn sinusoid_converges_to_amplitude_over_root_two() {
        let spc = 200;
        let amplitude = 7.5;
        let mut w = RmsWindow::new(spc).unwrap();
        let mut last = None;
        for k in 0..3 * spc {
            let phase = 2.0 * std::f64::consts::PI * k as f64 / spc as f64;
            last = Some(w.update(amplitude * phase.sin()));
        }
        let last = last.unwrap();
        assert!(!last.provisional);
        let tol = Tolerances {
            abs: 1e-9,
            rel: 1e-9,
        };
        assert!(nearly_equal(last.value, amplitude / 2f64.sqrt(), tol));
    }

    #[test]
    fn replay_is_deterministic() {
        let samples: Vec<f64> = (0..517).map(|k| ((k * 37) % 101) as f64 - 50.0).collect();
        let run = |samples: &[f64]| {
            let mut w = RmsWindow::new(64).unwrap();
            samples.iter().map(|&x| w.update(x)).collect::<Vec<_>>()
        };
        assert_eq!(run(&samples), run(&samples));
    }

    #[test]
    fn reset_clears_history() {
        let mut w = RmsWindow::new(3).unwrap();
        w.update(5.0);
        w.reset();
        assert!(w.is_empty());
        assert_eq!(w.update(2.0).value, 2.0);
    }
}
