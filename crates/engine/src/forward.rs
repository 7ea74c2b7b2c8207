//! Forward-return windows following regime samples.
//!
//! A window starting at observation `start` compounds the `horizon` returns
//! at positions `start + 1 ..= start + horizon`. Windows that would run past
//! the end of history are never produced.

use regime_odds_core::PriceSeries;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::momentum::MomentumSeries;
use crate::regime::Regime;

/// Cumulative return over one forward window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForwardWindow {
    /// Observation the window starts after.
    pub start: usize,
    /// Compounded return over the window.
    pub value: f64,
}

impl ForwardWindow {
    /// Return positions consumed by this window.
    #[must_use]
    pub fn positions(&self, horizon: usize) -> RangeInclusive<usize> {
        self.start + 1..=self.start + horizon
    }
}

/// Extracts forward windows of a fixed horizon from a price series.
pub struct ForwardReturnExtractor {
    returns: Vec<f64>,
    horizon: usize,
}

impl ForwardReturnExtractor {
    #[must_use]
    pub fn new(series: &PriceSeries, horizon: usize) -> Self {
        Self {
            returns: series.returns(),
            horizon,
        }
    }

    /// The window starting after `start`, if `horizon` returns remain and
    /// the compounded value is finite.
    #[must_use]
    pub fn window(&self, start: usize) -> Option<ForwardWindow> {
        if self.horizon == 0 || start + self.horizon >= self.returns.len() {
            return None;
        }
        let value = self.returns[start + 1..=start + self.horizon]
            .iter()
            .fold(1.0, |acc, r| acc * (1.0 + r))
            - 1.0;
        value.is_finite().then_some(ForwardWindow { start, value })
    }

    /// Windows for every regime sample plus up to `max_extra` overlapping
    /// windows advancing by `step` after each one.
    ///
    /// Overlapping windows are only taken when `step < horizon`.
    #[must_use]
    pub fn overlapping(
        &self,
        momentum: &MomentumSeries,
        sample_bins: &[usize],
        regime: &Regime,
        step: usize,
        max_extra: usize,
    ) -> Vec<ForwardWindow> {
        let step = step.max(1);
        let mut windows = Vec::new();

        for (sample, &bin) in momentum.samples().iter().zip(sample_bins) {
            if !regime.contains(bin) {
                continue;
            }
            let Some(base) = self.window(sample.position) else {
                continue;
            };
            windows.push(base);

            if step < self.horizon {
                let mut start = sample.position + step;
                let mut extra = 0;
                while extra < max_extra {
                    match self.window(start) {
                        Some(w) => windows.push(w),
                        None if start + self.horizon >= self.returns.len() => break,
                        None => {}
                    }
                    start += step;
                    extra += 1;
                }
            }
        }

        windows
    }

    /// Windows for regime samples such that no return position is used twice.
    ///
    /// Samples are visited chronologically; a sample whose window would touch
    /// an already consumed position is skipped.
    #[must_use]
    pub fn non_overlapping(
        &self,
        momentum: &MomentumSeries,
        sample_bins: &[usize],
        regime: &Regime,
    ) -> Vec<ForwardWindow> {
        let mut consumed = vec![false; self.returns.len()];
        let mut windows = Vec::new();

        for (sample, &bin) in momentum.samples().iter().zip(sample_bins) {
            if !regime.contains(bin) {
                continue;
            }
            let Some(window) = self.window(sample.position) else {
                continue;
            };
            let positions = window.positions(self.horizon);
            if consumed[positions.clone()].iter().any(|&used| used) {
                continue;
            }
            consumed[positions].iter_mut().for_each(|used| *used = true);
            windows.push(window);
        }

        windows
    }
}

/// Values of a window set, in extraction order.
#[must_use]
pub fn window_values(windows: &[ForwardWindow]) -> Vec<f64> {
    windows.iter().map(|w| w.value).collect()
}
