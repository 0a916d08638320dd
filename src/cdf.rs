// ABRCC: Startup Delay and Video Quality of ABR Algorithms under Different Congestion Control
// Copyright (C) 2024-2025 Roland Schmid <roschmi@ethz.ch> and Tibor Schneider <sctibor@ethz.ch>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//! Empirical CDFs over a fixed binning.

/// Fixed, equal-width binning of a value range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Binning {
    pub min: f64,
    pub max: f64,
    pub num_bins: usize,
}

/// Startup delay in seconds.
pub const DELAY_BINS: Binning = Binning {
    min: 0.0,
    max: 3.0,
    num_bins: 100,
};

/// SSIM in dB.
pub const SSIM_BINS: Binning = Binning {
    min: 3.5,
    max: 22.5,
    num_bins: 100,
};

impl Binning {
    /// The `num_bins + 1` bin edges, from `min` to `max`. The last edge is exactly `max`.
    pub fn edges(&self) -> Vec<f64> {
        let step = (self.max - self.min) / self.num_bins as f64;
        let mut edges: Vec<f64> = (0..=self.num_bins)
            .map(|i| self.min + i as f64 * step)
            .collect();
        if let Some(last) = edges.last_mut() {
            *last = self.max;
        }
        edges
    }

    /// Count the samples per bin. All bins are half-open except the last one, which includes
    /// `max`. Samples outside of the range (and NaN) are not counted.
    pub fn histogram(&self, samples: &[f64]) -> Vec<usize> {
        let mut counts = vec![0; self.num_bins];
        if self.num_bins == 0 {
            return counts;
        }
        let edges = self.edges();
        let last = self.num_bins - 1;
        let scale = self.num_bins as f64 / (self.max - self.min);
        for x in samples.iter().copied() {
            if !(self.min..=self.max).contains(&x) {
                continue;
            }
            let mut bin = (((x - self.min) * scale) as usize).min(last);
            // rounding may move a sample on an edge into the neighboring bin
            if x < edges[bin] {
                bin -= 1;
            } else if bin != last && x >= edges[bin + 1] {
                bin += 1;
            }
            counts[bin] += 1;
        }
        counts
    }

    /// Compute the CDF of `samples` at every bin edge.
    ///
    /// The cumulative bin counts are normalized by the total number of samples, including the ones
    /// outside of the range, and a leading zero aligns the curve with the left-most edge. Returns
    /// `None` if there are no samples.
    pub fn cdf(&self, samples: &[f64]) -> Option<(Vec<f64>, Vec<f64>)> {
        if samples.is_empty() {
            return None;
        }
        let total = samples.len() as f64;
        let y = std::iter::once(0.0)
            .chain(self.histogram(samples).into_iter().scan(0usize, |acc, c| {
                *acc += c;
                Some(*acc as f64 / total)
            }))
            .collect();
        Some((self.edges(), y))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn edges() {
        let edges = DELAY_BINS.edges();
        assert_eq!(edges.len(), 101);
        assert_eq!(edges[0], 0.0);
        assert!((edges[1] - 0.03).abs() < 1e-12);
        assert_eq!(edges[100], 3.0);
    }

    #[test]
    fn histogram_bounds() {
        let bins = Binning {
            min: 0.0,
            max: 1.0,
            num_bins: 4,
        };
        let counts = bins.histogram(&[-0.1, 0.0, 0.2, 0.25, 0.99, 1.0, 1.5, f64::NAN]);
        assert_eq!(counts, vec![2, 1, 0, 2]);
    }

    #[test]
    fn samples_on_edges_open_their_bin() {
        for bins in [SSIM_BINS, DELAY_BINS] {
            let edges = bins.edges();
            for (i, edge) in edges.iter().enumerate().take(bins.num_bins) {
                let counts = bins.histogram(&[*edge]);
                assert_eq!(counts[i], 1, "edge {i} = {edge} of {bins:?}");
            }
            assert_eq!(bins.histogram(&[bins.max])[bins.num_bins - 1], 1);
        }
        assert_eq!(SSIM_BINS.histogram(&[SSIM_BINS.edges()[2]])[2], 1);
    }

    #[test]
    fn cdf_shape() {
        let samples = [0.1, 0.5, 0.5, 1.2, 2.9, 0.0, 3.0];
        let (x, y) = DELAY_BINS.cdf(&samples).unwrap();

        assert_eq!(x.len(), y.len());
        assert_eq!(y[0], 0.0);
        assert!(y.windows(2).all(|w| w[0] <= w[1]));
        assert!((y.last().unwrap() - 1.0).abs() < 1e-12);
        // 0.0 lands in the first bin, so the CDF is positive at its right edge
        assert!((y[1] - 1.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn cdf_with_samples_out_of_range() {
        let (_, y) = SSIM_BINS.cdf(&[10.0, 30.0]).unwrap();
        assert!((y.last().unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn cdf_without_samples() {
        assert!(SSIM_BINS.cdf(&[]).is_none());
    }
}
