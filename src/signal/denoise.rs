//! Trajectory Denoising
//!
//! Smooths the x/y channels of a gaze series before segmentation. Jitter in
//! the raw positions inflates sample-to-sample velocity; smoothing keeps the
//! fixation/saccade classifier from reacting to tracker noise.

use super::series::GazeSeries;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest Savitzky-Golay window (samples)
pub const SAVGOL_MAX_WINDOW: usize = 11;

/// Savitzky-Golay polynomial order
pub const SAVGOL_POLY_ORDER: usize = 2;

/// Median filter kernel size (samples)
pub const MEDIAN_KERNEL: usize = 5;

/// Smoothing method applied to x/y positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DenoiseMethod {
    /// Savitzky-Golay polynomial smoothing
    #[default]
    Savgol,
    /// Sliding median
    Median,
    /// Copy positions unchanged
    None,
}

impl DenoiseMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenoiseMethod::Savgol => "savgol",
            DenoiseMethod::Median => "median",
            DenoiseMethod::None => "none",
        }
    }
}

impl fmt::Display for DenoiseMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DenoiseMethod {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "savgol" => Ok(DenoiseMethod::Savgol),
            "median" => Ok(DenoiseMethod::Median),
            "none" => Ok(DenoiseMethod::None),
            other => Err(crate::Error::Config(format!(
                "unknown denoise method '{}' (expected savgol, median or none)",
                other
            ))),
        }
    }
}

/// Produce a new series with smoothed x/y; timestamps, pupil and session are copied.
pub fn denoise(series: &GazeSeries, method: DenoiseMethod) -> GazeSeries {
    match method {
        DenoiseMethod::Savgol => {
            let filter = SavitzkyGolay::for_length(series.sample_count());
            match filter {
                Some(filter) => {
                    series.with_positions(filter.smooth(series.x()), filter.smooth(series.y()))
                }
                // Too short to smooth
                None => series.clone(),
            }
        }
        DenoiseMethod::Median => series.with_positions(
            median_filter(series.x(), MEDIAN_KERNEL),
            median_filter(series.y(), MEDIAN_KERNEL),
        ),
        DenoiseMethod::None => series.clone(),
    }
}

/// Savitzky-Golay smoother with a fixed odd window and polynomial order 2.
///
/// Interior samples use the centred least-squares fit. The first and last
/// half-window samples are evaluated from the polynomial fitted to the first
/// and last full window respectively.
#[derive(Debug, Clone)]
pub struct SavitzkyGolay {
    window: usize,
    /// Centre-evaluation coefficients
    centre: Vec<f64>,
    /// Inverse normal matrix (AᵀA)⁻¹ for the window's design matrix
    normal_inverse: [[f64; 3]; 3],
}

impl SavitzkyGolay {
    /// Window for a series of `len` samples: `min(11, len)` rounded down to odd.
    ///
    /// Returns `None` when the window would be shorter than 3 samples.
    pub fn for_length(len: usize) -> Option<Self> {
        let odd_len = if len % 2 == 1 { len } else { len.saturating_sub(1) };
        let window = SAVGOL_MAX_WINDOW.min(odd_len);
        if window < 3 {
            return None;
        }
        Some(Self::with_window(window))
    }

    /// Create with an explicit odd window length (>= 3)
    pub fn with_window(window: usize) -> Self {
        debug_assert!(window >= 3 && window % 2 == 1);
        let half = (window / 2) as f64;

        // Power sums over t = -half..=half
        let mut s = [0.0f64; 5];
        for j in 0..window {
            let t = j as f64 - half;
            let mut p = 1.0;
            for sk in s.iter_mut() {
                *sk += p;
                p *= t;
            }
        }
        let normal = [
            [s[0], s[1], s[2]],
            [s[1], s[2], s[3]],
            [s[2], s[3], s[4]],
        ];
        let normal_inverse = invert_3x3(&normal);

        let mut filter = Self {
            window,
            centre: Vec::new(),
            normal_inverse,
        };
        filter.centre = filter.weights_at(0.0);
        filter
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Least-squares weights for evaluating the fitted polynomial at offset `t0`
    /// from the window centre.
    fn weights_at(&self, t0: f64) -> Vec<f64> {
        let half = (self.window / 2) as f64;
        let basis = [1.0, t0, t0 * t0];

        // p(t0)ᵀ · (AᵀA)⁻¹
        let mut row = [0.0f64; 3];
        for (c, slot) in row.iter_mut().enumerate() {
            *slot = (0..3).map(|r| basis[r] * self.normal_inverse[r][c]).sum();
        }

        (0..self.window)
            .map(|j| {
                let t = j as f64 - half;
                row[0] + row[1] * t + row[2] * t * t
            })
            .collect()
    }

    /// Smooth one channel. Input shorter than the window is returned unchanged.
    pub fn smooth(&self, values: &[f64]) -> Vec<f64> {
        let n = values.len();
        let w = self.window;
        if n < w {
            return values.to_vec();
        }
        let half = w / 2;
        let mut out = vec![0.0; n];

        for i in half..(n - half) {
            let window = &values[i - half..=i + half];
            out[i] = dot(&self.centre, window);
        }

        // Edges: evaluate the polynomial fitted to the first / last full window
        let head = &values[..w];
        let tail = &values[n - w..];
        for i in 0..half {
            let head_weights = self.weights_at(i as f64 - half as f64);
            out[i] = dot(&head_weights, head);

            let tail_index = n - half + i;
            let tail_weights = self.weights_at((i + 1) as f64);
            out[tail_index] = dot(&tail_weights, tail);
        }

        out
    }
}

/// Sliding median over an odd `kernel`; samples beyond either end read as zero.
pub fn median_filter(values: &[f64], kernel: usize) -> Vec<f64> {
    let half = kernel / 2;
    let n = values.len();
    let mut window = vec![0.0; 2 * half + 1];

    (0..n)
        .map(|i| {
            for (k, slot) in window.iter_mut().enumerate() {
                // Index i + k - half, zero outside [0, n)
                *slot = (i + k)
                    .checked_sub(half)
                    .and_then(|j| values.get(j))
                    .copied()
                    .unwrap_or(0.0);
            }
            window.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            window[half]
        })
        .collect()
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn invert_3x3(m: &[[f64; 3]; 3]) -> [[f64; 3]; 3] {
    let cof = |r0: usize, r1: usize, c0: usize, c1: usize| m[r0][c0] * m[r1][c1] - m[r0][c1] * m[r1][c0];

    let c00 = cof(1, 2, 1, 2);
    let c01 = -cof(1, 2, 0, 2);
    let c02 = cof(1, 2, 0, 1);
    let det = m[0][0] * c00 + m[0][1] * c01 + m[0][2] * c02;

    let c10 = -cof(0, 2, 1, 2);
    let c11 = cof(0, 2, 0, 2);
    let c12 = -cof(0, 2, 0, 1);
    let c20 = cof(0, 1, 1, 2);
    let c21 = -cof(0, 1, 0, 2);
    let c22 = cof(0, 1, 0, 1);

    // Adjugate is the transpose of the cofactor matrix
    [
        [c00 / det, c10 / det, c20 / det],
        [c01 / det, c11 / det, c21 / det],
        [c02 / det, c12 / det, c22 / det],
    ]
}
