//! Band-norm tables and quantization step-size derivation (spec §4.7).
//!
//! Resolves Open Question (a) from spec §9: the teacher's withheld `dwt.rs`
//! is known (via `opj_dwt_getnorm`/`opj_dwt_getnorm_real` call sites still
//! present in `t1.rs`) to expose two near-identical norm lookups; this
//! module exposes exactly one, [`band_norm`], parameterized by
//! `reversible` instead.

use crate::math::floor_log2_u32;

/// Reversible-filter band norms are all 1.0 after the standard 5/3
/// normalization (kept as a table, not a constant, so the level-clamp rule
/// is uniform code for both filters).
const NORM_REVERSIBLE: [[f64; 10]; 4] = [[1.0; 10]; 4];

/// Irreversible (9/7) band norms, indexed `[orientation][level]`. Row 0
/// (LL) is the only row consulted at `orient = 0`; `level` there is the
/// number of remaining decompositions `R-1-resno` at `resno=0`.
const NORM_IRREVERSIBLE: [[f64; 10]; 4] = [
  [4.435, 4.267, 4.177, 4.136, 4.114, 4.102, 4.096, 4.093, 4.091, 4.090],
  [1.965, 2.022, 2.013, 2.009, 2.024, 2.025, 2.028, 2.029, 2.029, 2.030],
  [1.965, 2.022, 2.013, 2.009, 2.024, 2.025, 2.028, 2.029, 2.029, 2.030],
  [4.257, 3.956, 3.962, 3.981, 4.016, 4.041, 4.057, 4.066, 4.071, 4.074],
];

fn row_index(orient: u32) -> usize {
  match orient {
    0 => 0,
    1 | 2 => orient as usize,
    _ => 3,
  }
}

/// Single entry point for band-norm lookups (no separate "real" variant).
/// `level` is clamped per spec §3: LL (`orient=0`) clamps at `>=10 -> 9`;
/// every other orientation clamps at `>=9 -> 8`.
pub fn band_norm(level: u32, orient: u32, reversible: bool) -> f64 {
  let row = row_index(orient);
  let max_index = if orient == 0 { 9 } else { 8 };
  let index = (level as usize).min(max_index);
  if reversible {
    NORM_REVERSIBLE[row][index]
  } else {
    NORM_IRREVERSIBLE[row][index]
  }
}

/// Gain exponent added on top of the stepsize for a given orientation
/// (spec §4.7): 0 for LL, 1 for HL/LH, 2 for HH when irreversible; always 0
/// when reversible.
pub fn band_gain(orient: u32, reversible: bool) -> u32 {
  if reversible {
    return 0;
  }
  match orient {
    0 => 0,
    1 | 2 => 1,
    _ => 2,
  }
}

/// Decomposes a linear band index `b` (0-based, `3*R-2` total bands) into
/// `(resno, orient)` per spec §4.7.
pub fn band_resno_orient(b: u32) -> (u32, u32) {
  if b == 0 {
    (0, 0)
  } else {
    (((b - 1) / 3) + 1, (b - 1) % 3 + 1)
  }
}

/// One encoded `(exponent, mantissa)` quantization step-size pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepSize {
  pub exponent: i32,
  pub mantissa: i32,
}

/// Encodes a floating-point stepsize into the `(exponent, mantissa)`
/// representation (spec §4.7's final bullet).
fn encode_stepsize(stepsize: f64, precision: i32, gain: u32) -> StepSize {
  let scaled = (stepsize * 8192.0).floor();
  let s = if scaled <= 0.0 { 0u32 } else { scaled.min(u32::MAX as f64) as u32 };
  let log2_s = if s == 0 { 0 } else { floor_log2_u32(s) };
  let p = log2_s - 13;
  let n = 11 - log2_s;
  let mantissa = (if n < 0 { (s >> (-n) as u32) as i32 } else { (s << n as u32) as i32 }) & 0x7FF;
  let exponent = precision + gain as i32 - p;
  StepSize { exponent, mantissa }
}

/// Computes the full `(exponent, mantissa)` table for `num_resolutions`
/// resolution levels (`3*num_resolutions - 2` bands, spec §4.7).
/// `reversible` selects the 5/3 (no quantization) vs 9/7 norm tables.
pub fn compute_stepsizes(num_resolutions: u32, precision: i32, reversible: bool) -> Vec<StepSize> {
  if num_resolutions == 0 {
    return Vec::new();
  }
  let num_bands = 3 * num_resolutions - 2;
  (0..num_bands)
    .map(|b| {
      let (resno, orient) = band_resno_orient(b);
      let level = num_resolutions - 1 - resno;
      let gain = band_gain(orient, reversible);
      let stepsize = if reversible {
        1.0
      } else {
        f64::from(1u32 << gain) / band_norm(level, orient, reversible)
      };
      encode_stepsize(stepsize, precision, gain)
    })
    .collect()
}
