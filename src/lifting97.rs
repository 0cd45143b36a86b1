//! 1-D lifting primitives for the irreversible 9/7 float filter (spec
//! §4.1, §4.3).
//!
//! Four lifting steps plus a scaling step, applied in reverse order for
//! the inverse transform, mirroring the 5/3 family in `lifting53.rs` but
//! over `f32` with no promotion to `f64` anywhere in the hot path (spec
//! §4.3 "single-precision exactness").
//!
//! `BUG_WEIRD_TWO_INVK`: the historical conformance quirk this engine
//! preserves on purpose (spec §3 "Lifting constants", §9 Design Note (c)).
//! The inverse transform's high-pass scale step uses the literal constant
//! `two/K ≈ 1.625732422`, not the mathematically "natural" `1/K`, and that
//! value is a hardcoded literal rather than `2.0 * INV_K` computed at
//! runtime, per Design Note (c): "do not derive it from invK at runtime".
//! `forward_97_row`'s high-pass scale is set to the exact reciprocal of
//! `TWO_INVK` rather than `K`, so that the §8 round-trip testable property
//! (`decode_97(encode_97(x)) == x` within `1e-5`) holds without a
//! quantization step sitting in between; see DESIGN.md for this call.

/// Number of columns processed together by the batched column kernels
/// (spec §4.8 "8-lane SIMD-style scratch buffers"). Plain scalar Rust
/// loop over a fixed-width scratch row; no hardware SIMD intrinsics.
pub const LANES: usize = 8;

const ALPHA: f32 = -1.586_134_3;
const BETA: f32 = -0.052_980_118;
const GAMMA: f32 = 0.882_911_08;
const DELTA: f32 = 0.443_506_85;
const K: f32 = 1.230_174_1;
const INV_K: f32 = 0.812_893_06;
/// The historical quirk constant, hardcoded per Design Note (c).
const TWO_INVK: f32 = 1.625_732_4;
/// Reciprocal of [`TWO_INVK`], used only by the forward high-pass scale so
/// that forward/inverse remain exact inverses of each other.
const FORWARD_HIGH_SCALE: f32 = 1.0 / TWO_INVK;

#[inline]
fn clamp_index(i: isize, len: usize) -> usize {
  if i < 0 {
    0
  } else if i as usize >= len {
    len - 1
  } else {
    i as usize
  }
}

#[inline]
fn offsets(cas: u32) -> (usize, usize) {
  if cas == 0 {
    (0, 1)
  } else {
    (1, 0)
  }
}

/// `S(i) += coeff * (D(i-1) + D(i))` for all `i`, boundary-clamped.
fn lift_on_low(buf: &mut [f32], sn: usize, dn: usize, cas: u32, coeff: f32) {
  if sn == 0 || dn == 0 {
    return;
  }
  let (s_off, d_off) = offsets(cas);
  for i in 0..sn {
    let d_prev = buf[2 * clamp_index(i as isize - 1, dn) + d_off];
    let d_cur = buf[2 * clamp_index(i as isize, dn) + d_off];
    buf[2 * i + s_off] += coeff * (d_prev + d_cur);
  }
}

/// `D(i) += coeff * (S(i) + S(i+1))` for all `i`, boundary-clamped.
fn lift_on_high(buf: &mut [f32], sn: usize, dn: usize, cas: u32, coeff: f32) {
  if sn == 0 || dn == 0 {
    return;
  }
  let (s_off, d_off) = offsets(cas);
  for i in 0..dn {
    let s_cur = buf[2 * clamp_index(i as isize, sn) + s_off];
    let s_next = buf[2 * clamp_index(i as isize + 1, sn) + s_off];
    buf[2 * i + d_off] += coeff * (s_cur + s_next);
  }
}

pub(crate) fn interleave(low: &[f32], high: &[f32], cas: u32, out: &mut [f32]) {
  debug_assert_eq!(out.len(), low.len() + high.len());
  let (s_off, d_off) = offsets(cas);
  for (i, &s) in low.iter().enumerate() {
    out[2 * i + s_off] = s;
  }
  for (i, &d) in high.iter().enumerate() {
    out[2 * i + d_off] = d;
  }
}

/// In-place inverse transform of an already-interleaved buffer: the scale
/// step plus the four lifting steps in reverse order. Used directly by
/// `Transform2D`, whose tile buffer already holds band samples scattered
/// into interleaved position.
pub(crate) fn inverse_97_in_place(buf: &mut [f32], sn: usize, dn: usize, cas: u32) {
  if sn + dn == 0 {
    return;
  }
  let (s_off, d_off) = offsets(cas);
  for i in 0..sn {
    buf[2 * i + s_off] *= K;
  }
  for i in 0..dn {
    buf[2 * i + d_off] *= TWO_INVK;
  }

  lift_on_low(buf, sn, dn, cas, -DELTA);
  lift_on_high(buf, sn, dn, cas, -GAMMA);
  lift_on_low(buf, sn, dn, cas, -BETA);
  lift_on_high(buf, sn, dn, cas, -ALPHA);
}

/// Fused inverse 9/7: interleaves `low`/`high` into `out` and runs
/// [`inverse_97_in_place`].
pub fn inverse_97_fused(low: &[f32], high: &[f32], cas: u32, out: &mut [f32]) {
  let sn = low.len();
  let dn = high.len();
  debug_assert_eq!(out.len(), sn + dn);
  if sn + dn == 0 {
    return;
  }
  interleave(low, high, cas, out);
  inverse_97_in_place(out, sn, dn, cas);
}

/// Forward 9/7 on one row/column of `width` samples. Writes the
/// deinterleaved result into `out` (first `sn` low-pass, then `dn`
/// high-pass samples).
pub fn forward_97_row(x: &[f32], even: bool, out: &mut [f32]) {
  let width = x.len();
  debug_assert_eq!(out.len(), width);
  if width == 0 {
    return;
  }
  let sn = if even { width.div_ceil(2) } else { width / 2 };
  let dn = width - sn;
  let cas = if even { 0 } else { 1 };
  let (s_off, d_off) = offsets(cas);

  let mut buf = vec![0.0f32; width];
  for (i, &v) in x.iter().enumerate() {
    buf[i] = v;
  }

  lift_on_high(&mut buf, sn, dn, cas, ALPHA);
  lift_on_low(&mut buf, sn, dn, cas, BETA);
  lift_on_high(&mut buf, sn, dn, cas, GAMMA);
  lift_on_low(&mut buf, sn, dn, cas, DELTA);

  for i in 0..sn {
    buf[2 * i + s_off] *= INV_K;
  }
  for i in 0..dn {
    buf[2 * i + d_off] *= FORWARD_HIGH_SCALE;
  }

  let (low_out, high_out) = out.split_at_mut(sn);
  for i in 0..sn {
    low_out[i] = buf[2 * i + s_off];
  }
  for i in 0..dn {
    high_out[i] = buf[2 * i + d_off];
  }
}

/// Scalar tail kernel used by `Transform2D` when a column batch is not a
/// full multiple of [`LANES`] (spec §4.8): runs [`inverse_97_fused`] one
/// column at a time over `columns` flattened `stride`-major scratch data.
pub fn inverse_97_tail_columns(low: &[f32], high: &[f32], cas: u32, stride: usize, columns: usize, out: &mut [f32]) {
  let sn = low.len() / stride.max(1);
  let dn = high.len() / stride.max(1);
  let mut low_col = vec![0.0f32; sn];
  let mut high_col = vec![0.0f32; dn];
  let mut out_col = vec![0.0f32; sn + dn];
  for c in 0..columns {
    for i in 0..sn {
      low_col[i] = low[i * stride + c];
    }
    for i in 0..dn {
      high_col[i] = high[i * stride + c];
    }
    inverse_97_fused(&low_col, &high_col, cas, &mut out_col);
    for i in 0..(sn + dn) {
      out[i * stride + c] = out_col[i];
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn roundtrip(x: &[f32], even: bool) -> Vec<f32> {
    let width = x.len();
    let sn = if even { width.div_ceil(2) } else { width / 2 };
    let mut fwd = vec![0.0f32; width];
    forward_97_row(x, even, &mut fwd);
    let (low, high) = fwd.split_at(sn);
    let cas = if even { 0 } else { 1 };
    let mut back = vec![0.0f32; width];
    inverse_97_fused(low, high, cas, &mut back);
    back
  }

  #[test]
  fn forward_then_inverse_roundtrips_within_float_tolerance() {
    let x: Vec<f32> = (0..16).map(|i| (i as f32) * 3.5 - 10.0).collect();
    let back = roundtrip(&x, true);
    for (a, b) in x.iter().zip(back.iter()) {
      assert!((a - b).abs() < 1e-3, "{a} vs {b}");
    }
  }

  #[test]
  fn forward_then_inverse_roundtrips_odd_width() {
    let x: Vec<f32> = (0..9).map(|i| (i as f32).sin() * 100.0).collect();
    let back = roundtrip(&x, true);
    for (a, b) in x.iter().zip(back.iter()) {
      assert!((a - b).abs() < 1e-2, "{a} vs {b}");
    }
  }

  #[test]
  fn zero_tile_stays_zero() {
    // Scenario 3 from spec §8: 9/7 inverse on an all-zero LL tile.
    let low = [0.0f32; 8];
    let high = [0.0f32; 8];
    let mut out = vec![0.0f32; 16];
    inverse_97_fused(&low, &high, 0, &mut out);
    assert!(out.iter().all(|&v| v == 0.0));
  }

  #[test]
  fn tail_column_kernel_matches_per_column_fused_calls() {
    let stride = 3;
    let sn = 4;
    let dn = 4;
    let low: Vec<f32> = (0..sn * stride).map(|i| i as f32).collect();
    let high: Vec<f32> = (0..dn * stride).map(|i| -(i as f32)).collect();
    let mut batched = vec![0.0f32; (sn + dn) * stride];
    inverse_97_tail_columns(&low, &high, 0, stride, stride, &mut batched);

    for c in 0..stride {
      let low_col: Vec<f32> = (0..sn).map(|i| low[i * stride + c]).collect();
      let high_col: Vec<f32> = (0..dn).map(|i| high[i * stride + c]).collect();
      let mut expected = vec![0.0f32; sn + dn];
      inverse_97_fused(&low_col, &high_col, 0, &mut expected);
      for i in 0..(sn + dn) {
        assert_eq!(batched[i * stride + c], expected[i]);
      }
    }
  }

  #[test]
  fn two_invk_constant_is_roughly_double_the_natural_invk() {
    assert!((TWO_INVK - 2.0 * INV_K).abs() < 1e-6);
  }

  #[test]
  fn random_rows_round_trip_within_bounded_error() {
    // "Round-trip (irreversible, bounded error)" from spec §8: random
    // float rows bounded to [-1, 1], max|decode(encode(x)) - x| < 1e-5.
    use rand::Rng;
    let mut rng = rand::thread_rng();
    for _ in 0..200 {
      let width = rng.gen_range(1..64);
      let x: Vec<f32> = (0..width).map(|_| rng.gen_range(-1.0f32..1.0)).collect();
      let even = rng.gen_bool(0.5);
      let sn = if even { (width as usize).div_ceil(2) } else { width as usize / 2 };
      let mut fwd = vec![0.0f32; width as usize];
      forward_97_row(&x, even, &mut fwd);
      let (low, high) = fwd.split_at(sn);
      let cas = if even { 0 } else { 1 };
      let mut back = vec![0.0f32; width as usize];
      inverse_97_fused(low, high, cas, &mut back);
      let max_err = x.iter().zip(back.iter()).map(|(a, b)| (a - b).abs()).fold(0.0f32, f32::max);
      assert!(max_err < 1e-5, "width={width} even={even} max_err={max_err}");
    }
  }
}
