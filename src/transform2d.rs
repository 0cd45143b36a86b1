//! Drives the vertical and horizontal 1-D passes per resolution level over
//! a tile's full (non-windowed) sample buffer (spec §4.4).
//!
//! The 5/3 and 9/7 drivers differ only in their lifting kernels, so this
//! module expresses them with the small capability set Design Note (§9,
//! "Polymorphism over filter family") asks for: a [`FilterKernels`] impl
//! per filter family, with no dynamic dispatch on the hot path.
//!
//! Quad layout per level `r`: the `rw x rh` rectangle of resolution `r`
//! decomposes into a top-left `rw1 x rh1` LL quad (resolution `r-1`'s
//! output), a top-right HL quad, a bottom-left LH quad, and a bottom-right
//! HH quad — the standard dyadic subband layout real code-block decode
//! scatters samples into directly.
//!
//! Both passes fan out through [`WorkerPool`] (spec §4.8): the vertical
//! pass transposes into a column-major scratch buffer so that a column
//! stripe is a contiguous slice, then runs the lifting in place; the
//! horizontal pass works directly on row-major scratch, where a row stripe
//! is already contiguous.

use crate::geometry::{parity, Resolution};
use crate::lifting53;
use crate::lifting97;
use crate::pool::{WorkerPool, HORIZONTAL_THRESHOLD, VERTICAL_THRESHOLD};

/// Capability set distinguishing the 5/3 and 9/7 drivers (spec §9).
pub trait FilterKernels {
  type Sample: Copy + Default + Send + Sync;

  fn filter_width() -> u32;

  /// Inverse 1-D pass: interleaves `low`/`high` (by `cas`) into `out`.
  fn inverse_row(low: &[Self::Sample], high: &[Self::Sample], cas: u32, out: &mut [Self::Sample]);

  /// Interleaves `low`/`high` into `out` without transforming (the first
  /// half of [`Self::inverse_row`], exposed so callers can run the lifting
  /// step itself in place afterwards).
  fn interleave_row(low: &[Self::Sample], high: &[Self::Sample], cas: u32, out: &mut [Self::Sample]);

  /// In-place inverse lifting of an already-interleaved buffer of `sn + dn`
  /// samples.
  fn inverse_in_place(buf: &mut [Self::Sample], sn: usize, dn: usize, cas: u32);

  /// Forward 1-D pass: deinterleaves `x` into `out` (first `sn` low-pass,
  /// then `dn` high-pass samples).
  fn forward_row(x: &[Self::Sample], even: bool, out: &mut [Self::Sample]);

  /// Bit-reinterprets a sample as the `i32` a [`crate::sparse_array::SparseArray`]
  /// stores (spec §9 "Reinterpreting float as int"); identity for
  /// `Reversible53`.
  fn to_bits(v: Self::Sample) -> i32;

  /// Inverse of [`Self::to_bits`].
  fn from_bits(bits: i32) -> Self::Sample;
}

pub struct Reversible53;

impl FilterKernels for Reversible53 {
  type Sample = i32;

  fn filter_width() -> u32 {
    2
  }

  fn inverse_row(low: &[i32], high: &[i32], cas: u32, out: &mut [i32]) {
    lifting53::inverse_53_fused(low, high, cas, out);
  }

  fn interleave_row(low: &[i32], high: &[i32], cas: u32, out: &mut [i32]) {
    lifting53::interleave(low, high, cas, out);
  }

  fn inverse_in_place(buf: &mut [i32], sn: usize, dn: usize, cas: u32) {
    lifting53::inverse_53_in_place(buf, sn, dn, cas);
  }

  fn forward_row(x: &[i32], even: bool, out: &mut [i32]) {
    lifting53::forward_53_row(x, even, out);
  }

  fn to_bits(v: i32) -> i32 {
    v
  }

  fn from_bits(bits: i32) -> i32 {
    bits
  }
}

pub struct Irreversible97;

impl FilterKernels for Irreversible97 {
  type Sample = f32;

  fn filter_width() -> u32 {
    4
  }

  fn inverse_row(low: &[f32], high: &[f32], cas: u32, out: &mut [f32]) {
    lifting97::inverse_97_fused(low, high, cas, out);
  }

  fn interleave_row(low: &[f32], high: &[f32], cas: u32, out: &mut [f32]) {
    lifting97::interleave(low, high, cas, out);
  }

  fn inverse_in_place(buf: &mut [f32], sn: usize, dn: usize, cas: u32) {
    lifting97::inverse_97_in_place(buf, sn, dn, cas);
  }

  fn forward_row(x: &[f32], even: bool, out: &mut [f32]) {
    lifting97::forward_97_row(x, even, out);
  }

  fn to_bits(v: f32) -> i32 {
    v.to_bits() as i32
  }

  fn from_bits(bits: i32) -> f32 {
    f32::from_bits(bits as u32)
  }
}

fn gather_column<T: Copy>(data: &[T], stride: usize, x: usize, y0: usize, len: usize) -> Vec<T> {
  (0..len).map(|i| data[(y0 + i) * stride + x]).collect()
}

fn scatter_column<T: Copy>(data: &mut [T], stride: usize, x: usize, y0: usize, values: &[T]) {
  for (i, &v) in values.iter().enumerate() {
    data[(y0 + i) * stride + x] = v;
  }
}

/// Full (non-windowed) inverse transform over `data` (stride = `stride`,
/// resolution rects tile-local and 0-based) driven by `resolutions`.
pub fn decode<K: FilterKernels>(data: &mut [K::Sample], stride: usize, resolutions: &[Resolution], pool: &WorkerPool) {
  for r in 1..resolutions.len() {
    let prev = &resolutions[r - 1];
    let cur = &resolutions[r];
    let rw1 = prev.rect.width() as usize;
    let rh1 = prev.rect.height() as usize;
    let rw = cur.rect.width() as usize;
    let rh = cur.rect.height() as usize;
    if rw == 0 || rh == 0 {
      continue;
    }
    let cas_x = parity(cur.rect.x0);
    let cas_y = parity(cur.rect.y0);

    // Vertical pass: interleave each column into a column-major scratch
    // buffer (column = contiguous `rh`-length slice), then fan the in-place
    // lifting out over column stripes.
    let mut col_major = vec![K::Sample::default(); rw * rh];
    for x in 0..rw {
      let low = gather_column(data, stride, x, 0, rh1);
      let high = gather_column(data, stride, x, rh1, rh - rh1);
      K::interleave_row(&low, &high, cas_y, &mut col_major[x * rh..(x + 1) * rh]);
    }
    pool.for_each_mut_stripe(&mut col_major, rh, VERTICAL_THRESHOLD, |chunk| {
      for col in chunk.chunks_mut(rh) {
        K::inverse_in_place(col, rh1, rh - rh1, cas_y);
      }
    });

    // Transpose into row-major and interleave each row; a row stripe is
    // already contiguous, so the horizontal lifting fans out directly.
    let mut row_major = vec![K::Sample::default(); rw * rh];
    for x in 0..rw {
      for y in 0..rh {
        row_major[y * rw + x] = col_major[x * rh + y];
      }
    }
    let mut row_interleaved = vec![K::Sample::default(); rw * rh];
    for y in 0..rh {
      let row = &row_major[y * rw..(y + 1) * rw];
      K::interleave_row(&row[0..rw1], &row[rw1..rw], cas_x, &mut row_interleaved[y * rw..(y + 1) * rw]);
    }
    pool.for_each_mut_stripe(&mut row_interleaved, rw, HORIZONTAL_THRESHOLD, |chunk| {
      for row in chunk.chunks_mut(rw) {
        K::inverse_in_place(row, rw1, rw - rw1, cas_x);
      }
    });

    for y in 0..rh {
      data[y * stride..y * stride + rw].copy_from_slice(&row_interleaved[y * rw..(y + 1) * rw]);
    }
  }
}

/// Full forward transform over `data`, finest resolution first (spec §2
/// "Forward path mirrors this... highest -> lowest").
pub fn encode<K: FilterKernels>(data: &mut [K::Sample], stride: usize, resolutions: &[Resolution], pool: &WorkerPool) {
  for r in (1..resolutions.len()).rev() {
    let prev = &resolutions[r - 1];
    let cur = &resolutions[r];
    let rw1 = prev.rect.width() as usize;
    let rh1 = prev.rect.height() as usize;
    let rw = cur.rect.width() as usize;
    let rh = cur.rect.height() as usize;
    if rw == 0 || rh == 0 {
      continue;
    }
    let cas_x = parity(cur.rect.x0);
    let cas_y = parity(cur.rect.y0);
    let even_x = cas_x == 0;
    let even_y = cas_y == 0;

    // Horizontal pass first: gather rows (row-major, contiguous) and fan
    // the forward transform out over row stripes.
    let mut row_in = vec![K::Sample::default(); rw * rh];
    for y in 0..rh {
      row_in[y * rw..(y + 1) * rw].copy_from_slice(&data[y * stride..y * stride + rw]);
    }
    let mut horiz = vec![K::Sample::default(); rw * rh];
    pool.for_each_stripe_io(&row_in, &mut horiz, rw, HORIZONTAL_THRESHOLD, |in_chunk, out_chunk| {
      for (row_in, row_out) in in_chunk.chunks(rw).zip(out_chunk.chunks_mut(rw)) {
        K::forward_row(row_in, even_x, row_out);
      }
    });

    // Transpose into column-major, then fan the vertical forward pass out
    // over column stripes.
    let mut col_in = vec![K::Sample::default(); rw * rh];
    for y in 0..rh {
      for x in 0..rw {
        col_in[x * rh + y] = horiz[y * rw + x];
      }
    }
    let mut col_out = vec![K::Sample::default(); rw * rh];
    pool.for_each_stripe_io(&col_in, &mut col_out, rh, VERTICAL_THRESHOLD, |in_chunk, out_chunk| {
      for (col_in, col_out) in in_chunk.chunks(rh).zip(out_chunk.chunks_mut(rh)) {
        K::forward_row(col_in, even_y, col_out);
      }
    });

    for x in 0..rw {
      let (low, high) = col_out[x * rh..(x + 1) * rh].split_at(rh1);
      scatter_column(data, stride, x, 0, low);
      scatter_column(data, stride, x, rh1, high);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::geometry::{Rect, Resolution as Res};

  fn resolutions_for(width: u32, height: u32, num_resolutions: u32) -> Vec<Res> {
    let tile = Rect::new(0, 0, width, height);
    (0..num_resolutions).map(|r| Res::for_level(tile, r, num_resolutions)).collect()
  }

  #[test]
  fn constant_tile_round_trips_through_full_pyramid() {
    // Scenario 1 from spec §8: 16x16 tile filled with 1000, R=3.
    let width = 16u32;
    let height = 16u32;
    let num_resolutions = 3;
    let resolutions = resolutions_for(width, height, num_resolutions);
    let original = vec![1000i32; (width * height) as usize];
    let pool = WorkerPool::new(true);

    let mut data = original.clone();
    encode::<Reversible53>(&mut data, width as usize, &resolutions, &pool);
    decode::<Reversible53>(&mut data, width as usize, &resolutions, &pool);
    assert_eq!(data, original);
  }

  #[test]
  fn varied_tile_round_trips_through_full_pyramid() {
    let width = 32u32;
    let height = 32u32;
    let num_resolutions = 4;
    let resolutions = resolutions_for(width, height, num_resolutions);
    let original: Vec<i32> = (0..(width * height) as i32).map(|i| (i % 257) - 128).collect();
    // Tile is large enough to exercise the parallel fan-out path.
    let pool = WorkerPool::new(false);

    let mut data = original.clone();
    encode::<Reversible53>(&mut data, width as usize, &resolutions, &pool);
    decode::<Reversible53>(&mut data, width as usize, &resolutions, &pool);
    assert_eq!(data, original);
  }

  #[test]
  fn irreversible_round_trip_is_bounded() {
    let width = 16u32;
    let height = 16u32;
    let num_resolutions = 3;
    let resolutions = resolutions_for(width, height, num_resolutions);
    let original: Vec<f32> = (0..(width * height) as i32).map(|i| ((i % 200) as f32 / 100.0) - 1.0).collect();
    let pool = WorkerPool::new(true);

    let mut data = original.clone();
    encode::<Irreversible97>(&mut data, width as usize, &resolutions, &pool);
    decode::<Irreversible97>(&mut data, width as usize, &resolutions, &pool);
    let max_err = original.iter().zip(data.iter()).map(|(a, b)| (a - b).abs()).fold(0.0f32, f32::max);
    assert!(max_err < 1e-3, "max_err={max_err}");
  }

  #[test]
  fn zero_ll_tile_decodes_to_all_zeros() {
    // Scenario 3 from spec §8: 9/7 inverse on an all-zero LL tile, R=2.
    let width = 16u32;
    let height = 16u32;
    let resolutions = resolutions_for(width, height, 2);
    let pool = WorkerPool::new(true);
    let mut data = vec![0.0f32; (width * height) as usize];
    decode::<Irreversible97>(&mut data, width as usize, &resolutions, &pool);
    assert!(data.iter().all(|&v| v == 0.0));
  }
}
