//! Windowed inverse transform over a sparse coefficient store (spec §4.5).
//!
//! Walks the resolution pyramid low -> high. At each level, the window of
//! interest is grown outward by the active filter's half-width
//! (`segment_grow`, spec §4.5 step 2) so every sample the next level's
//! lifting needs is already resident, then the same vertical/horizontal
//! lifting schedule `Transform2D` uses runs restricted to that window,
//! reading and writing through [`SparseArray`] instead of a flat tile
//! buffer — the data source a real decoder has only partially populated
//! (only the code-blocks needed for the window of interest are entropy
//! decoded in the first place).

use crate::error::DwtResult;
use crate::geometry::{parity, segment_grow, Rect, Resolution, SubBandOrientation};
use crate::sparse_array::SparseArray;
use crate::transform2d::FilterKernels;

/// Combines a "low" window (the previous resolution's already-reconstructed
/// extent) and a "high" window (one detail band's grown extent) into the
/// target resolution's window along one axis, in the *interleaved*
/// coordinate space the reconstructed resolution occupies once both lifting
/// passes have run (spec §4.5 step 3). This is the window carried forward
/// as next level's low window; it is not a valid index range into the
/// de-interleaved quad layout `SparseArray` stores coefficients in at the
/// *current* level — see the column/row set construction in
/// `decode_window` for that.
fn combine_axis(low_lo: u32, low_hi: u32, high_lo: u32, high_hi: u32, cas: u32, extent: u32) -> (u32, u32) {
  let lo = (2 * low_lo + u32::from(cas != 0)).min(2 * high_lo + u32::from(cas == 0));
  let hi = (2 * low_hi).max(2 * high_hi + 1).min(extent);
  (lo, hi)
}

/// Maps `window` into `band`'s subband coordinates at resolution `r` and
/// grows the result by `margin`, clamped to that band's full extent within
/// the tile (spec §4.5 steps 1-2).
fn grown_band_window(tile_rect: Rect, window: Rect, r: u32, num_resolutions: u32, band: SubBandOrientation, margin: u32) -> Rect {
  let local = crate::geometry::band_rect_from_tile(window, r, num_resolutions, band);
  let extent = crate::geometry::band_rect_from_tile(tile_rect, r, num_resolutions, band);
  let (x0, x1) = segment_grow(local.x0, local.x1, margin, extent.x1);
  let (y0, y1) = segment_grow(local.y0, local.y1, margin, extent.y1);
  Rect::new(x0, y0, x1, y1)
}

/// Inverse-transforms only the samples needed to reconstruct `window` (in
/// tile coordinates). `sparse` must already hold every code-block
/// coefficient the window (grown by each level's filter margin) touches;
/// the reconstructed pyramid is written back into `sparse` in place, and
/// the final window is read out and returned.
pub fn decode_window<K: FilterKernels>(sparse: &mut SparseArray, tile_rect: Rect, resolutions: &[Resolution], window: Rect) -> DwtResult<Vec<K::Sample>> {
  let num_resolutions = resolutions.len() as u32;
  let margin = K::filter_width();

  let ll_extent = crate::geometry::band_rect_from_tile(tile_rect, 0, num_resolutions, SubBandOrientation::LL);
  let ll_local = crate::geometry::band_rect_from_tile(window, 0, num_resolutions, SubBandOrientation::LL);
  let (x0, x1) = segment_grow(ll_local.x0, ll_local.x1, margin, ll_extent.x1);
  let (y0, y1) = segment_grow(ll_local.y0, ll_local.y1, margin, ll_extent.y1);
  let mut prev_window = Rect::new(x0, y0, x1, y1);

  for r in 1..resolutions.len() {
    let prev = &resolutions[r - 1];
    let cur = &resolutions[r];
    let rw1 = prev.rect.width();
    let rh1 = prev.rect.height();
    let rw = cur.rect.width();
    let rh = cur.rect.height();
    if rw == 0 || rh == 0 {
      continue;
    }
    let cas_x = parity(cur.rect.x0);
    let cas_y = parity(cur.rect.y0);

    let hl = grown_band_window(tile_rect, window, r as u32, num_resolutions, SubBandOrientation::HL, margin);
    let lh = grown_band_window(tile_rect, window, r as u32, num_resolutions, SubBandOrientation::LH, margin);

    // Quad-space column set touched by the vertical pass: the low columns
    // carried over as-is from `prev_window` (already within `0..rw1`) and
    // the HL band's grown columns, shifted into its own quadrant
    // `rw1..rw`. These are two disjoint ranges in the de-interleaved quad
    // layout `SparseArray`/`Transform2D` use, not one contiguous range —
    // `combine_axis`'s doubling formula describes the *interleaved*
    // target window, which a single range cannot stand in for here.
    let low_x0 = prev_window.x0.min(rw1);
    let low_x1 = prev_window.x1.min(rw1);
    let high_x0 = (rw1 + hl.x0).min(rw);
    let high_x1 = (rw1 + hl.x1).min(rw);

    // Vertical pass: combine rows for every quad-space column in either
    // range, reading the full LL/LH row extent (a column's low/high split
    // never shrinks with the window, only which columns we bother
    // visiting does).
    for x in (low_x0..low_x1).chain(high_x0..high_x1) {
      let low = read_run(sparse, x, 0, rh1)?;
      let high = read_run(sparse, x, rh1, rh)?;
      let low_s: Vec<K::Sample> = low.iter().map(|&b| K::from_bits(b)).collect();
      let high_s: Vec<K::Sample> = high.iter().map(|&b| K::from_bits(b)).collect();
      let mut out = vec![K::Sample::default(); rh as usize];
      K::inverse_row(&low_s, &high_s, cas_y, &mut out);
      let out_bits: Vec<i32> = out.iter().map(|&v| K::to_bits(v)).collect();
      sparse.write(x, 0, x + 1, rh, &out_bits, 1, false)?;
    }

    // Quad-space row set touched by the horizontal pass: the mirror of the
    // column set above, along Y using the LH band instead of HL.
    let low_y0 = prev_window.y0.min(rh1);
    let low_y1 = prev_window.y1.min(rh1);
    let high_y0 = (rh1 + lh.y0).min(rh);
    let high_y1 = (rh1 + lh.y1).min(rh);

    // Horizontal pass: combine columns for every quad-space row in either
    // range.
    for y in (low_y0..low_y1).chain(high_y0..high_y1) {
      let low = read_run_horizontal(sparse, y, 0, rw1)?;
      let high = read_run_horizontal(sparse, y, rw1, rw)?;
      let low_s: Vec<K::Sample> = low.iter().map(|&b| K::from_bits(b)).collect();
      let high_s: Vec<K::Sample> = high.iter().map(|&b| K::from_bits(b)).collect();
      let mut out = vec![K::Sample::default(); rw as usize];
      K::inverse_row(&low_s, &high_s, cas_x, &mut out);
      let out_bits: Vec<i32> = out.iter().map(|&v| K::to_bits(v)).collect();
      sparse.write(0, y, rw, y + 1, &out_bits, rw.max(1) as usize, false)?;
    }

    let (tr_x0, tr_x1) = combine_axis(prev_window.x0, prev_window.x1, hl.x0, hl.x1, cas_x, rw);
    let (tr_y0, tr_y1) = combine_axis(prev_window.y0, prev_window.y1, lh.y0, lh.y1, cas_y, rh);
    prev_window = Rect::new(tr_x0, tr_y0, tr_x1, tr_y1);
  }

  let win_w = window.width() as usize;
  let win_h = window.height() as usize;
  let mut bits = vec![0i32; win_w * win_h];
  sparse.read(window.x0, window.y0, window.x1, window.y1, &mut bits, win_w, false)?;
  Ok(bits.iter().map(|&b| K::from_bits(b)).collect())
}

fn read_run(sparse: &SparseArray, x: u32, y0: u32, y1: u32) -> DwtResult<Vec<i32>> {
  if y1 <= y0 {
    return Ok(Vec::new());
  }
  let mut buf = vec![0i32; (y1 - y0) as usize];
  sparse.read(x, y0, x + 1, y1, &mut buf, 1, false)?;
  Ok(buf)
}

fn read_run_horizontal(sparse: &SparseArray, y: u32, x0: u32, x1: u32) -> DwtResult<Vec<i32>> {
  if x1 <= x0 {
    return Ok(Vec::new());
  }
  let mut buf = vec![0i32; (x1 - x0) as usize];
  sparse.read(x0, y, x1, y + 1, &mut buf, (x1 - x0) as usize, false)?;
  Ok(buf)
}
