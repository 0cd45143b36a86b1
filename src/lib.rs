//! Forward/inverse discrete wavelet transform engine for a JPEG 2000 codec:
//! 5/3 reversible integer lifting, 9/7 irreversible float lifting, the
//! resolution pyramid, windowed partial decode, parallel column/row passes,
//! a sparse coefficient store, and quantization step-size derivation.
//!
//! Codestream parsing, entropy coding, tile lifecycle, color transform,
//! ICC, and I/O are out of scope; callers populate a [`TileComponent`] with
//! already-decoded band coefficients and call [`decode`]/[`encode`].

mod error;
mod geometry;
mod lifting53;
mod lifting97;
mod math;
mod partial;
mod pool;
mod quantization;
mod sparse_array;
mod transform2d;

pub use error::{DwtError, DwtResult};
pub use geometry::{Rect, Resolution, SubBand, SubBandOrientation, TileComponent, WaveletFilter};
pub use quantization::StepSize;
pub use sparse_array::SparseArray;

use pool::WorkerPool;
use transform2d::{Irreversible97, Reversible53};

/// Full or windowed inverse DWT over `tile` (spec §6.2). `num_resolutions`
/// must match `tile.resolutions.len()`; `whole_tile` forces a full decode
/// even when `tile.window` is set. 5/3 vs. 9/7 is chosen by `tile.filter`.
///
/// Degenerate tiles (a single resolution) short-circuit to an identity
/// result rather than erroring (spec §7 "Degenerate resolution").
pub fn decode(tile: &mut TileComponent, num_resolutions: u32, whole_tile: bool) -> DwtResult<bool> {
  if num_resolutions <= 1 || tile.resolutions.len() <= 1 {
    log::debug!("degenerate resolution (num_resolutions={num_resolutions}): decode is an identity");
    return Ok(true);
  }
  let pool = WorkerPool::new(tile.disable_mt);
  let width = tile.width() as usize;
  let height = tile.height() as usize;

  if whole_tile || tile.window.is_none() {
    match tile.filter {
      WaveletFilter::Reversible53 => transform2d::decode::<Reversible53>(&mut tile.data, width, &tile.resolutions, &pool),
      WaveletFilter::Irreversible97 => {
        let mut samples = sparse_array::as_f32(&tile.data);
        transform2d::decode::<Irreversible97>(&mut samples, width, &tile.resolutions, &pool);
        tile.data = sparse_array::as_i32(&samples);
      }
    }
    return Ok(true);
  }

  let window = tile.window.expect("checked above");
  let tile_rect = tile.rect();
  let block_w = width.min(64).max(1) as u32;
  let block_h = height.min(64).max(1) as u32;
  let mut sparse = SparseArray::new(width as u32, height as u32, block_w, block_h)?;
  for y in 0..height as u32 {
    let row = &tile.data[(y as usize) * width..(y as usize) * width + width];
    sparse.write(0, y, width as u32, y + 1, row, width, false)?;
  }

  let out: Vec<i32> = match tile.filter {
    WaveletFilter::Reversible53 => partial::decode_window::<Reversible53>(&mut sparse, tile_rect, &tile.resolutions, window)?,
    WaveletFilter::Irreversible97 => {
      let samples = partial::decode_window::<Irreversible97>(&mut sparse, tile_rect, &tile.resolutions, window)?;
      sparse_array::as_i32(&samples)
    }
  };
  tile.data = out;
  Ok(true)
}

/// Full forward DWT over `tile` (spec §6.2), finest resolution first.
pub fn encode(tile: &mut TileComponent) -> DwtResult<bool> {
  if tile.resolutions.len() <= 1 {
    log::debug!("degenerate resolution (resolutions={}): encode is an identity", tile.resolutions.len());
    return Ok(true);
  }
  let pool = WorkerPool::new(tile.disable_mt);
  let width = tile.width() as usize;

  match tile.filter {
    WaveletFilter::Reversible53 => transform2d::encode::<Reversible53>(&mut tile.data, width, &tile.resolutions, &pool),
    WaveletFilter::Irreversible97 => {
      let mut samples = sparse_array::as_f32(&tile.data);
      transform2d::encode::<Irreversible97>(&mut samples, width, &tile.resolutions, &pool);
      tile.data = sparse_array::as_i32(&samples);
    }
  }
  Ok(true)
}

/// Quantization step-size table for `num_resolutions` resolution levels
/// (spec §6.2 `compute_stepsizes`): one `(exponent, mantissa)` pair for each
/// of the `3*num_resolutions - 2` subbands.
pub fn compute_stepsizes(num_resolutions: u32, precision: i32, reversible: bool) -> DwtResult<Vec<(i32, i32)>> {
  Ok(
    quantization::compute_stepsizes(num_resolutions, precision, reversible)
      .into_iter()
      .map(|s| (s.exponent, s.mantissa))
      .collect(),
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  fn tile_component(width: u32, height: u32, num_resolutions: u32, filter: WaveletFilter, data: Vec<i32>) -> TileComponent {
    let tile_rect = Rect::new(0, 0, width, height);
    let resolutions = (0..num_resolutions).map(|r| Resolution::for_level(tile_rect, r, num_resolutions)).collect();
    TileComponent {
      x0: 0,
      y0: 0,
      x1: width,
      y1: height,
      num_resolutions,
      filter,
      data,
      window: None,
      resolutions,
      signed: true,
      disable_mt: true,
    }
  }

  #[test]
  fn full_round_trip_through_the_public_api() {
    let width = 16u32;
    let height = 16u32;
    let original = vec![1000i32; (width * height) as usize];
    let mut tile = tile_component(width, height, 3, WaveletFilter::Reversible53, original.clone());

    assert!(encode(&mut tile).unwrap());
    assert!(decode(&mut tile, 3, true).unwrap());
    assert_eq!(tile.data, original);
  }

  #[test]
  fn single_resolution_tile_is_an_identity_decode() {
    let mut tile = tile_component(8, 8, 1, WaveletFilter::Reversible53, vec![42i32; 64]);
    let before = tile.data.clone();
    assert!(decode(&mut tile, 1, true).unwrap());
    assert_eq!(tile.data, before);
  }

  #[test]
  fn windowed_decode_produces_a_window_sized_output() {
    let width = 32u32;
    let height = 32u32;
    let original: Vec<i32> = (0..(width * height) as i32).map(|i| (i % 200) - 100).collect();
    let mut tile = tile_component(width, height, 3, WaveletFilter::Reversible53, original);

    assert!(encode(&mut tile).unwrap());
    tile.window = Some(Rect::new(4, 4, 12, 12));
    assert!(decode(&mut tile, 3, false).unwrap());
    assert_eq!(tile.data.len(), 8 * 8);
  }

  #[test]
  fn stepsize_table_has_three_r_minus_two_bands() {
    let table = compute_stepsizes(4, 8, false).unwrap();
    assert_eq!(table.len(), 10);
  }
}
