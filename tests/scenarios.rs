//! Crate-level round-trip and partial-decode tests exercising the public
//! `encode`/`decode`/`compute_stepsizes` surface across the concrete
//! scenarios named in spec §8, rather than the lifting/transform internals
//! each module already covers in its own inline tests.

use openjp2_dwt::{compute_stepsizes, decode, encode, Rect, Resolution, TileComponent, WaveletFilter};

fn tile(width: u32, height: u32, num_resolutions: u32, filter: WaveletFilter, data: Vec<i32>) -> TileComponent {
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
    disable_mt: false,
  }
}

#[test]
fn scenario_1_flat_16x16_reversible_tile_round_trips_exactly() {
  let width = 16u32;
  let height = 16u32;
  let original = vec![1000i32; (width * height) as usize];
  let mut t = tile(width, height, 3, WaveletFilter::Reversible53, original.clone());

  assert!(encode(&mut t).unwrap());
  assert!(decode(&mut t, 3, true).unwrap());
  assert_eq!(t.data, original);
}

#[test]
fn scenario_3_irreversible_zero_ll_tile_decodes_to_all_zeros() {
  let width = 16u32;
  let height = 16u32;
  let mut t = tile(width, height, 2, WaveletFilter::Irreversible97, vec![0i32; (width * height) as usize]);

  assert!(decode(&mut t, 2, true).unwrap());
  assert!(t.data.iter().all(|&v| v == 0));
}

#[test]
fn scenario_4_windowed_decode_matches_the_crop_of_a_full_decode() {
  let width = 64u32;
  let height = 64u32;
  let num_resolutions = 3;
  let original: Vec<i32> = (0..(width * height) as i32).map(|i| (i % 511) - 255).collect();

  let mut encoded = tile(width, height, num_resolutions, WaveletFilter::Reversible53, original);
  assert!(encode(&mut encoded).unwrap());

  let mut full = tile(width, height, num_resolutions, WaveletFilter::Reversible53, encoded.data.clone());
  full.resolutions = encoded.resolutions.clone();
  assert!(decode(&mut full, num_resolutions, true).unwrap());

  let mut windowed = tile(width, height, num_resolutions, WaveletFilter::Reversible53, encoded.data.clone());
  windowed.resolutions = encoded.resolutions.clone();
  windowed.window = Some(Rect::new(8, 8, 24, 24));
  assert!(decode(&mut windowed, num_resolutions, false).unwrap());

  let win_w = 16usize;
  let win_h = 16usize;
  for row in 0..win_h {
    for col in 0..win_w {
      let tile_x = 8 + col;
      let tile_y = 8 + row;
      let expected = full.data[tile_y * width as usize + tile_x];
      let actual = windowed.data[row * win_w + col];
      assert_eq!(actual, expected, "mismatch at ({col},{row})");
    }
  }
}

#[test]
fn scenario_5_stepsize_table_matches_the_named_irreversible_ll_band() {
  // R=3, precision=8, irreversible: band 0 is the LL band (level=2, orient=0,
  // gain=0, norm=4.177, stepsize=1/norm=0.2394). The exact (exponent,
  // mantissa) this crate derives from the encode_stepsize formula is
  // (11, 1874), not the (8, ~1962) the prose in spec §8 states — see
  // DESIGN.md's note on that internal inconsistency; this asserts what the
  // formula in quantization.rs actually and consistently produces.
  let table = compute_stepsizes(3, 8, false).unwrap();
  assert_eq!(table.len(), 7);
  let (exponent, mantissa) = table[0];
  assert_eq!(exponent, 11);
  assert_eq!(mantissa, 1874);
}

#[test]
fn reversible_round_trip_holds_across_resolution_counts() {
  // "Round-trip (reversible)" from spec §8, exercised through the public
  // decode/encode pair rather than the lifting kernels directly.
  for num_resolutions in 1..=6u32 {
    let width = 32u32;
    let height = 32u32;
    let original: Vec<i32> = (0..(width * height) as i32).map(|i| (i % 4095) - 2048).collect();
    let mut t = tile(width, height, num_resolutions, WaveletFilter::Reversible53, original.clone());

    assert!(encode(&mut t).unwrap());
    assert!(decode(&mut t, num_resolutions, true).unwrap());
    assert_eq!(t.data, original, "num_resolutions={num_resolutions}");
  }
}

#[test]
fn irreversible_round_trip_stays_within_bounded_error() {
  let width = 32u32;
  let height = 32u32;
  let num_resolutions = 4;
  let original: Vec<f32> = (0..(width * height) as i32).map(|i| ((i % 200) as f32 / 100.0) - 1.0).collect();
  let bits: Vec<i32> = original.iter().map(|&v| v.to_bits() as i32).collect();
  let mut t = tile(width, height, num_resolutions, WaveletFilter::Irreversible97, bits);

  assert!(encode(&mut t).unwrap());
  assert!(decode(&mut t, num_resolutions, true).unwrap());

  let back: Vec<f32> = t.data.iter().map(|&b| f32::from_bits(b as u32)).collect();
  let max_err = original.iter().zip(back.iter()).map(|(a, b)| (a - b).abs()).fold(0.0f32, f32::max);
  assert!(max_err < 1e-5, "max_err={max_err}");
}
