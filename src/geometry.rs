//! Per-resolution / per-band coordinate geometry (spec §3 "Resolution",
//! §6.1 "Band Coordinate Mapping").
//!
//! Grounded on `opj_tcd_is_subband_area_of_interest` in the teacher's
//! `tcd.rs`, which computes exactly this mapping (`nb`, `x0b`/`y0b`,
//! `ceildivpow2`) inline at each call site; here it is a standalone,
//! independently testable function instead.

use crate::math::ceildiv_pow2_u32;

/// An axis-aligned half-open rectangle in some coordinate space (tile,
/// resolution, or subband, depending on context).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
  pub x0: u32,
  pub y0: u32,
  pub x1: u32,
  pub y1: u32,
}

impl Rect {
  pub fn new(x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
    Self { x0, y0, x1, y1 }
  }

  #[inline]
  pub fn width(&self) -> u32 {
    self.x1.saturating_sub(self.x0)
  }

  #[inline]
  pub fn height(&self) -> u32 {
    self.y1.saturating_sub(self.y0)
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.width() == 0 || self.height() == 0
  }

  /// Intersection; empty (all-zero width/height at x0=y0=0) if disjoint.
  pub fn intersect(&self, other: &Rect) -> Rect {
    let x0 = self.x0.max(other.x0);
    let y0 = self.y0.max(other.y0);
    let x1 = self.x1.min(other.x1).max(x0);
    let y1 = self.y1.min(other.y1).max(y0);
    Rect { x0, y0, x1, y1 }
  }
}

/// Which corner of the 2x2 decomposition quadrant a subband occupies.
/// `LL` only exists at resolution 0; `HL`/`LH`/`HH` exist at every
/// resolution `r >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubBandOrientation {
  LL,
  HL,
  LH,
  HH,
}

impl SubBandOrientation {
  /// The `b` parameter of the band-coordinate mapping in spec §6.1:
  /// 0 for LL, 1/2/3 for HL/LH/HH. Matches the teacher's
  /// `band.bandno = bandno + 1` convention in `tcd.rs`.
  fn quadrant_index(self) -> u32 {
    match self {
      SubBandOrientation::LL => 0,
      SubBandOrientation::HL => 1,
      SubBandOrientation::LH => 2,
      SubBandOrientation::HH => 3,
    }
  }

  /// Index into `Resolution::bands` for `r >= 1` (HL=0, LH=1, HH=2), as
  /// used throughout `PartialTransform` (spec §4.5).
  pub fn band_array_index(self) -> usize {
    match self {
      SubBandOrientation::HL => 0,
      SubBandOrientation::LH => 1,
      SubBandOrientation::HH => 2,
      SubBandOrientation::LL => panic!("LL has no entry in Resolution::bands"),
    }
  }
}

/// A subband of a resolution level: its orientation and tile-coordinate
/// rectangle.
#[derive(Debug, Clone, Copy)]
pub struct SubBand {
  pub orientation: SubBandOrientation,
  pub rect: Rect,
}

/// One resolution level of the pyramid (spec §3 "Resolution").
#[derive(Debug, Clone)]
pub struct Resolution {
  /// Rectangle of this resolution in tile coordinates.
  pub rect: Rect,
  /// `HL, LH, HH` for `level >= 1`; empty for resolution 0 (LL-only).
  pub bands: Vec<SubBand>,
  /// Number of remaining decompositions at this level (spec §6.1),
  /// precomputed once per resolution rather than recomputed at each band
  /// lookup, matching `opj_tcd_is_subband_area_of_interest` in the teacher's
  /// `tcd.rs` (SPEC_FULL §3).
  pub nb: u32,
}

impl Resolution {
  /// Builds a resolution level's rectangle, precomputed `nb`, and (for
  /// `r >= 1`) its three subbands, all derived from the tile rectangle.
  pub fn for_level(tile_rect: Rect, r: u32, num_resolutions: u32) -> Self {
    let rect = resolution_rect(tile_rect, r, num_resolutions);
    let nb = decompositions_remaining(r, num_resolutions);
    let bands = if r == 0 {
      Vec::new()
    } else {
      vec![
        SubBand { orientation: SubBandOrientation::HL, rect: band_rect_from_tile(tile_rect, r, num_resolutions, SubBandOrientation::HL) },
        SubBand { orientation: SubBandOrientation::LH, rect: band_rect_from_tile(tile_rect, r, num_resolutions, SubBandOrientation::LH) },
        SubBand { orientation: SubBandOrientation::HH, rect: band_rect_from_tile(tile_rect, r, num_resolutions, SubBandOrientation::HH) },
      ]
    };
    Resolution { rect, bands, nb }
  }
}

/// Number of remaining decompositions `nb` for a given resolution (spec
/// §6.1): `R-1` at `r=0`, `R-r` otherwise.
#[inline]
pub fn decompositions_remaining(r: u32, num_resolutions: u32) -> u32 {
  if r == 0 {
    num_resolutions.saturating_sub(1)
  } else {
    num_resolutions.saturating_sub(r)
  }
}

/// Maps one tile-coordinate endpoint to its subband-coordinate value, per
/// spec §6.1 equation B-15: `nb=0` is a pass-through, otherwise a clamped
/// ceil-divide-by-power-of-two.
pub fn map_band_coord(c: u32, nb: u32, offset: u32) -> u32 {
  if nb == 0 {
    return c;
  }
  let threshold = (1u32 << (nb - 1)).saturating_mul(offset);
  if c <= threshold {
    0
  } else {
    ceildiv_pow2_u32(c - threshold, nb)
  }
}

/// Size of the full reconstruction at resolution level `r` (distinct from
/// a single band's `nb` in [`decompositions_remaining`]: resolution `r`'s
/// reconstruction is twice the size of resolution `r-1`'s, while the bands
/// that combine with resolution `r-1` to produce it share resolution
/// `r-1`'s size). `nb = (R-1) - r`.
#[inline]
fn resolution_nb(r: u32, num_resolutions: u32) -> u32 {
  num_resolutions.saturating_sub(1).saturating_sub(r)
}

/// The tile-coordinate rectangle spanned by resolution level `r`'s full
/// reconstruction (LL only at `r=0`; the whole tile at `r=R-1`).
pub fn resolution_rect(tile_rect: Rect, r: u32, num_resolutions: u32) -> Rect {
  let nb = resolution_nb(r, num_resolutions);
  Rect {
    x0: map_band_coord(tile_rect.x0, nb, 0),
    y0: map_band_coord(tile_rect.y0, nb, 0),
    x1: map_band_coord(tile_rect.x1, nb, 0),
    y1: map_band_coord(tile_rect.y1, nb, 0),
  }
}

/// Maps a tile-coordinate rectangle into the coordinate space of a given
/// subband at resolution `r`.
pub fn band_rect_from_tile(tile_rect: Rect, r: u32, num_resolutions: u32, band: SubBandOrientation) -> Rect {
  let nb = decompositions_remaining(r, num_resolutions);
  let q = band.quadrant_index();
  let x0b = q & 1;
  let y0b = q >> 1;
  Rect {
    x0: map_band_coord(tile_rect.x0, nb, x0b),
    y0: map_band_coord(tile_rect.y0, nb, y0b),
    x1: map_band_coord(tile_rect.x1, nb, x0b),
    y1: map_band_coord(tile_rect.y1, nb, y0b),
  }
}

/// Parity bit (`cas`) of a 1-D pass, drawn from the low bit of the source
/// rectangle's origin (spec §3 "Subband parity").
#[inline]
pub fn parity(origin: u32) -> u32 {
  origin & 1
}

/// The filter family selecting lifting kernels and margins (spec §4.8,
/// §9 "Polymorphism over filter family").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveletFilter {
  Reversible53,
  Irreversible97,
}

impl WaveletFilter {
  /// Filter half-width used by `segment_grow` (spec §4.5) and by
  /// `opj_tcd_is_subband_area_of_interest`'s `filter_margin` (2 for 5/3, 3
  /// for 9/7 in the teacher; spec.md names 4 for 9/7's `PartialTransform`
  /// segment growth specifically — the two numbers differ because one
  /// grows a subband-coordinate segment and the other a tile-coordinate
  /// area of interest. This module implements the subband-coordinate one.
  pub fn filter_width(self) -> u32 {
    match self {
      WaveletFilter::Reversible53 => 2,
      WaveletFilter::Irreversible97 => 4,
    }
  }
}

/// Grows a subband-coordinate segment `[lo, hi)` outward by `margin` on
/// each side, clamped to `[0, extent]` (spec §4.5 `segment_grow`).
#[inline]
pub fn segment_grow(lo: u32, hi: u32, margin: u32, extent: u32) -> (u32, u32) {
  let grown_lo = lo.saturating_sub(margin);
  let grown_hi_unclamped = hi.saturating_add(margin);
  let grown_hi = grown_hi_unclamped.min(extent);
  if lo < margin || grown_hi_unclamped > extent {
    log::debug!("window grown beyond subband: [{lo}, {hi}) -> [{grown_lo}, {grown_hi}) margin={margin} extent={extent}");
  }
  (grown_lo, grown_hi)
}

/// A rectangular grid of samples forming one color channel of one tile
/// (spec §3 "Tile-component").
pub struct TileComponent {
  pub x0: u32,
  pub y0: u32,
  pub x1: u32,
  pub y1: u32,
  pub num_resolutions: u32,
  pub filter: WaveletFilter,
  /// Contiguous sample buffer, stride = tile width. Integer samples for
  /// `Reversible53`, bit-identical-as-f32 samples for `Irreversible97`
  /// (see `sparse_array::as_f32`/`as_i32`).
  pub data: Vec<i32>,
  /// Sub-rectangle of interest for partial decoding, in tile coordinates.
  pub window: Option<Rect>,
  pub resolutions: Vec<Resolution>,
  /// Precision flag mirroring the `qmfbid`-adjacent `signed` bit the
  /// teacher's `tcd.rs` carries off `opj_tccp_t` (SPEC_FULL §3).
  pub signed: bool,
  /// Caller-controllable single-threaded override (spec §5 "Thread count
  /// policy"). `WorkerPool` always falls back to sequential execution when
  /// this is set, regardless of tile size.
  pub disable_mt: bool,
}

impl TileComponent {
  #[inline]
  pub fn rect(&self) -> Rect {
    Rect::new(self.x0, self.y0, self.x1, self.y1)
  }

  #[inline]
  pub fn width(&self) -> u32 {
    self.x1.saturating_sub(self.x0)
  }

  #[inline]
  pub fn height(&self) -> u32 {
    self.y1.saturating_sub(self.y0)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn nb_matches_spec_formula() {
    assert_eq!(decompositions_remaining(0, 5), 4);
    assert_eq!(decompositions_remaining(1, 5), 4);
    assert_eq!(decompositions_remaining(4, 5), 1);
  }

  #[test]
  fn map_band_coord_pass_through_at_nb_zero() {
    assert_eq!(map_band_coord(17, 0, 0), 17);
  }

  #[test]
  fn map_band_coord_hl_offsets_by_half_a_block() {
    // nb=1, offset=1 (x0b for HL): threshold = 1<<0 * 1 = 1.
    assert_eq!(map_band_coord(0, 1, 1), 0);
    assert_eq!(map_band_coord(1, 1, 1), 0);
    assert_eq!(map_band_coord(2, 1, 1), 1);
  }

  #[test]
  fn band_rect_quadrants_cover_the_tile_without_overlap() {
    let tile = Rect::new(0, 0, 16, 16);
    let hl = band_rect_from_tile(tile, 1, 3, SubBandOrientation::HL);
    let lh = band_rect_from_tile(tile, 1, 3, SubBandOrientation::LH);
    let hh = band_rect_from_tile(tile, 1, 3, SubBandOrientation::HH);
    // nb = R-r = 2 at r=1, same as LL's nb at r=0: each band is
    // resolution 1's 8x8 reconstruction minus resolution 0's 4x4 LL.
    assert_eq!(hl, Rect::new(0, 0, 4, 4));
    assert_eq!(lh, Rect::new(0, 0, 4, 4));
    assert_eq!(hh, Rect::new(0, 0, 4, 4));
  }

  #[test]
  fn ll_at_resolution_zero_uses_full_decomposition_count() {
    let tile = Rect::new(0, 0, 16, 16);
    let ll = band_rect_from_tile(tile, 0, 3, SubBandOrientation::LL);
    // nb = R-1 = 2, offset 0 for both axes -> straight ceildivpow2(.., 2).
    assert_eq!(ll, Rect::new(0, 0, 4, 4));
  }

  #[test]
  fn resolution_rect_doubles_each_level_and_matches_the_tile_at_the_top() {
    let tile = Rect::new(0, 0, 16, 16);
    assert_eq!(resolution_rect(tile, 0, 3), Rect::new(0, 0, 4, 4));
    assert_eq!(resolution_rect(tile, 1, 3), Rect::new(0, 0, 8, 8));
    assert_eq!(resolution_rect(tile, 2, 3), Rect::new(0, 0, 16, 16));
  }

  #[test]
  fn for_level_agrees_with_the_standalone_rect_and_band_helpers() {
    let tile = Rect::new(0, 0, 16, 16);
    let res1 = Resolution::for_level(tile, 1, 3);
    assert_eq!(res1.rect, resolution_rect(tile, 1, 3));
    assert_eq!(res1.nb, decompositions_remaining(1, 3));
    assert_eq!(res1.bands.len(), 3);
    assert_eq!(res1.bands[0].rect, band_rect_from_tile(tile, 1, 3, SubBandOrientation::HL));

    let res0 = Resolution::for_level(tile, 0, 3);
    assert!(res0.bands.is_empty());
  }

  #[test]
  fn segment_grow_clamps_to_the_subband_extent() {
    assert_eq!(segment_grow(5, 10, 2, 20), (3, 12));
    assert_eq!(segment_grow(0, 10, 4, 20), (0, 14));
    assert_eq!(segment_grow(5, 18, 4, 20), (1, 20));
  }
}
