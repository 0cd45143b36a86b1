//! Error type for the DWT engine (see spec §7 "Error Handling Design").
//!
//! The teacher crate reports failure as `OPJ_BOOL` (`i32`) return codes
//! routed through an `opj_event_mgr` callback, a convention that exists to
//! cross the C FFI boundary it carries. This crate has no such boundary, so
//! failures are a plain `Result`, grounded the way `rad-medica-jpegexp-rs`'s
//! `error.rs` models its error enum with `thiserror`.

use thiserror::Error;

/// Failure modes the DWT engine can report. Degenerate inputs (single
/// resolution, zero-width tile) are not errors — they short-circuit to an
/// identity result instead (see spec §7).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DwtError {
  /// A scratch or sparse-array block allocation failed.
  #[error("allocation failed")]
  OutOfMemory,
  /// `max_resolution * lanes * element_size` would overflow `usize`.
  #[error("scratch buffer size overflows usize")]
  SizeOverflow,
  /// A sparse-array read/write rectangle exceeds the array's bounds and the
  /// caller did not pass `forgiving`.
  #[error("region exceeds sparse array bounds")]
  InvalidRegion,
}

pub type DwtResult<T> = Result<T, DwtError>;
