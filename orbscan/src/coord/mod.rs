//! Angle normalization and one-degree cell coordinates
//!
//! Every latitude and longitude that enters the crate from a host is folded
//! into a canonical range before it is stored or compared:
//!
//! - latitude into `(-90, 90]`
//! - longitude into `(-180, 180]`
//!
//! Folding is idempotent, so normalizing an already normalized angle is a
//! no-op.

/// Width of the latitude range in degrees.
const LAT_SPAN: f64 = 180.0;

/// Width of the longitude range in degrees.
const LON_SPAN: f64 = 360.0;

/// Upper (inclusive) latitude bound.
pub const MAX_LAT: f64 = 90.0;

/// Upper (inclusive) longitude bound.
pub const MAX_LON: f64 = 180.0;

/// Fold a latitude into `(-90, 90]`.
///
/// Crossing a pole wraps around to the opposite end of the range, so
/// `-95` becomes `85`.
#[inline]
pub fn normalize_latitude(lat: f64) -> f64 {
    fold(lat, MAX_LAT, LAT_SPAN)
}

/// Fold a longitude into `(-180, 180]`.
///
/// `185` becomes `-175`, `-180` becomes `180`.
#[inline]
pub fn normalize_longitude(lon: f64) -> f64 {
    fold(lon, MAX_LON, LON_SPAN)
}

/// Fold `value` into `(max - span, max]`.
///
/// In-range values are returned untouched so folding twice is exact.
fn fold(value: f64, max: f64, span: f64) -> f64 {
    let min = max - span;
    if value > min && value <= max {
        return value;
    }
    let folded = max - (max - value).rem_euclid(span);
    // rem_euclid may round up to `span` for tiny negative remainders
    if folded <= min {
        max
    } else {
        folded
    }
}

/// A one-degree surface cell, identified by the floor of its coordinates.
///
/// Columns run `0..360` from the antimeridian eastwards, rows `0..180`
/// from the south pole northwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeoCell {
    /// Column index (0..360)
    pub col: u16,
    /// Row index (0..180)
    pub row: u8,
}

impl GeoCell {
    /// Number of columns in a full cell grid.
    pub const COLS: usize = 360;
    /// Number of rows in a full cell grid.
    pub const ROWS: usize = 180;

    /// Map an arbitrary longitude/latitude pair onto its cell.
    ///
    /// Out-of-range inputs wrap, which is what footprints straddling the
    /// antimeridian or a pole rely on.
    pub fn from_lon_lat(lon: f64, lat: f64) -> Self {
        let col = (lon.floor() as i64 + 180).rem_euclid(Self::COLS as i64);
        let row = (lat.floor() as i64 + 90).rem_euclid(Self::ROWS as i64);
        Self {
            col: col as u16,
            row: row as u8,
        }
    }

    /// Flat index into a row-major grid.
    #[inline]
    pub fn index(&self) -> usize {
        self.row as usize * Self::COLS + self.col as usize
    }
}
