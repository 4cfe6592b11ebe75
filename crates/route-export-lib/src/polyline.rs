//! Encoded polyline support
//!
//! Steps may carry their geometry as an encoded polyline string (the
//! compact format used by most routing services: zig-zag deltas split into
//! 5-bit groups, each offset by 63 into printable ASCII). Decoding sits
//! behind [`PolylineDecoder`] so callers can plug in a different codec.

use crate::{ExportError, GeoPoint, Result};

/// Default coordinate precision (5 decimal digits)
pub const DEFAULT_PRECISION: u32 = 5;

/// Turns an encoded polyline into an ordered point sequence
pub trait PolylineDecoder: Send + Sync {
    fn decode(&self, encoded: &str) -> Result<Vec<GeoPoint>>;
}

/// Decoder for the standard encoded polyline algorithm
#[derive(Clone, Copy, Debug)]
pub struct EncodedPolylineDecoder {
    factor: f64,
}

impl EncodedPolylineDecoder {
    /// Create a decoder for the given number of decimal digits
    pub fn with_precision(precision: u32) -> Self {
        Self {
            factor: 10f64.powi(precision as i32),
        }
    }
}

impl Default for EncodedPolylineDecoder {
    fn default() -> Self {
        Self::with_precision(DEFAULT_PRECISION)
    }
}

impl PolylineDecoder for EncodedPolylineDecoder {
    fn decode(&self, encoded: &str) -> Result<Vec<GeoPoint>> {
        let bytes = encoded.as_bytes();
        let mut points = Vec::with_capacity(bytes.len() / 4);
        let mut position = 0;
        let mut lat: i64 = 0;
        let mut lng: i64 = 0;

        while position < bytes.len() {
            lat = accumulate(lat, next_value(bytes, &mut position)?, position)?;
            if position >= bytes.len() {
                return Err(ExportError::InvalidPolyline {
                    position,
                    reason: "latitude without longitude".to_string(),
                });
            }
            lng = accumulate(lng, next_value(bytes, &mut position)?, position)?;

            let point = GeoPoint::new(lat as f64 / self.factor, lng as f64 / self.factor);
            if !(point.lat.abs() <= 90.0 && point.lng.abs() <= 180.0) {
                return Err(ExportError::InvalidPolyline {
                    position,
                    reason: format!("coordinate out of range ({}, {})", point.lat, point.lng),
                });
            }
            points.push(point);
        }

        Ok(points)
    }
}

/// Add a decoded delta to the running coordinate
fn accumulate(current: i64, delta: i64, position: usize) -> Result<i64> {
    current
        .checked_add(delta)
        .ok_or_else(|| ExportError::InvalidPolyline {
            position,
            reason: "coordinate overflow".to_string(),
        })
}

/// Read one zig-zag encoded delta starting at `position`
fn next_value(bytes: &[u8], position: &mut usize) -> Result<i64> {
    let mut result: i64 = 0;
    let mut shift = 0;

    loop {
        let Some(&byte) = bytes.get(*position) else {
            return Err(ExportError::InvalidPolyline {
                position: *position,
                reason: "unterminated value".to_string(),
            });
        };
        if !(63..=126).contains(&byte) {
            return Err(ExportError::InvalidPolyline {
                position: *position,
                reason: format!("invalid character {:?}", byte as char),
            });
        }
        if shift > 60 {
            return Err(ExportError::InvalidPolyline {
                position: *position,
                reason: "value overflow".to_string(),
            });
        }

        let chunk = (byte - 63) as i64;
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        *position += 1;

        if chunk < 0x20 {
            break;
        }
    }

    Ok(if result & 1 != 0 {
        !(result >> 1)
    } else {
        result >> 1
    })
}

/// Encode a path with the default precision
pub fn encode(path: &[GeoPoint]) -> String {
    encode_with_precision(path, DEFAULT_PRECISION)
}

/// Encode a path as a polyline string with the given precision
pub fn encode_with_precision(path: &[GeoPoint], precision: u32) -> String {
    let factor = 10f64.powi(precision as i32);
    let mut encoded = String::with_capacity(path.len() * 8);
    let mut prev_lat: i64 = 0;
    let mut prev_lng: i64 = 0;

    for point in path {
        let lat = (point.lat * factor).round() as i64;
        let lng = (point.lng * factor).round() as i64;
        push_value(&mut encoded, lat - prev_lat);
        push_value(&mut encoded, lng - prev_lng);
        prev_lat = lat;
        prev_lng = lng;
    }

    encoded
}

fn push_value(out: &mut String, value: i64) {
    let mut v = if value < 0 { !(value << 1) } else { value << 1 };
    while v >= 0x20 {
        out.push((((v & 0x1f) | 0x20) as u8 + 63) as char);
        v >>= 5;
    }
    out.push((v as u8 + 63) as char);
}
