//! Size-bounded partitioning of formatted coordinates
//!
//! The number of parts is estimated from the length of the whole
//! comma-joined list, then the list is cut into parts holding the same
//! number of coordinates. Coordinate strings of uneven length can push a
//! part past the budget; that is reported but not treated as an error.

use crate::GeoPoint;
use std::fmt;

/// Default budget per part, in characters of comma-joined text
pub const DEFAULT_CHAR_BUDGET: usize = 9000;

/// Separator between coordinates in a serialized part
pub const SEPARATOR: &str = ",";

/// A point rendered as `"<lng>,<lat>"` with six decimals, longitude first
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FormattedCoordinate(String);

impl FormattedCoordinate {
    pub fn new(point: GeoPoint) -> Self {
        Self(format!("{:.6},{:.6}", point.lng, point.lat))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<GeoPoint> for FormattedCoordinate {
    fn from(point: GeoPoint) -> Self {
        Self::new(point)
    }
}

impl AsRef<str> for FormattedCoordinate {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FormattedCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Contiguous run of coordinates written to one archive entry
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Chunk {
    coordinates: Vec<FormattedCoordinate>,
}

impl Chunk {
    pub fn new(coordinates: Vec<FormattedCoordinate>) -> Self {
        Self { coordinates }
    }

    #[inline]
    pub fn coordinates(&self) -> &[FormattedCoordinate] {
        &self.coordinates
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    /// Length of [`Chunk::render`] without building the string
    pub fn serialized_len(&self) -> usize {
        serialized_len(&self.coordinates)
    }

    /// Comma-joined text, no header and no trailing separator
    pub fn render(&self) -> String {
        let mut text = String::with_capacity(self.serialized_len());
        for (i, coordinate) in self.coordinates.iter().enumerate() {
            if i > 0 {
                text.push_str(SEPARATOR);
            }
            text.push_str(coordinate.as_str());
        }
        text
    }
}

/// Length of the comma-joined representation of `coordinates`
pub fn serialized_len(coordinates: &[FormattedCoordinate]) -> usize {
    let body: usize = coordinates.iter().map(FormattedCoordinate::len).sum();
    body + coordinates.len().saturating_sub(1) * SEPARATOR.len()
}

/// Estimated number of parts for a text of `total_len` characters
///
/// A budget of zero disables splitting.
#[inline]
pub fn estimate_parts(total_len: usize, budget: usize) -> usize {
    if total_len == 0 {
        return 0;
    }
    if budget == 0 {
        return 1;
    }
    total_len.div_ceil(budget)
}

/// Number of coordinates per part for `count` coordinates split `parts` ways
#[inline]
pub fn chunk_size(count: usize, parts: usize) -> usize {
    if parts == 0 {
        return count;
    }
    count.div_ceil(parts)
}

/// Partition `coordinates` into contiguous chunks sized for `budget`
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn chunk_coordinates(coordinates: &[FormattedCoordinate], budget: usize) -> Vec<Chunk> {
    let total_len = serialized_len(coordinates);
    let parts = estimate_parts(total_len, budget);
    if parts == 0 {
        return Vec::new();
    }

    let size = chunk_size(coordinates.len(), parts);
    let chunks: Vec<Chunk> = coordinates
        .chunks(size)
        .map(|slice| Chunk::new(slice.to_vec()))
        .collect();

    if budget > 0 {
        for (index, chunk) in chunks.iter().enumerate() {
            let len = chunk.serialized_len();
            if len > budget {
                tracing::warn!(
                    "Part {} is {len} characters, over the {budget} character budget",
                    index + 1
                );
            }
        }
    }

    tracing::debug!(
        "Split {} coordinates ({total_len} characters) into {} part(s) of up to {size}",
        coordinates.len(),
        chunks.len()
    );
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(count: usize) -> Vec<FormattedCoordinate> {
        // Every coordinate renders to 19 characters: "46.xxxxxx,24.xxxxxx"
        (0..count)
            .map(|i| {
                FormattedCoordinate::new(GeoPoint::new(
                    24.0 + i as f64 * 1e-4,
                    46.0 + i as f64 * 1e-4,
                ))
            })
            .collect()
    }

    #[test]
    fn test_format_longitude_first_six_decimals() {
        let c = FormattedCoordinate::new(GeoPoint::new(24.7136, 46.6753));
        assert_eq!(c.as_str(), "46.675300,24.713600");
        let c = FormattedCoordinate::new(GeoPoint::new(-33.8688197, 151.2092957));
        assert_eq!(c.as_str(), "151.209296,-33.868820");
    }

    #[test]
    fn test_serialized_len_matches_render() {
        let list = coords(7);
        let chunk = Chunk::new(list.clone());
        assert_eq!(chunk.serialized_len(), chunk.render().len());
        assert_eq!(serialized_len(&list), 7 * 19 + 6);
        assert_eq!(serialized_len(&[]), 0);
    }

    #[test]
    fn test_render_has_no_trailing_separator() {
        let chunk = Chunk::new(coords(2));
        assert_eq!(chunk.render(), "46.000000,24.000000,46.000100,24.000100");
    }

    #[test]
    fn test_empty_input_yields_no_chunks() {
        assert!(chunk_coordinates(&[], DEFAULT_CHAR_BUDGET).is_empty());
    }

    #[test]
    fn test_small_input_single_chunk() {
        let list = coords(10);
        let chunks = chunk_coordinates(&list, DEFAULT_CHAR_BUDGET);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].coordinates(), &list[..]);
    }

    #[test]
    fn test_27000_characters_split_in_three() {
        // 1350 coordinates of 19 characters joined by commas: 26 999 characters
        let list = coords(1350);
        assert_eq!(serialized_len(&list), 26_999);

        let chunks = chunk_coordinates(&list, 9000);
        assert_eq!(chunks.len(), 3);
        for chunk in &chunks {
            assert_eq!(chunk.len(), 450);
            assert!(chunk.serialized_len() <= 9000);
        }

        let rejoined: Vec<FormattedCoordinate> = chunks
            .iter()
            .flat_map(|c| c.coordinates().iter().cloned())
            .collect();
        assert_eq!(rejoined, list);
    }

    #[test]
    fn test_last_chunk_may_be_shorter() {
        let list = coords(1001);
        let chunks = chunk_coordinates(&list, 9000);
        // 1001 * 20 - 1 = 20019 characters -> 3 parts of 334
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 334);
        assert_eq!(chunks[1].len(), 334);
        assert_eq!(chunks[2].len(), 333);
    }

    #[test]
    fn test_partition_is_exhaustive_for_many_sizes() {
        for count in [1, 2, 3, 449, 450, 451, 899, 2000] {
            let list = coords(count);
            for budget in [1, 19, 20, 100, 9000] {
                let chunks = chunk_coordinates(&list, budget);
                let rejoined: Vec<FormattedCoordinate> = chunks
                    .iter()
                    .flat_map(|c| c.coordinates().iter().cloned())
                    .collect();
                assert_eq!(rejoined, list, "count {count}, budget {budget}");
                assert!(chunks.iter().all(|c| !c.is_empty()));
            }
        }
    }

    #[test]
    fn test_budget_overshoot_is_soft() {
        // Budget smaller than a single coordinate still produces output
        let list = coords(3);
        let chunks = chunk_coordinates(&list, 5);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.serialized_len() > 5));
    }

    #[test]
    fn test_zero_budget_disables_splitting() {
        let list = coords(5000);
        let chunks = chunk_coordinates(&list, 0);
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn test_estimate_parts() {
        assert_eq!(estimate_parts(0, 9000), 0);
        assert_eq!(estimate_parts(1, 9000), 1);
        assert_eq!(estimate_parts(9000, 9000), 1);
        assert_eq!(estimate_parts(9001, 9000), 2);
        assert_eq!(estimate_parts(27_000, 9000), 3);
        assert_eq!(chunk_size(10, 3), 4);
    }
}
