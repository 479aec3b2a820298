//! Google Encoded Polyline codec.
//!
//! https://developers.google.com/maps/documentation/utilities/polylinealgorithm

use crate::entities::{Coordinates, Route};
use crate::error::{malformed_polyline_error, Error};

/// 5 digits of precision
const FACTOR: f64 = 100_000.0;
const CHAR_OFFSET: u8 = 63;
const CONTINUATION: u8 = 0x20;
const GROUP_MASK: u8 = 0x1f;
/// Seven groups hold 35 bits, more than any delta between valid coordinates.
const MAX_SHIFT: u32 = 30;
const MAX_LAT: i64 = 90 * 100_000;
const MAX_LNG: i64 = 180 * 100_000;

/// Decodes an encoded polyline into a route, one point per (lat, lng) pair.
pub fn decode(encoded: &str) -> Result<Route, Error> {
    let bytes = encoded.as_bytes();
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;
    let mut route = Route::default();

    while index < bytes.len() {
        lat = accumulate(lat, next_delta(bytes, &mut index)?, MAX_LAT, index)?;
        lng = accumulate(lng, next_delta(bytes, &mut index)?, MAX_LNG, index)?;

        route.push(Coordinates {
            lat: lat as f64 / FACTOR,
            lng: lng as f64 / FACTOR,
        });
    }

    Ok(route)
}

/// Adds `delta` to an axis, rejecting results outside `-limit..=limit`.
fn accumulate(axis: i64, delta: i64, limit: i64, index: usize) -> Result<i64, Error> {
    axis.checked_add(delta)
        .filter(|value| value.abs() <= limit)
        .ok_or_else(|| malformed_polyline_error(index))
}

/// Reads one zig-zag encoded delta starting at `index`, advancing it past
/// the final group.
fn next_delta(bytes: &[u8], index: &mut usize) -> Result<i64, Error> {
    let mut result: i64 = 0;
    let mut shift: u32 = 0;

    loop {
        let byte = *bytes
            .get(*index)
            .ok_or_else(|| malformed_polyline_error(*index))?;

        let value = match byte.checked_sub(CHAR_OFFSET) {
            Some(value) if value < 64 => value,
            _ => return Err(malformed_polyline_error(*index)),
        };

        if shift > MAX_SHIFT {
            return Err(malformed_polyline_error(*index));
        }

        result |= i64::from(value & GROUP_MASK) << shift;
        shift += 5;
        *index += 1;

        if value & CONTINUATION == 0 {
            break;
        }
    }

    if result & 1 == 1 {
        Ok(!(result >> 1))
    } else {
        Ok(result >> 1)
    }
}

/// Encodes a route at 1e-5 degree precision.
pub fn encode(route: &Route) -> String {
    let mut output = String::new();
    let mut previous = (0, 0);

    for point in &route.points {
        let current = (scale(point.lat), scale(point.lng));
        encode_delta(current.0 - previous.0, &mut output);
        encode_delta(current.1 - previous.1, &mut output);
        previous = current;
    }

    output
}

#[inline]
fn scale(n: f64) -> i64 {
    (FACTOR * n).round() as i64
}

fn encode_delta(delta: i64, output: &mut String) {
    let mut value = delta << 1;
    if delta < 0 {
        value = !value;
    }

    while value >= i64::from(CONTINUATION) {
        let group = (CONTINUATION as i64 | (value & GROUP_MASK as i64)) as u8;
        output.push(char::from(group + CHAR_OFFSET));
        value >>= 5;
    }

    output.push(char::from(value as u8 + CHAR_OFFSET));
}

#[cfg(test)]
const TOLERANCE: f64 = 1e-5;

#[test]
fn decodes_published_example() {
    let route = decode("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
    let expected = [(38.5, -120.2), (40.7, -120.95), (43.252, -126.453)];

    assert_eq!(route.len(), expected.len());
    for (point, (lat, lng)) in route.points.iter().zip(expected) {
        assert!(point.approx_eq(&Coordinates::new(lat, lng), TOLERANCE));
    }
}

#[test]
fn empty_string_is_empty_route() {
    assert!(decode("").unwrap().is_empty());
    assert_eq!(encode(&Route::default()), "");
}

#[test]
fn encodes_published_example() {
    let route = Route::new(vec![
        Coordinates::new(38.5, -120.2),
        Coordinates::new(40.7, -120.95),
        Coordinates::new(43.252, -126.453),
    ]);

    assert_eq!(encode(&route), "_p~iF~ps|U_ulLnnqC_mqNvxq`@");
}

#[test]
fn round_trips_within_precision() {
    let route = Route::new(vec![
        Coordinates::new(4.60971, -74.08175),
        Coordinates::new(4.60971, -74.08175),
        Coordinates::new(-33.8688197, 151.2092955),
        Coordinates::new(0.0, 0.0),
        Coordinates::new(89.99999, -179.99999),
    ]);

    let decoded = decode(&encode(&route)).unwrap();

    assert_eq!(decoded.len(), route.len());
    for (a, b) in decoded.points.iter().zip(&route.points) {
        assert!(a.approx_eq(b, TOLERANCE));
    }
}

#[test]
fn rejects_truncated_group() {
    // "_p~iF~ps|U" with the terminating byte of the longitude group removed
    let err = decode("_p~iF~ps|").unwrap_err();
    assert_eq!(err.code, 102);
    assert_eq!(err.message, "malformed polyline at offset 9");
}

#[test]
fn rejects_unpaired_latitude() {
    let err = decode("_p~iF").unwrap_err();
    assert_eq!(err.code, 102);
}

#[test]
fn rejects_bytes_outside_alphabet() {
    assert_eq!(decode("_p~iF ps|U").unwrap_err().message, "malformed polyline at offset 5");
    assert_eq!(decode("é").unwrap_err().code, 102);
}

#[test]
fn rejects_oversized_deltas() {
    let err = decode("}~~~~~~~~~~~F?}~~~~~~~~~~~F?}~~~~~~~~~~~F?").unwrap_err();
    assert_eq!(err.code, 102);
}

#[test]
fn rejects_coordinates_out_of_range() {
    let route = Route::new(vec![Coordinates::new(45.0, 0.0), Coordinates::new(95.0, 0.0)]);
    let err = decode(&encode(&route)).unwrap_err();
    assert_eq!(err.code, 102);

    let route = Route::new(vec![Coordinates::new(0.0, 181.0)]);
    assert_eq!(decode(&encode(&route)).unwrap_err().code, 102);
}

#[test]
fn decodes_extreme_valid_jumps() {
    let route = Route::new(vec![
        Coordinates::new(-90.0, -180.0),
        Coordinates::new(90.0, 180.0),
        Coordinates::new(-90.0, -180.0),
    ]);

    let decoded = decode(&encode(&route)).unwrap();
    assert_eq!(decoded.len(), 3);
    for (a, b) in decoded.points.iter().zip(&route.points) {
        assert!(a.approx_eq(b, TOLERANCE));
    }
}

#[test]
fn rejects_endless_continuation() {
    let err = decode(&"~".repeat(64)).unwrap_err();
    assert_eq!(err.code, 102);
}
