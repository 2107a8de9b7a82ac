use crate::models::Coordinates;

/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in kilometers
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Great-circle distance between two coordinate pairs in kilometers
#[inline]
pub fn distance_km(from: &Coordinates, to: &Coordinates) -> f64 {
    haversine_distance(from.lat, from.lng, to.lat, to.lng)
}

/// Location score for a known distance and work radius
///
/// Inside the radius the score falls linearly from 100 at the worker's
/// location to 60 at the boundary. Beyond it the score is a flat 30.
#[inline]
pub fn radius_score(distance_km: f64, radius_km: f64) -> u8 {
    if distance_km > radius_km {
        return 30;
    }

    let score = (100.0 - (distance_km / radius_km) * 40.0).max(60.0);
    score.round().clamp(0.0, 100.0) as u8
}
