use serde::{Deserialize, Serialize};

/// A WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum BoundsError {
    #[error("coordinate is not finite")]
    NotFinite,
    #[error("north-east corner ({ne_lat}, {ne_lng}) lies south or west of south-west corner ({sw_lat}, {sw_lng})")]
    Inverted {
        ne_lat: f64,
        ne_lng: f64,
        sw_lat: f64,
        sw_lng: f64,
    },
}

/// Visible map area as two corners. Antimeridian crossing is not supported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    ne_lat: f64,
    ne_lng: f64,
    sw_lat: f64,
    sw_lng: f64,
}

impl BoundingBox {
    pub fn new(ne_lat: f64, ne_lng: f64, sw_lat: f64, sw_lng: f64) -> Result<Self, BoundsError> {
        if ![ne_lat, ne_lng, sw_lat, sw_lng].iter().all(|v| v.is_finite()) {
            return Err(BoundsError::NotFinite);
        }
        if ne_lat < sw_lat || ne_lng < sw_lng {
            return Err(BoundsError::Inverted {
                ne_lat,
                ne_lng,
                sw_lat,
                sw_lng,
            });
        }
        Ok(Self {
            ne_lat,
            ne_lng,
            sw_lat,
            sw_lng,
        })
    }

    pub fn from_corners(north_east: LatLng, south_west: LatLng) -> Result<Self, BoundsError> {
        Self::new(north_east.lat, north_east.lng, south_west.lat, south_west.lng)
    }

    pub fn ne_lat(&self) -> f64 {
        self.ne_lat
    }

    pub fn ne_lng(&self) -> f64 {
        self.ne_lng
    }

    pub fn sw_lat(&self) -> f64 {
        self.sw_lat
    }

    pub fn sw_lng(&self) -> f64 {
        self.sw_lng
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.ne_lat + self.sw_lat) / 2.0,
            (self.ne_lng + self.sw_lng) / 2.0,
        )
    }

    pub fn contains(&self, point: LatLng) -> bool {
        point.lat >= self.sw_lat
            && point.lat <= self.ne_lat
            && point.lng >= self.sw_lng
            && point.lng <= self.ne_lng
    }
}
