use serde::{Deserialize, Serialize};

/// One row of the city dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct CityRecord {
    pub country: String,
    pub city: String,
    pub lat: f64,
    pub lon: f64,
}

impl CityRecord {
    pub fn new(country: impl Into<String>, city: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            country: country.into(),
            city: city.into(),
            lat,
            lon,
        }
    }
}

/// A city chosen for output, with the relative path of its map file.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelRecord {
    pub country: String,
    pub city: String,
    pub lat: f64,
    pub lon: f64,
    pub output_path: String,
}

/// A place added by hand after selection, bypassing every selection rule.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PinnedPlace {
    pub country: String,
    pub city: String,
    pub lat: f64,
    pub lon: f64,
}
