//! Map-service links for a looked-up location.

use serde::Serialize;

use crate::models::LookupResult;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct MapLinks {
    pub google_maps: String,
    pub openstreetmap: String,
    pub bing_maps: String,
    pub map_embed: String,
    pub yandex_maps: String,
}

impl MapLinks {
    pub fn new(lat: f64, lon: f64) -> Self {
        MapLinks {
            google_maps: format!("https://www.google.com/maps?q={lat},{lon}"),
            openstreetmap: format!("https://www.openstreetmap.org/?mlat={lat}&mlon={lon}"),
            bing_maps: format!("https://www.bing.com/maps?cp={lat}~{lon}"),
            map_embed: format!("https://maps.google.com/maps?output=embed&q={lat},{lon}"),
            // Yandex takes longitude first
            yandex_maps: format!("https://yandex.com/maps/?pt={lon},{lat}&z=12"),
        }
    }

    /// `None` when the result carries no coordinates.
    pub fn from_result(result: &LookupResult) -> Option<Self> {
        result.coordinates().map(|(lat, lon)| MapLinks::new(lat, lon))
    }

    /// Labelled links in display order.
    pub fn labelled(&self) -> [(&'static str, &str); 4] {
        [
            ("Google Maps", &self.google_maps),
            ("OpenStreetMap", &self.openstreetmap),
            ("Bing Maps", &self.bing_maps),
            ("Yandex Maps", &self.yandex_maps),
        ]
    }
}
