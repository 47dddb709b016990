//! Widget configuration consumed once at initialization.
//!
//! Service URLs are opaque to the core; they are passed through to the
//! rendering collaborator. Defaults match the Flanders service map.

use serde::{Deserialize, Serialize};

use crate::element::{Coordinate, Extent, Size};

/// A map service endpoint: one logical service behind several base URLs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub urls: Vec<String>,
}

/// The orthophoto mosaic service, which also carries a display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrthoConfig {
    pub name: String,
    pub urls: Vec<String>,
}

/// Initial view parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewDefaults {
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub center: Coordinate,
    pub size: Size,
    pub extent: Extent,
    /// Resolution per zoom level, finest last.
    pub resolutions: Vec<f64>,
}

impl Default for ViewDefaults {
    fn default() -> Self {
        Self {
            zoom: 2.0,
            min_zoom: 2.0,
            max_zoom: 15.0,
            center: [130_000.0, 193_000.0],
            size: [0, 500],
            extent: [18_000.0, 152_999.75, 280_144.0, 415_143.75],
            resolutions: vec![
                1024.0, 512.0, 256.0, 128.0, 64.0, 32.0, 16.0, 8.0, 4.0, 2.0, 1.0, 0.5, 0.25,
                0.125, 0.0625, 0.03125,
            ],
        }
    }
}

/// Full widget configuration.
///
/// `Deserialize`-able so hosts can load it from JSON; [`Default`]
/// carries the standard Flanders setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KaartConfig {
    /// Spatial reference identifier, e.g. `EPSG:31370`.
    pub srs: String,
    pub geoserver: ServiceConfig,
    pub tilecache: ServiceConfig,
    pub orthophoto: OrthoConfig,
    #[serde(default)]
    pub defaults: ViewDefaults,
}

impl Default for KaartConfig {
    fn default() -> Self {
        Self {
            srs: "EPSG:31370".into(),
            geoserver: ServiceConfig {
                urls: vec![
                    "https://wms1.apps.mow.vlaanderen.be/geoserver/service/wms".into(),
                    "https://wms2.apps.mow.vlaanderen.be/geoserver/service/wms".into(),
                    "https://wms3.apps.mow.vlaanderen.be/geoserver/service/wms".into(),
                ],
            },
            tilecache: ServiceConfig {
                urls: vec![
                    "https://wms1.apps.mow.vlaanderen.be/geowebcache/service/wms".into(),
                    "https://wms2.apps.mow.vlaanderen.be/geowebcache/service/wms".into(),
                    "https://wms3.apps.mow.vlaanderen.be/geowebcache/service/wms".into(),
                ],
            },
            orthophoto: OrthoConfig {
                name: "Ortho".into(),
                urls: vec![
                    "http://geoservices.informatievlaanderen.be/raadpleegdiensten/omwrgbmrvl/wms"
                        .into(),
                ],
            },
            defaults: ViewDefaults::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_flanders() {
        let config = KaartConfig::default();
        assert_eq!(config.srs, "EPSG:31370");
        assert_eq!(config.defaults.center, [130_000.0, 193_000.0]);
        assert_eq!(config.defaults.min_zoom, 2.0);
        assert_eq!(config.defaults.max_zoom, 15.0);
        assert_eq!(config.defaults.resolutions.len(), 16);
    }

    #[test]
    fn config_deserializes_with_defaulted_view() {
        let json = r#"{
            "srs": "EPSG:3857",
            "geoserver": { "urls": [] },
            "tilecache": { "urls": [] },
            "orthophoto": { "name": "Ortho", "urls": [] }
        }"#;
        let config: KaartConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.srs, "EPSG:3857");
        assert_eq!(config.defaults.zoom, 2.0);
    }
}
