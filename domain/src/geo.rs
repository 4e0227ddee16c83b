//! Study area geometry and its textual description

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Axis-aligned extent of a study area in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Extent of every Polygon / MultiPolygon exterior ring in a
    /// FeatureCollection. Other geometry types are ignored.
    pub fn from_geojson(geojson: &Value) -> Result<Self, DomainError> {
        let features = geojson
            .get("features")
            .and_then(Value::as_array)
            .ok_or_else(|| DomainError::InvalidGeoJson("missing 'features' array".to_string()))?;

        let mut bbox: Option<BoundingBox> = None;
        for geometry in features.iter().filter_map(|f| f.get("geometry")) {
            let coordinates = geometry.get("coordinates");
            let rings: Vec<&Value> = match geometry.get("type").and_then(Value::as_str) {
                Some("Polygon") => coordinates
                    .and_then(|c| c.get(0))
                    .into_iter()
                    .collect(),
                Some("MultiPolygon") => coordinates
                    .and_then(Value::as_array)
                    .map(|polys| polys.iter().filter_map(|p| p.get(0)).collect())
                    .unwrap_or_default(),
                _ => continue,
            };

            for point in rings.iter().filter_map(|r| r.as_array()).flatten() {
                let (Some(lon), Some(lat)) = (
                    point.get(0).and_then(Value::as_f64),
                    point.get(1).and_then(Value::as_f64),
                ) else {
                    continue;
                };
                bbox = Some(match bbox {
                    None => BoundingBox {
                        min_lon: lon,
                        max_lon: lon,
                        min_lat: lat,
                        max_lat: lat,
                    },
                    Some(b) => BoundingBox {
                        min_lon: b.min_lon.min(lon),
                        max_lon: b.max_lon.max(lon),
                        min_lat: b.min_lat.min(lat),
                        max_lat: b.max_lat.max(lat),
                    },
                });
            }
        }

        bbox.ok_or_else(|| DomainError::InvalidGeoJson("no polygon coordinates found".to_string()))
    }
}

/// Oracle description of a study area.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaDescription {
    pub region: String,
    pub ecosystem_type: String,
    pub description: String,
}

impl AreaDescription {
    /// Parse the `REGION:` / `ECOSYSTEM_TYPE:` / `DESCRIPTION:` reply.
    ///
    /// `DESCRIPTION` runs to the end of the text. Without any label the
    /// whole reply becomes the description.
    pub fn parse(reply: &str) -> Self {
        let mut area = AreaDescription::default();
        let mut description_lines: Option<Vec<&str>> = None;

        for line in reply.lines() {
            let trimmed = line.trim();
            if let Some(lines) = description_lines.as_mut() {
                lines.push(trimmed);
            } else if let Some(rest) = trimmed.strip_prefix("REGION:") {
                area.region = rest.trim().to_string();
            } else if let Some(rest) = trimmed.strip_prefix("ECOSYSTEM_TYPE:") {
                area.ecosystem_type = rest.trim().to_string();
            } else if let Some(rest) = trimmed.strip_prefix("DESCRIPTION:") {
                description_lines = Some(vec![rest.trim()]);
            }
        }

        area.description = match description_lines {
            Some(lines) => lines.join("\n").trim().to_string(),
            None if area.region.is_empty() && area.ecosystem_type.is_empty() => {
                reply.trim().to_string()
            }
            None => String::new(),
        };
        area
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bbox_over_polygons() {
        let geojson = json!({
            "type": "FeatureCollection",
            "features": [
                {"geometry": {"type": "Polygon", "coordinates": [[[1.0, 50.0], [3.0, 52.0], [2.0, 49.5]]]}},
                {"geometry": {"type": "MultiPolygon", "coordinates": [[[[-1.0, 55.0], [0.0, 56.0]]]]}},
                {"geometry": {"type": "Point", "coordinates": [100.0, 0.0]}}
            ]
        });
        let bbox = BoundingBox::from_geojson(&geojson).unwrap();
        assert_eq!(bbox.min_lon, -1.0);
        assert_eq!(bbox.max_lon, 3.0);
        assert_eq!(bbox.min_lat, 49.5);
        assert_eq!(bbox.max_lat, 56.0);
    }

    #[test]
    fn test_bbox_without_polygons_is_error() {
        let geojson = json!({"features": []});
        assert!(BoundingBox::from_geojson(&geojson).is_err());
        assert!(BoundingBox::from_geojson(&json!({})).is_err());
    }

    #[test]
    fn test_area_description_parse() {
        let reply = "REGION: North Sea\nECOSYSTEM_TYPE: temperate shelf\nDESCRIPTION: Shallow sea.\nStrong tides.";
        let area = AreaDescription::parse(reply);
        assert_eq!(area.region, "North Sea");
        assert_eq!(area.ecosystem_type, "temperate shelf");
        assert_eq!(area.description, "Shallow sea.\nStrong tides.");
    }

    #[test]
    fn test_area_description_unlabelled() {
        let area = AreaDescription::parse("  A cold fjord system. ");
        assert_eq!(area.description, "A cold fjord system.");
        assert!(area.region.is_empty());
    }
}
