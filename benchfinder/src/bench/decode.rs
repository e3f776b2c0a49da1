//! Decoding of the open-data bench feed.
//!
//! The feed is a JSON array of objects using the city's Catalan field names.
//! String attributes are optional (absent or `null` become empty strings);
//! `longitud` and `latitud` must be present and numeric.

use serde::{Deserialize, Deserializer};
use thiserror::Error;

use super::Bench;

/// The payload could not be decoded into benches.
#[derive(Debug, Error)]
#[error("Malformed bench payload: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

impl DecodeError {
    /// Line of the payload where decoding failed (1-based, 0 if unknown).
    pub fn line(&self) -> usize {
        self.0.line()
    }
}

/// Wire shape of one feed record.
#[derive(Deserialize)]
struct RawBench {
    #[serde(default, deserialize_with = "nullable_string")]
    gis_id: String,
    #[serde(default, deserialize_with = "nullable_string")]
    tipus_de_mobiliari_urba: String,
    #[serde(default, deserialize_with = "nullable_string")]
    codi: String,
    #[serde(default, deserialize_with = "nullable_string")]
    descripcio: String,
    #[serde(default, deserialize_with = "nullable_string")]
    fabricant: String,
    #[serde(default, deserialize_with = "nullable_string")]
    codi_districte: String,
    #[serde(default, deserialize_with = "nullable_string")]
    nom_districte: String,
    #[serde(default, deserialize_with = "nullable_string")]
    codi_barri: String,
    #[serde(default, deserialize_with = "nullable_string")]
    nom_barri: String,
    #[serde(default, deserialize_with = "nullable_string")]
    zona: String,
    #[serde(default, deserialize_with = "nullable_string")]
    nom_carrer: String,
    #[serde(default, deserialize_with = "nullable_string")]
    num_carrer: String,
    #[serde(default, deserialize_with = "nullable_string")]
    x_etrs89: String,
    #[serde(default, deserialize_with = "nullable_string")]
    y_etrs89: String,
    #[serde(default, deserialize_with = "nullable_string")]
    geometria_etrs89: String,
    longitud: f64,
    latitud: f64,
    #[serde(default, deserialize_with = "nullable_string")]
    geometria_wgs84: String,
    #[serde(default, deserialize_with = "nullable_string")]
    data_alta: String,
    #[serde(default, deserialize_with = "nullable_string")]
    data_baixa: String,
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl From<RawBench> for Bench {
    fn from(raw: RawBench) -> Self {
        Self {
            gis_id: raw.gis_id,
            bench_type: raw.tipus_de_mobiliari_urba,
            code: raw.codi,
            description: raw.descripcio,
            manufacturer: raw.fabricant,
            district_code: raw.codi_districte,
            district_name: raw.nom_districte,
            neighborhood_code: raw.codi_barri,
            neighborhood_name: raw.nom_barri,
            zone: raw.zona,
            street_name: raw.nom_carrer,
            street_number: raw.num_carrer,
            x_etrs89: raw.x_etrs89,
            y_etrs89: raw.y_etrs89,
            geometry_etrs89: raw.geometria_etrs89,
            longitude: raw.longitud,
            latitude: raw.latitud,
            geometry_wgs84: raw.geometria_wgs84,
            created_at: raw.data_alta,
            deleted_at: raw.data_baixa,
        }
    }
}

/// Decodes a feed payload into benches, preserving record order.
///
/// Coordinates are not range-checked here; the store rejects out-of-range
/// values when the dataset is replaced.
///
/// # Errors
///
/// Returns [`DecodeError`] if the payload is not a JSON array of objects,
/// a field has the wrong type, or a record lacks `longitud`/`latitud`.
pub fn decode_benches(payload: &[u8]) -> Result<Vec<Bench>, DecodeError> {
    let raw: Vec<RawBench> = serde_json::from_slice(payload)?;
    Ok(raw.into_iter().map(Bench::from).collect())
}
