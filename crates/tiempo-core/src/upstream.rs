//! Upstream API response types.
//!
//! The el-tiempo.net JSON shape is only partially documented and fields come
//! and go between municipalities, so every field is optional and scalar
//! fields accept either string or number payloads. Normalization decides what
//! to do with the gaps; nothing here guesses.

use std::fmt;

use serde::Deserialize;

/// A scalar the upstream serializes as either a string or a number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ScalarField {
    Text(String),
    Number(f64),
}

impl fmt::Display for ScalarField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarField::Text(s) => f.write_str(s),
            ScalarField::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Raw weather record as returned by the upstream API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamWeatherRecord {
    #[serde(default)]
    pub municipio: Option<UpstreamMunicipio>,
    #[serde(default)]
    pub temperatura_actual: Option<ScalarField>,
    #[serde(default, rename = "stateSky")]
    pub state_sky: Option<UpstreamStateSky>,
    #[serde(default)]
    pub humedad: Option<ScalarField>,
    #[serde(default)]
    pub viento: Option<ScalarField>,
    #[serde(default)]
    pub temperaturas: Option<UpstreamTemperaturas>,
}

/// Municipality block. The name key has been observed in both spellings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamMunicipio {
    #[serde(default, rename = "NOMBRE", alias = "nombre")]
    pub nombre: Option<String>,
    #[serde(default, rename = "NOMBRE_PROVINCIA")]
    pub nombre_provincia: Option<String>,
}

/// Sky state block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamStateSky {
    #[serde(default)]
    pub description: Option<String>,
}

/// Daily min/max block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamTemperaturas {
    #[serde(default)]
    pub max: Option<ScalarField>,
    #[serde(default)]
    pub min: Option<ScalarField>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn full_record_deserializes() {
        let record: UpstreamWeatherRecord = serde_json::from_value(json!({
            "municipio": { "NOMBRE": "Santander", "NOMBRE_PROVINCIA": "Cantabria" },
            "temperatura_actual": "17",
            "stateSky": { "description": "Nuboso" },
            "humedad": 80,
            "viento": 12,
            "temperaturas": { "max": "19", "min": "11" }
        }))
        .unwrap();

        assert_eq!(
            record.municipio.as_ref().unwrap().nombre.as_deref(),
            Some("Santander")
        );
        assert_eq!(record.humedad.unwrap().to_string(), "80");
        assert_eq!(record.temperatura_actual.unwrap().to_string(), "17");
    }

    #[test]
    fn empty_object_deserializes_to_all_none() {
        let record: UpstreamWeatherRecord = serde_json::from_value(json!({})).unwrap();
        assert!(record.municipio.is_none());
        assert!(record.temperatura_actual.is_none());
        assert!(record.state_sky.is_none());
        assert!(record.humedad.is_none());
        assert!(record.viento.is_none());
        assert!(record.temperaturas.is_none());
    }

    #[test]
    fn lowercase_municipio_name_is_accepted() {
        let record: UpstreamWeatherRecord = serde_json::from_value(json!({
            "municipio": { "nombre": "Castro-Urdiales" }
        }))
        .unwrap();
        assert_eq!(
            record.municipio.unwrap().nombre.as_deref(),
            Some("Castro-Urdiales")
        );
    }

    #[test]
    fn scalar_numbers_render_without_trailing_zeroes() {
        let n = ScalarField::Number(18.0);
        assert_eq!(n.to_string(), "18");
        let n = ScalarField::Number(18.5);
        assert_eq!(n.to_string(), "18.5");
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let record: UpstreamWeatherRecord = serde_json::from_value(json!({
            "elaborado": "2024-05-01",
            "viento": "15"
        }))
        .unwrap();
        assert_eq!(record.viento.unwrap().to_string(), "15");
    }
}
