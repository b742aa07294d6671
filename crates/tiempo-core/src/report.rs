//! Normalized weather reports.
//!
//! One canonical output shape regardless of where the data came from. Field
//! names follow the wire contract the UI consumes (Spanish data fields,
//! camelCase diagnostics). Every absent upstream field renders as an explicit
//! placeholder string, never as a missing key.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tiempo_proxy::TransportKind;

use crate::mock::MockWeatherEntry;
use crate::upstream::UpstreamWeatherRecord;

/// Placeholder for upstream fields that were absent.
pub const NOT_AVAILABLE: &str = "No disponible";

/// The upstream API does not carry pressure at all.
pub const PRESSURE_NOT_IN_API: &str = "No disponible en esta API";

/// Where a report's data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    ExternalApi,
    MockData,
}

/// Formatted daily min/max pair.
#[derive(Debug, Clone, Serialize)]
pub struct TemperatureRange {
    pub maxima: String,
    pub minima: String,
}

/// Diagnostics attached to a report built from a live upstream response.
#[derive(Debug, Clone)]
pub struct FetchDiagnostics {
    pub proxy_used: bool,
    pub transport: TransportKind,
    pub processing_millis: f64,
    /// Attach the raw upstream JSON (verbose diagnostics only).
    pub raw_data: Option<serde_json::Value>,
}

/// The canonical weather result handed back to the API layer.
///
/// Constructed once and never mutated. `data_source` is always exactly one of
/// the two tags, and mock reports always carry a note explaining why.
#[derive(Debug, Clone, Serialize)]
pub struct WeatherReport {
    pub success: bool,
    pub municipio: String,
    pub provincia: String,
    #[serde(rename = "codigoPostal")]
    pub codigo_postal: String,
    pub temperatura: String,
    pub descripcion: String,
    pub humedad: String,
    pub viento: String,
    pub presion: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperaturas: Option<TemperatureRange>,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "dataSource")]
    pub data_source: DataSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(rename = "processingTime", skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<String>,
    #[serde(rename = "proxyUsed", skip_serializing_if = "Option::is_none")]
    pub proxy_used: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport: Option<TransportKind>,
    #[serde(rename = "errorDetails", skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
    #[serde(rename = "rawData", skip_serializing_if = "Option::is_none")]
    pub raw_data: Option<serde_json::Value>,
}

impl WeatherReport {
    /// Normalizes a live upstream record.
    pub fn from_upstream(
        record: &UpstreamWeatherRecord,
        postal_code: &str,
        diagnostics: FetchDiagnostics,
    ) -> Self {
        let municipio = record
            .municipio
            .as_ref()
            .and_then(|m| m.nombre.clone())
            .unwrap_or_else(|| "Municipio desconocido".to_string());
        let provincia = record
            .municipio
            .as_ref()
            .and_then(|m| m.nombre_provincia.clone())
            .unwrap_or_else(|| "Cantabria".to_string());

        let temperaturas = record.temperaturas.as_ref().map(|t| TemperatureRange {
            maxima: t
                .max
                .as_ref()
                .map(|v| format!("{v}°C"))
                .unwrap_or_else(|| "N/A".to_string()),
            minima: t
                .min
                .as_ref()
                .map(|v| format!("{v}°C"))
                .unwrap_or_else(|| "N/A".to_string()),
        });

        Self {
            success: true,
            municipio,
            provincia,
            codigo_postal: postal_code.to_string(),
            temperatura: format_or_placeholder(record.temperatura_actual.as_ref(), "°C"),
            descripcion: record
                .state_sky
                .as_ref()
                .and_then(|s| s.description.clone())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            humedad: format_or_placeholder(record.humedad.as_ref(), "%"),
            viento: format_or_placeholder(record.viento.as_ref(), " km/h"),
            presion: PRESSURE_NOT_IN_API.to_string(),
            temperaturas,
            timestamp: Utc::now(),
            data_source: DataSource::ExternalApi,
            note: None,
            processing_time: Some(format!("{:.2}ms", diagnostics.processing_millis)),
            proxy_used: Some(diagnostics.proxy_used),
            transport: Some(diagnostics.transport),
            error_details: None,
            raw_data: diagnostics.raw_data,
        }
    }

    /// Builds a report from a canned mock entry.
    ///
    /// The note is mandatory: every mock report explains why canned data was
    /// served.
    pub fn from_mock(
        entry: &MockWeatherEntry,
        postal_code: &str,
        note: &str,
        error_details: Option<String>,
    ) -> Self {
        Self {
            success: true,
            municipio: entry.municipio.to_string(),
            provincia: entry.provincia.to_string(),
            codigo_postal: postal_code.to_string(),
            temperatura: entry.temperatura.to_string(),
            descripcion: entry.descripcion.to_string(),
            humedad: entry.humedad.to_string(),
            viento: entry.viento.to_string(),
            presion: entry.presion.to_string(),
            temperaturas: None,
            timestamp: Utc::now(),
            data_source: DataSource::MockData,
            note: Some(note.to_string()),
            processing_time: None,
            proxy_used: None,
            transport: None,
            error_details,
            raw_data: None,
        }
    }
}

fn format_or_placeholder(value: Option<&crate::upstream::ScalarField>, unit: &str) -> String {
    value
        .map(|v| format!("{v}{unit}"))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock;

    fn diagnostics() -> FetchDiagnostics {
        FetchDiagnostics {
            proxy_used: false,
            transport: TransportKind::DirectHttps,
            processing_millis: 12.5,
            raw_data: None,
        }
    }

    #[test]
    fn full_record_formats_units() {
        let record: UpstreamWeatherRecord = serde_json::from_value(serde_json::json!({
            "municipio": { "NOMBRE": "Santander", "NOMBRE_PROVINCIA": "Cantabria" },
            "temperatura_actual": "17",
            "stateSky": { "description": "Nuboso" },
            "humedad": 80,
            "viento": 12,
            "temperaturas": { "max": 19, "min": 11 }
        }))
        .unwrap();

        let report = WeatherReport::from_upstream(&record, "39002", diagnostics());
        assert_eq!(report.temperatura, "17°C");
        assert_eq!(report.humedad, "80%");
        assert_eq!(report.viento, "12 km/h");
        assert_eq!(report.presion, PRESSURE_NOT_IN_API);
        let temps = report.temperaturas.unwrap();
        assert_eq!(temps.maxima, "19°C");
        assert_eq!(temps.minima, "11°C");
        assert_eq!(report.data_source, DataSource::ExternalApi);
        assert_eq!(report.proxy_used, Some(false));
        assert_eq!(report.processing_time.as_deref(), Some("12.50ms"));
    }

    #[test]
    fn missing_fields_render_placeholders_not_omissions() {
        let record = UpstreamWeatherRecord::default();
        let report = WeatherReport::from_upstream(&record, "39002", diagnostics());

        assert_eq!(report.municipio, "Municipio desconocido");
        assert_eq!(report.provincia, "Cantabria");
        assert_eq!(report.temperatura, NOT_AVAILABLE);
        assert_eq!(report.descripcion, NOT_AVAILABLE);
        assert_eq!(report.humedad, NOT_AVAILABLE);
        assert_eq!(report.viento, NOT_AVAILABLE);
        assert!(report.temperaturas.is_none());
    }

    #[test]
    fn missing_wind_only_renders_placeholder() {
        let record: UpstreamWeatherRecord = serde_json::from_value(serde_json::json!({
            "municipio": { "NOMBRE": "Santander" },
            "temperatura_actual": "17"
        }))
        .unwrap();
        let report = WeatherReport::from_upstream(&record, "39002", diagnostics());
        assert_eq!(report.viento, NOT_AVAILABLE);
        assert_eq!(report.temperatura, "17°C");
    }

    #[test]
    fn partial_temperature_range_uses_na() {
        let record: UpstreamWeatherRecord = serde_json::from_value(serde_json::json!({
            "temperaturas": { "max": "19" }
        }))
        .unwrap();
        let report = WeatherReport::from_upstream(&record, "39001", diagnostics());
        let temps = report.temperaturas.unwrap();
        assert_eq!(temps.maxima, "19°C");
        assert_eq!(temps.minima, "N/A");
    }

    #[test]
    fn mock_reports_always_carry_a_note() {
        let entry = mock::lookup("39001").unwrap();
        let report = WeatherReport::from_mock(entry, "39001", "canned", None);
        assert_eq!(report.data_source, DataSource::MockData);
        assert!(report.note.is_some());
        assert_eq!(report.municipio, "Alfoz de Lloredo");
        assert!(report.proxy_used.is_none());
    }

    #[test]
    fn data_source_tags_serialize_to_wire_names() {
        assert_eq!(
            serde_json::to_value(DataSource::ExternalApi).unwrap(),
            "external_api"
        );
        assert_eq!(
            serde_json::to_value(DataSource::MockData).unwrap(),
            "mock_data"
        );
    }

    #[test]
    fn wire_field_names_match_contract() {
        let entry = mock::lookup("39003").unwrap();
        let report = WeatherReport::from_mock(entry, "39003", "canned", None);
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["codigoPostal"], "39003");
        assert_eq!(value["dataSource"], "mock_data");
        assert_eq!(value["success"], true);
        // Diagnostics absent on mock reports, not null
        assert!(value.get("proxyUsed").is_none());
        assert!(value.get("processingTime").is_none());
    }
}
