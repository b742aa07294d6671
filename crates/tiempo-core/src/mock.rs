//! Static fallback dataset.
//!
//! Canned weather for a handful of Cantabrian postal codes, served when the
//! upstream API is unreachable or has no record for one of them. Loaded once,
//! read-only for the process lifetime.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// One canned weather entry.
#[derive(Debug, Clone)]
pub struct MockWeatherEntry {
    pub municipio: &'static str,
    pub provincia: &'static str,
    pub temperatura: &'static str,
    pub descripcion: &'static str,
    pub humedad: &'static str,
    pub viento: &'static str,
    pub presion: &'static str,
}

static MOCK_WEATHER: Lazy<HashMap<&'static str, MockWeatherEntry>> = Lazy::new(|| {
    HashMap::from([
        (
            "39001",
            MockWeatherEntry {
                municipio: "Alfoz de Lloredo",
                provincia: "Cantabria",
                temperatura: "18°C",
                descripcion: "Parcialmente nublado",
                humedad: "75%",
                viento: "15 km/h NE",
                presion: "1015 hPa",
            },
        ),
        (
            "39002",
            MockWeatherEntry {
                municipio: "Santander",
                provincia: "Cantabria",
                temperatura: "17°C",
                descripcion: "Nublado",
                humedad: "80%",
                viento: "12 km/h N",
                presion: "1012 hPa",
            },
        ),
        (
            "39003",
            MockWeatherEntry {
                municipio: "Castro-Urdiales",
                provincia: "Cantabria",
                temperatura: "19°C",
                descripcion: "Soleado",
                humedad: "65%",
                viento: "8 km/h E",
                presion: "1018 hPa",
            },
        ),
    ])
});

/// Looks up the canned entry for a postal code.
pub fn lookup(postal_code: &str) -> Option<&'static MockWeatherEntry> {
    MOCK_WEATHER.get(postal_code)
}

/// Postal codes with canned data, sorted, for diagnostics and suggestions.
pub fn known_codes() -> Vec<&'static str> {
    let mut codes: Vec<_> = MOCK_WEATHER.keys().copied().collect();
    codes.sort_unstable();
    codes
}
