//! Platform-agnostic types for air-quality telemetry.
//!
//! This crate provides the data types shared by the monitoring engine
//! (airwatch-core) and its renderers.
//!
//! # Features
//!
//! - Source readings and display-frame readings
//! - Severity bands with display colors
//! - The wire record served by the readings endpoint
//! - Timestamp parsing for the endpoint's ISO-8601 strings
//!
//! # Example
//!
//! ```
//! use airwatch_types::{Band, Reading, WireReading};
//!
//! let wire = WireReading { valor: 250.0, fecha: "2025-01-01T12:00:00".into() };
//! let reading = Reading::try_from(wire).unwrap();
//! assert_eq!(reading.value, 250.0);
//! assert!(Band::Good < Band::Bad);
//! ```

pub mod error;
pub mod types;

pub use error::{ParseError, ParseResult};
pub use types::{
    Band, DisplayColor, NormalizedReading, Reading, WireReading, parse_source_timestamp,
};

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn test_wire_reading_deserialize() {
        let json = r#"{"valor": 512.25, "fecha": "2025-01-01T12:00:00.5", "id": 7}"#;
        let wire: WireReading = serde_json::from_str(json).unwrap();
        assert_eq!(wire.valor, 512.25);
        assert_eq!(wire.fecha, "2025-01-01T12:00:00.5");
    }

    #[test]
    fn test_wire_reading_integer_value() {
        let json = r#"{"valor": 300, "fecha": "2025-01-01T12:00:00"}"#;
        let wire: WireReading = serde_json::from_str(json).unwrap();
        assert_eq!(wire.valor, 300.0);
    }

    #[test]
    fn test_wire_reading_missing_field() {
        let json = r#"{"valor": 300}"#;
        assert!(serde_json::from_str::<WireReading>(json).is_err());
    }

    #[test]
    fn test_band_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Band::Medium).unwrap(), "\"medium\"");
        let band: Band = serde_json::from_str("\"bad\"").unwrap();
        assert_eq!(band, Band::Bad);
    }

    #[test]
    fn test_reading_serializes_rfc3339() {
        let reading = Reading::new(
            100.0,
            parse_source_timestamp("2025-01-01T12:00:00Z").unwrap(),
        );
        let json = serde_json::to_value(reading).unwrap();
        assert_eq!(json["timestamp"], "2025-01-01T12:00:00Z");
        assert_eq!(json["value"], 100.0);
    }
}
