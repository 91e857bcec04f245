//! AQI severity scale and classification
//!
//! This module contains the static AQI tier table and the classification
//! helpers used everywhere a numeric AQI or a category label needs to be
//! mapped to display attributes and health advice.

use serde::Serialize;

/// One tier of the AQI severity scale
///
/// Uses `&'static str` for string fields to allow static initialization of
/// the AQI_LEVELS array. Tiers are contiguous and non-overlapping, covering
/// `[0, ∞)`; the last tier has no upper bound (`max` is `f64::INFINITY`).
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AqiLevel {
    /// Unique slug for the tier (e.g. "good", "hazardous")
    pub id: &'static str,
    /// Human-readable name of the tier
    pub name: &'static str,
    /// Inclusive lower bound of the AQI range
    pub min: f64,
    /// Exclusive upper bound of the AQI range
    pub max: f64,
    /// Primary display color (hex)
    pub color: &'static str,
    /// Background display color (hex)
    pub background_color: &'static str,
    /// Icon key for the presentation layer
    pub icon: &'static str,
}

/// Static array of all AQI tiers, ordered by severity
pub static AQI_LEVELS: [AqiLevel; 6] = [
    AqiLevel {
        id: "good",
        name: "Good",
        min: 0.0,
        max: 50.0,
        color: "#22c55e",
        background_color: "#f0fdf4",
        icon: "smile",
    },
    AqiLevel {
        id: "satisfactory",
        name: "Satisfactory",
        min: 50.0,
        max: 100.0,
        color: "#fbbf24",
        background_color: "#fffbeb",
        icon: "meh",
    },
    AqiLevel {
        id: "moderate",
        name: "Moderate",
        min: 100.0,
        max: 150.0,
        color: "#fb923c",
        background_color: "#fff7ed",
        icon: "meh",
    },
    AqiLevel {
        id: "poor",
        name: "Poor",
        min: 150.0,
        max: 200.0,
        color: "#ef4444",
        background_color: "#fef2f2",
        icon: "frown",
    },
    AqiLevel {
        id: "severe",
        name: "Severe",
        min: 200.0,
        max: 300.0,
        color: "#b91c1c",
        background_color: "#fef2f2",
        icon: "frown",
    },
    AqiLevel {
        id: "hazardous",
        name: "Hazardous",
        min: 300.0,
        max: f64::INFINITY,
        color: "#8b4513",
        background_color: "#fef2f2",
        icon: "alert-triangle",
    },
];

/// Legacy category names still produced by some upstream data sources,
/// mapped onto current tier ids
const LEGACY_NAMES: [(&str, &str); 6] = [
    ("satisfactory", "moderate"),
    ("moderately polluted", "poor"),
    ("very poor", "severe"),
    ("very unhealthy", "severe"),
    ("unhealthy for sensitive groups", "poor"),
    ("unhealthy for sensitive", "poor"),
];

/// Classifies a numeric AQI value into its tier
///
/// Negative or non-finite values (NaN) are treated as invalid and default to
/// the lowest tier ("Good"). Values beyond every tier's range return the last
/// (highest-severity) tier.
///
/// # Example
///
/// ```
/// use vaayu::aqi::level_for_value;
///
/// assert_eq!(level_for_value(42.0).id, "good");
/// assert_eq!(level_for_value(512.0).id, "hazardous");
/// ```
pub fn level_for_value(value: f64) -> &'static AqiLevel {
    if !value.is_finite() || value < 0.0 {
        return &AQI_LEVELS[0];
    }

    for level in &AQI_LEVELS {
        if value >= level.min && value < level.max {
            return level;
        }
    }

    // Unreachable while the last tier is unbounded, but kept as the
    // documented "beyond all ranges" fallback
    &AQI_LEVELS[AQI_LEVELS.len() - 1]
}

/// Resolves a category label (possibly a legacy name) to its tier
///
/// The label is trimmed and case-folded, remapped through the legacy-name
/// table, then matched against tier ids and names, falling back to substring
/// containment. Unknown labels resolve to the "Good" tier rather than
/// erroring; unrecognized categories silently degrade to the least-severe
/// display.
pub fn level_for_name(label: &str) -> &'static AqiLevel {
    let name = label.trim().to_lowercase();
    if name.is_empty() {
        return &AQI_LEVELS[0];
    }

    let mapped = LEGACY_NAMES
        .iter()
        .find(|(legacy, _)| *legacy == name)
        .map(|(_, target)| *target)
        .unwrap_or(&name);

    AQI_LEVELS
        .iter()
        .find(|level| {
            let lower = level.name.to_lowercase();
            level.id == mapped
                || lower == mapped
                || lower.contains(mapped)
                || level.id == name
                || lower == name
                || lower.contains(name.as_str())
        })
        .unwrap_or(&AQI_LEVELS[0])
}

/// Returns the fixed pair of health advisories for an AQI value
///
/// The boundaries match the tier table; used for display only.
pub fn health_recommendations(value: f64) -> [&'static str; 2] {
    if value <= 50.0 {
        [
            "Air quality is excellent.",
            "Perfect for outdoor activities.",
        ]
    } else if value <= 100.0 {
        [
            "Air quality is acceptable.",
            "Limit prolonged outdoor exertion.",
        ]
    } else if value <= 150.0 {
        [
            "Unhealthy for sensitive groups.",
            "Limit outdoor activities if sensitive.",
        ]
    } else if value <= 200.0 {
        [
            "Unhealthy for everyone.",
            "Avoid prolonged outdoor activities.",
        ]
    } else if value <= 300.0 {
        [
            "Very unhealthy for everyone.",
            "Avoid all outdoor activities.",
        ]
    } else {
        [
            "Hazardous air quality.",
            "Stay indoors and keep windows closed.",
        ]
    }
}

/// Formats a tier's numeric range for display (e.g. "0-50", "300+")
pub fn range_label(level: &AqiLevel) -> String {
    if level.max.is_infinite() {
        format!("{}+", level.min as u32)
    } else {
        format!("{}-{}", level.min as u32, level.max as u32)
    }
}

/// Rounds an AQI value for display, treating NaN as 0
pub fn format_value(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round() as u32
    } else {
        0
    }
}

/// A tier entry prepared for gauge/meter rendering, with the unbounded
/// tier capped at a finite maximum
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MeterLevel {
    pub name: &'static str,
    pub max: f64,
    pub color: &'static str,
}

/// Upper bound used in place of infinity when rendering the gauge
const METER_CAP: f64 = 400.0;

/// Returns the tier table formatted for gauge display
pub fn meter_levels() -> Vec<MeterLevel> {
    AQI_LEVELS
        .iter()
        .map(|level| MeterLevel {
            name: level.name,
            max: if level.max.is_infinite() {
                METER_CAP
            } else {
                level.max
            },
            color: level.color,
        })
        .collect()
}

/// Returns the display color for an AQI value
pub fn color_for_value(value: f64) -> &'static str {
    level_for_value(value).color
}

/// Returns the background color for an AQI value
pub fn background_for_value(value: f64) -> &'static str {
    level_for_value(value).background_color
}
