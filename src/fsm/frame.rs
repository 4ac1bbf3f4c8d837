//! Display frames and colour schemes.
//!
//! A [`Frame`] is a description of what to draw, not pixels; the display
//! adapter owns fonts, layout and the background image.

use crate::air_quality::{AirQualityLevel, eco2_label};
use crate::readings::SensorReading;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Self = Self(255, 255, 255);
    pub const BLACK: Self = Self(0, 0, 0);
    pub const RED: Self = Self(255, 0, 0);
    pub const YELLOW: Self = Self(255, 255, 0);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    Solid(Rgb),
    /// The stock background image.
    Image,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorScheme {
    pub text: Rgb,
    pub background: Background,
}

impl ColorScheme {
    pub fn for_level(level: AirQualityLevel) -> Self {
        match level {
            AirQualityLevel::Bad => Self {
                text: Rgb::WHITE,
                background: Background::Solid(Rgb::RED),
            },
            AirQualityLevel::Medium => Self {
                text: Rgb::BLACK,
                background: Background::Solid(Rgb::YELLOW),
            },
            AirQualityLevel::Good | AirQualityLevel::Unknown => Self {
                text: Rgb::WHITE,
                background: Background::Image,
            },
        }
    }
}

/// A labelled numeric field, e.g. `CO2` / `<400` / `ppm`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub label: &'static str,
    pub value: String,
    pub unit: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Shown while the sensor warms up.
    Splash,
    Reading {
        scheme: ColorScheme,
        co2: Field,
        voc: Field,
    },
}

impl Frame {
    pub fn reading(scheme: ColorScheme, reading: &SensorReading) -> Self {
        Self::Reading {
            scheme,
            co2: Field {
                label: "CO2",
                value: eco2_label(reading.eco2),
                unit: "ppm",
            },
            voc: Field {
                label: "VOC",
                value: reading.tvoc.to_string(),
                unit: "ppb",
            },
        }
    }
}
