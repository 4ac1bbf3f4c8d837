//! Indoor air-quality classification and ventilation advice.
//!
//! Bands follow the Hong Kong Indoor Air Quality Management Group guide
//! (<https://www.iaq.gov.hk/media/65346/new-iaq-guide_eng.pdf>).  They are
//! domain constants, not configuration.
//!
//! Outdoor bands follow the US EPA AQI as reported by IQAir:
//! `<= 50` good, `51..=100` moderate, `> 100` unhealthy.

use crate::readings::ECO2_FLOOR;

/// eCO2 above this (ppm) is bad.
pub const ECO2_BAD_PPM: u32 = 1000;
/// eCO2 above this (ppm) is medium.
pub const ECO2_MEDIUM_PPM: u32 = 800;
/// TVOC above this (ppb) is bad.
pub const TVOC_BAD_PPB: u32 = 261;
/// TVOC above this (ppb) is medium.
pub const TVOC_MEDIUM_PPB: u32 = 87;

/// Indoor air-quality category.  Derived every tick, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AirQualityLevel {
    Good,
    Medium,
    Bad,
    Unknown,
}

impl AirQualityLevel {
    /// Severity rank; `Unknown` ranks lowest.
    pub fn severity(self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::Good => 1,
            Self::Medium => 2,
            Self::Bad => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Medium => "medium",
            Self::Bad => "bad",
            Self::Unknown => "unknown",
        }
    }
}

/// Classify a gas reading.  Either value missing yields `Unknown`.
pub fn classify(eco2: Option<u32>, tvoc: Option<u32>) -> AirQualityLevel {
    let (Some(eco2), Some(tvoc)) = (eco2, tvoc) else {
        return AirQualityLevel::Unknown;
    };
    if eco2 > ECO2_BAD_PPM || tvoc > TVOC_BAD_PPB {
        AirQualityLevel::Bad
    } else if eco2 > ECO2_MEDIUM_PPM || tvoc > TVOC_MEDIUM_PPB {
        AirQualityLevel::Medium
    } else {
        AirQualityLevel::Good
    }
}

/// Display text for an eCO2 value.  The warm-up floor is shown as `<400`.
pub fn eco2_label(eco2: u32) -> String {
    if eco2 <= ECO2_FLOOR {
        format!("<{ECO2_FLOOR}")
    } else {
        eco2.to_string()
    }
}

// ---------------------------------------------------------------------------
// Outdoor bands and advice
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutdoorBand {
    Good,
    Moderate,
    Unhealthy,
}

impl OutdoorBand {
    pub fn from_aqi(aqi: u32) -> Self {
        match aqi {
            0..=50 => Self::Good,
            51..=100 => Self::Moderate,
            _ => Self::Unhealthy,
        }
    }
}

/// What to do about the windows, given indoor and outdoor air.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advice {
    /// Indoor air is poor and outdoor air is fine: open up.
    Ventilate,
    /// Indoor air is bad; outdoor is only moderate, airing out is still worth it.
    VentilateDespiteOutdoor,
    /// Outdoor air is worse than what airing out would fix.
    KeepClosed,
    /// Both sides are poor; nothing to gain.
    Endure,
    /// Clean air inside and out.
    AllClear,
    /// No indoor reading yet.
    WarmingUp,
}

impl Advice {
    pub fn message(self) -> &'static str {
        match self {
            Self::Ventilate => "indoor air is stale, open a window",
            Self::VentilateDespiteOutdoor => {
                "indoor air is bad; outdoor air is not great either but ventilating still helps"
            }
            Self::KeepClosed => "outdoor air is poor, keep the windows closed",
            Self::Endure => "air is poor both inside and outside",
            Self::AllClear => "air is clean",
            Self::WarmingUp => "still warming up, no indoor data yet",
        }
    }
}

/// Combine the indoor level with the outdoor AQI.
pub fn advise(indoor: AirQualityLevel, outdoor_aqi: u32) -> Advice {
    let outdoor = OutdoorBand::from_aqi(outdoor_aqi);
    match (indoor, outdoor) {
        (AirQualityLevel::Unknown, _) => Advice::WarmingUp,
        (AirQualityLevel::Bad, OutdoorBand::Unhealthy) => Advice::Endure,
        (AirQualityLevel::Bad, OutdoorBand::Moderate) => Advice::VentilateDespiteOutdoor,
        (AirQualityLevel::Medium, OutdoorBand::Unhealthy) => Advice::KeepClosed,
        (AirQualityLevel::Medium, OutdoorBand::Moderate) => Advice::Endure,
        (AirQualityLevel::Bad | AirQualityLevel::Medium, OutdoorBand::Good) => Advice::Ventilate,
        (AirQualityLevel::Good, OutdoorBand::Good) => Advice::AllClear,
        (AirQualityLevel::Good, _) => Advice::KeepClosed,
    }
}
