//! Simulated monitor hardware for host runs.
//!
//! Stands in for the SGP30, the LTR-559 and the panel when no device is
//! attached.  Readings are deterministic: the gas sensor sits on its
//! warm-up floor for [`WARMUP_READS`] reads, then eCO2 and TVOC sweep a
//! triangle wave through the good, medium and bad bands.  Someone "walks
//! past" the proximity sensor every [`VISIT_PERIOD`] reads.

use log::debug;

use crate::app::ports::{DisplayPort, GasSensorPort, ProximityPort};
use crate::baseline::BaselineValues;
use crate::error::SensorError;
use crate::fsm::frame::Frame;
use crate::readings::{ECO2_FLOOR, GasSample, ProximityReading};

pub const WARMUP_READS: u64 = 15;
pub const VISIT_PERIOD: u64 = 45;

/// Reads per half period of the gas sweep.
const SWEEP_HALF: u64 = 120;
const ECO2_PEAK: u32 = 1400;
const TVOC_PEAK: u32 = 400;
const PRESENT_PROXIMITY: u32 = 120;

#[derive(Debug)]
pub struct SimulatedHardware {
    initialised: bool,
    gas_reads: u64,
    proximity_reads: u64,
    baseline: BaselineValues,
    backlight: bool,
}

impl Default for SimulatedHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedHardware {
    pub fn new() -> Self {
        Self {
            initialised: false,
            gas_reads: 0,
            proximity_reads: 0,
            baseline: BaselineValues { eco2: 0x8973, tvoc: 0x8aae },
            backlight: false,
        }
    }

    pub fn backlight(&self) -> bool {
        self.backlight
    }

    fn sweep(&self, peak: u32, floor: u32) -> u32 {
        let phase = (self.gas_reads - WARMUP_READS) % (2 * SWEEP_HALF);
        let rising = if phase < SWEEP_HALF { phase } else { 2 * SWEEP_HALF - phase };
        floor + ((peak - floor) as u64 * rising / SWEEP_HALF) as u32
    }
}

impl GasSensorPort for SimulatedHardware {
    fn init(&mut self) -> Result<(), SensorError> {
        self.initialised = true;
        debug!("sim: IAQ algorithm started");
        Ok(())
    }

    fn read_gas(&mut self) -> Result<GasSample, SensorError> {
        if !self.initialised {
            return Err(SensorError::ReadFailed);
        }
        self.gas_reads += 1;
        if self.gas_reads <= WARMUP_READS {
            return Ok(GasSample { eco2: ECO2_FLOOR, tvoc: 0 });
        }
        Ok(GasSample {
            eco2: self.sweep(ECO2_PEAK, ECO2_FLOOR + 20),
            tvoc: self.sweep(TVOC_PEAK, 10),
        })
    }

    fn baseline(&mut self) -> Result<BaselineValues, SensorError> {
        Ok(self.baseline)
    }

    fn set_baseline(&mut self, values: BaselineValues) -> Result<(), SensorError> {
        debug!("sim: baseline set to 0x{:x}/0x{:x}", values.eco2, values.tvoc);
        self.baseline = values;
        Ok(())
    }
}

impl ProximityPort for SimulatedHardware {
    fn read_proximity(&mut self) -> Result<ProximityReading, SensorError> {
        self.proximity_reads += 1;
        let present = self.proximity_reads % VISIT_PERIOD < 2;
        Ok(ProximityReading {
            lux: 180.0,
            proximity: if present { PRESENT_PROXIMITY } else { 0 },
        })
    }
}

impl DisplayPort for SimulatedHardware {
    fn set_backlight(&mut self, on: bool) {
        self.backlight = on;
        debug!("sim: backlight {}", if on { "on" } else { "off" });
    }

    fn render(&mut self, frame: &Frame) {
        debug!("sim: render {:?}", frame);
    }
}
