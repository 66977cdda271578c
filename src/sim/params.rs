//! ESC32 parameter table and its flash image.
//!
//! Values live in RAM; `write_flash` serialises them with postcard into a
//! fixed-size page and `read_flash` restores them. Slot 0 holds the layout
//! version, so an image written by a different layout is refused.

use heapless::Vec;
use log::{info, warn};

use crate::app::ports::ParamFormat::{Fixed, Sci};
use crate::app::ports::{FlashError, ParamFormat, ParamInfo};

/// Bytes available for the parameter image.
pub const FLASH_SIZE: usize = 512;

/// Layout version stored in slot 0.
pub const LAYOUT_VERSION: f32 = 2.0;

/// Static description of one parameter slot.
pub struct ParamDef {
    pub name: &'static str,
    pub default: f32,
    pub format: ParamFormat,
}

const fn def(name: &'static str, default: f32, format: ParamFormat) -> ParamDef {
    ParamDef { name, default, format }
}

pub static PARAMS: [ParamDef; 50] = [
    def("CONFIG_VERSION", LAYOUT_VERSION, Fixed(0)),
    def("STARTUP_MODE", 0.0, Fixed(0)),
    def("BAUD_RATE", 230_400.0, Fixed(0)),
    def("PTERM", 0.5, Fixed(3)),
    def("ITERM", 0.0006, Fixed(5)),
    def("FF1TERM", 0.0, Sci(3)),
    def("FF2TERM", 0.0, Sci(3)),
    def("CL1TERM", 0.0, Sci(3)),
    def("CL2TERM", 0.0, Sci(3)),
    def("CL3TERM", 0.0, Sci(3)),
    def("CL4TERM", 0.0, Sci(3)),
    def("CL5TERM", 0.0, Sci(3)),
    def("SHUNT_RESISTANCE", 0.5, Fixed(3)),
    def("MIN_PERIOD", 50.0, Fixed(0)),
    def("MAX_PERIOD", 12_000.0, Fixed(0)),
    def("BLANKING_MICROS", 30.0, Fixed(0)),
    def("ADVANCE", 10.0, Fixed(2)),
    def("START_VOLTAGE", 1.1, Fixed(3)),
    def("GOOD_DETECTS_START", 75.0, Fixed(0)),
    def("BAD_DETECTS_DISARM", 48.0, Fixed(0)),
    def("MAX_CURRENT", 20.0, Fixed(1)),
    def("SWITCH_FREQ", 20.0, Fixed(0)),
    def("MOTOR_POLES", 14.0, Fixed(0)),
    def("PWM_MIN_PERIOD", 2200.0, Fixed(0)),
    def("PWM_MAX_PERIOD", 25_000.0, Fixed(0)),
    def("PWM_MIN_VALUE", 750.0, Fixed(0)),
    def("PWM_LO_VALUE", 1100.0, Fixed(0)),
    def("PWM_HI_VALUE", 1900.0, Fixed(0)),
    def("PWM_MAX_VALUE", 2250.0, Fixed(0)),
    def("PWM_MIN_START", 1100.0, Fixed(0)),
    def("PWM_RPM_SCALE", 6500.0, Fixed(0)),
    def("FET_BRAKING", 0.0, Fixed(0)),
    def("PNFAC", 0.0, Sci(3)),
    def("INFAC", 0.0, Sci(3)),
    def("THR1TERM", 0.0, Fixed(3)),
    def("THR2TERM", 1.0, Fixed(3)),
    def("START_ALIGN_TIME", 600.0, Fixed(0)),
    def("START_ALIGN_VOLTAGE", 0.9, Fixed(3)),
    def("START_STEPS_NUM", 0.0, Fixed(0)),
    def("START_STEPS_PERIOD", 0.0, Fixed(0)),
    def("START_STEPS_ACCEL", 0.0, Fixed(0)),
    def("PWM_LOWPASS", 0.0, Fixed(2)),
    def("RPM_MEAS_LP", 0.5, Fixed(2)),
    def("SERVO_DUTY", 16.0, Fixed(0)),
    def("SERVO_P", 0.05, Fixed(3)),
    def("SERVO_D", 0.0, Fixed(3)),
    def("SERVO_MAX_RATE", 1000.0, Fixed(0)),
    def("SERVO_SCALE", 360.0, Fixed(0)),
    def("ESC_ID", 0.0, Fixed(0)),
    def("DIRECTION", 1.0, Fixed(0)),
];

/// Number of parameter slots.
pub const NUM_PARAMS: usize = PARAMS.len();

/// Slot indices the simulator reads.
pub mod id {
    pub const CONFIG_VERSION: usize = 0;
    pub const PTERM: usize = 3;
    pub const ITERM: usize = 4;
    pub const FF1TERM: usize = 5;
    pub const FF2TERM: usize = 6;
    pub const START_VOLTAGE: usize = 17;
    pub const MOTOR_POLES: usize = 22;
    pub const PWM_LO_VALUE: usize = 26;
    pub const PWM_HI_VALUE: usize = 27;
    pub const PWM_RPM_SCALE: usize = 30;
    pub const START_ALIGN_TIME: usize = 36;
    pub const START_ALIGN_VOLTAGE: usize = 37;
    pub const SERVO_SCALE: usize = 47;
}

// ---------------------------------------------------------------------------
// Parameter store
// ---------------------------------------------------------------------------

pub struct ParamStore {
    values: [f32; NUM_PARAMS],
    flash: Vec<u8, FLASH_SIZE>,
    write_protect: bool,
}

impl ParamStore {
    /// Defaults in RAM, erased flash.
    pub fn new() -> Self {
        Self {
            values: defaults(),
            flash: Vec::new(),
            write_protect: false,
        }
    }

    pub fn count(&self) -> usize {
        NUM_PARAMS
    }

    /// Case-insensitive exact name match.
    pub fn id(&self, name: &str) -> Option<usize> {
        PARAMS.iter().position(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn info(&self, id: usize) -> Option<ParamInfo> {
        PARAMS.get(id).map(|p| ParamInfo {
            name: p.name,
            format: p.format,
        })
    }

    pub fn get(&self, id: usize) -> f32 {
        self.values.get(id).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, id: usize, value: f32) {
        if let Some(slot) = self.values.get_mut(id) {
            *slot = value;
        }
    }

    pub fn load_defaults(&mut self) {
        self.values = defaults();
        info!("parameters reset to defaults");
    }

    /// Restore RAM values from the flash image. An erased or foreign image
    /// leaves the defaults in place.
    pub fn read_flash(&mut self) {
        match decode(&self.flash) {
            Some(values) => {
                self.values = values;
                info!("parameters read from flash");
            }
            None => {
                warn!("no valid parameter image in flash, loading defaults");
                self.values = defaults();
            }
        }
    }

    pub fn write_flash(&mut self) -> Result<(), FlashError> {
        if self.write_protect {
            return Err(FlashError::Program);
        }
        let mut page = [0u8; FLASH_SIZE];
        let used = postcard::to_slice(&self.values[..], &mut page)
            .map_err(|_| FlashError::Overflow)?
            .len();
        self.flash.clear();
        self.flash
            .extend_from_slice(&page[..used])
            .map_err(|()| FlashError::Overflow)?;
        info!("parameters written to flash ({used} bytes)");
        Ok(())
    }

    /// Raw flash page contents, for persisting outside the simulator.
    pub fn flash_image(&self) -> &[u8] {
        &self.flash
    }

    /// Replace the flash page contents. Returns `false` when the image is
    /// too large or does not decode for this layout; flash is left erased.
    pub fn load_flash_image(&mut self, image: &[u8]) -> bool {
        self.flash.clear();
        if self.flash.extend_from_slice(image).is_err() || decode(&self.flash).is_none() {
            self.flash.clear();
            return false;
        }
        true
    }

    /// Make the next flash writes fail, as a worn or locked page would.
    pub fn set_write_protect(&mut self, on: bool) {
        self.write_protect = on;
    }
}

impl Default for ParamStore {
    fn default() -> Self {
        Self::new()
    }
}

fn defaults() -> [f32; NUM_PARAMS] {
    core::array::from_fn(|i| PARAMS[i].default)
}

fn decode(image: &[u8]) -> Option<[f32; NUM_PARAMS]> {
    let stored: Vec<f32, NUM_PARAMS> = postcard::from_bytes(image).ok()?;
    if stored.len() != NUM_PARAMS || stored[id::CONFIG_VERSION] != LAYOUT_VERSION {
        return None;
    }
    let mut values = [0.0; NUM_PARAMS];
    values.copy_from_slice(&stored);
    Some(values)
}
