/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! Runtime controls and their mode-dependent ranges.
//!
//! Vertical blanking and exposure are coupled: the frame length
//! (`mode.height + vblank`) caps the exposure, so changing either the mode
//! or vblank recomputes the exposure range. Horizontal blanking follows
//! from the mode width and cannot be set directly.
//!
//! This module only tracks values; the driver decides when the
//! corresponding register writes reach the device.

use crate::mode::Mode;
use crate::port::{RegWrite, Width};
use crate::regs::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlId {
    PixelRate,
    Vblank,
    Hblank,
    Exposure,
    AnalogGain,
    DigitalGain,
    Hflip,
    Vflip,
    TestPattern,
    TestPatternRed,
    TestPatternGreenR,
    TestPatternBlue,
    TestPatternGreenB,
}

const NUM_CONTROLS: usize = 13;

/// Order in which control values are pushed to the device on stream start.
/// `Hflip` writes the orientation register, which carries both flips.
static REPLAY_ORDER: [ControlId; 10] = [
    ControlId::Vblank,
    ControlId::Exposure,
    ControlId::AnalogGain,
    ControlId::DigitalGain,
    ControlId::Hflip,
    ControlId::TestPattern,
    ControlId::TestPatternRed,
    ControlId::TestPatternGreenR,
    ControlId::TestPatternBlue,
    ControlId::TestPatternGreenB,
];

pub const TEST_PATTERN_MENU: [&str; 5] = [
    "Disabled",
    "Color Bars",
    "Solid Color",
    "Grey Color Bars",
    "PN9",
];

/// Register value for each `TEST_PATTERN_MENU` entry
const TEST_PATTERN_VAL: [u32; 5] = [0, 2, 1, 3, 4];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlError {
    /// Value outside the range or off the step grid
    InvalidArgument,
    /// The control is derived from other state
    ReadOnly,
    /// The control is locked while streaming
    Busy,
}

/// One control's value and its current legal range
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Control {
    pub value: i32,
    pub min: i32,
    pub max: i32,
    pub step: i32,
    pub default: i32,
    pub read_only: bool,
    /// Locked against writes until released
    pub grabbed: bool,
}

impl Control {
    fn new(min: i32, max: i32, step: i32, default: i32) -> Self {
        Self {
            value: default,
            min,
            max,
            step,
            default,
            read_only: false,
            grabbed: false,
        }
    }

    fn fixed(value: i32) -> Self {
        let mut ctrl = Self::new(value, value, 1, value);
        ctrl.read_only = true;
        ctrl
    }

    fn validate(&self, value: i32) -> Result<(), ControlError> {
        if value < self.min || value > self.max {
            return Err(ControlError::InvalidArgument);
        }
        if (value - self.min) % self.step != 0 {
            return Err(ControlError::InvalidArgument);
        }
        Ok(())
    }

    /// Replace the range, pulling the current value inside it.
    /// Returns true if the value had to move.
    fn modify_range(&mut self, min: i32, max: i32, step: i32, default: i32) -> bool {
        self.min = min;
        self.max = max;
        self.step = step;
        self.default = default;
        let clamped = self.value.max(min).min(max);
        let moved = clamped != self.value;
        self.value = clamped;
        moved
    }
}

/// What a successful `ControlState::set` changed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SetOutcome {
    /// The value differs from the previous one
    pub changed: bool,
    /// A vblank change pulled the exposure value into its new range
    pub exposure_clamped: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControlState {
    controls: [Control; NUM_CONTROLS],
}

impl ControlState {
    /// Controls at their defaults for `mode`
    pub fn new(mode: &Mode) -> Self {
        let height = mode.height as i32;
        let vts_def = mode.vts_def as i32;
        let exposure_max = vts_def - EXPOSURE_MARGIN;
        let colour = Control::new(
            TESTP_COLOUR_MIN,
            TESTP_COLOUR_MAX,
            TESTP_COLOUR_STEP,
            TESTP_COLOUR_MAX,
        );

        Self {
            controls: [
                Control::fixed(PIXEL_RATE),
                Control::new(VBLANK_MIN, VTS_MAX - height, 1, vts_def - height),
                Control::fixed(PPL_DEFAULT - mode.width as i32),
                Control::new(
                    EXPOSURE_MIN,
                    exposure_max,
                    EXPOSURE_STEP,
                    exposure_max.min(EXPOSURE_DEFAULT),
                ),
                Control::new(ANA_GAIN_MIN, ANA_GAIN_MAX, ANA_GAIN_STEP, ANA_GAIN_DEFAULT),
                Control::new(
                    DGTL_GAIN_MIN,
                    DGTL_GAIN_MAX,
                    DGTL_GAIN_STEP,
                    DGTL_GAIN_DEFAULT,
                ),
                Control::new(0, 1, 1, 0),
                Control::new(0, 1, 1, 0),
                Control::new(0, TEST_PATTERN_MENU.len() as i32 - 1, 1, 0),
                colour,
                colour,
                colour,
                colour,
            ],
        }
    }

    pub fn get(&self, id: ControlId) -> &Control {
        &self.controls[id as usize]
    }

    fn get_mut(&mut self, id: ControlId) -> &mut Control {
        &mut self.controls[id as usize]
    }

    pub fn value(&self, id: ControlId) -> i32 {
        self.get(id).value
    }

    pub fn hflip(&self) -> bool {
        self.value(ControlId::Hflip) != 0
    }

    pub fn vflip(&self) -> bool {
        self.value(ControlId::Vflip) != 0
    }

    /// Recompute the mode-dependent ranges and reset vblank to the mode default
    pub fn on_mode_changed(&mut self, mode: &Mode) {
        let height = mode.height as i32;
        let vts_def = mode.vts_def as i32;

        let vblank = self.get_mut(ControlId::Vblank);
        vblank.modify_range(VBLANK_MIN, VTS_MAX - height, 1, vts_def - height);
        vblank.value = vts_def - height;

        self.update_exposure_range(vts_def - EXPOSURE_MARGIN);

        let hblank = PPL_DEFAULT - mode.width as i32;
        self.get_mut(ControlId::Hblank)
            .modify_range(hblank, hblank, 1, hblank);
    }

    /// Validate and store a new value.
    ///
    /// Nothing changes when this fails.
    pub fn set(
        &mut self,
        mode: &Mode,
        id: ControlId,
        value: i32,
    ) -> Result<SetOutcome, ControlError> {
        let ctrl = self.get(id);
        if ctrl.read_only {
            return Err(ControlError::ReadOnly);
        }
        if ctrl.grabbed {
            return Err(ControlError::Busy);
        }
        ctrl.validate(value)?;

        let mut outcome = SetOutcome {
            changed: ctrl.value != value,
            exposure_clamped: false,
        };
        if !outcome.changed {
            return Ok(outcome);
        }

        if id == ControlId::Vblank {
            // keep exposure inside the new frame length
            let exposure_max = mode.height as i32 + value - EXPOSURE_MARGIN;
            outcome.exposure_clamped = self.update_exposure_range(exposure_max);
        }
        self.get_mut(id).value = value;
        Ok(outcome)
    }

    fn update_exposure_range(&mut self, exposure_max: i32) -> bool {
        let exposure_def = exposure_max.min(EXPOSURE_DEFAULT);
        let exposure = self.get_mut(ControlId::Exposure);
        let (min, step) = (exposure.min, exposure.step);
        exposure.modify_range(min, exposure_max, step, exposure_def)
    }

    /// Lock or unlock both flips. Flips change the Bayer order,
    /// so they stay fixed while streaming.
    pub fn grab_flips(&mut self, grabbed: bool) {
        self.get_mut(ControlId::Hflip).grabbed = grabbed;
        self.get_mut(ControlId::Vflip).grabbed = grabbed;
    }

    /// The register write carrying the current value of `id`,
    /// `None` for controls with no register
    pub fn register_write(&self, mode: &Mode, id: ControlId) -> Option<RegWrite> {
        let value = self.value(id) as u32;
        let reg = match id {
            ControlId::PixelRate | ControlId::Hblank => return None,
            ControlId::AnalogGain => {
                RegWrite::new(Register::AnalogGain.addr(), Width::U8, value)
            }
            ControlId::Exposure => {
                RegWrite::new(Register::Exposure.addr(), Width::U16, value)
            }
            ControlId::DigitalGain => {
                RegWrite::new(Register::DigitalGain.addr(), Width::U16, value)
            }
            ControlId::TestPattern => RegWrite::new(
                Register::TestPattern.addr(),
                Width::U16,
                TEST_PATTERN_VAL[value as usize],
            ),
            ControlId::Hflip | ControlId::Vflip => {
                let orientation = self.hflip() as u32 | (self.vflip() as u32) << 1;
                RegWrite::new(Register::Orientation.addr(), Width::U8, orientation)
            }
            ControlId::Vblank => RegWrite::new(
                Register::FrameLength.addr(),
                Width::U16,
                mode.height + value,
            ),
            ControlId::TestPatternRed => {
                RegWrite::new(Register::TestPatternRed.addr(), Width::U16, value)
            }
            ControlId::TestPatternGreenR => {
                RegWrite::new(Register::TestPatternGreenR.addr(), Width::U16, value)
            }
            ControlId::TestPatternBlue => {
                RegWrite::new(Register::TestPatternBlue.addr(), Width::U16, value)
            }
            ControlId::TestPatternGreenB => {
                RegWrite::new(Register::TestPatternGreenB.addr(), Width::U16, value)
            }
        };
        Some(reg)
    }

    /// Register writes restoring every control on the device
    pub fn replay<'a>(&'a self, mode: &'a Mode) -> impl Iterator<Item = RegWrite> + 'a {
        REPLAY_ORDER
            .iter()
            .filter_map(move |&id| self.register_write(mode, id))
    }
}
