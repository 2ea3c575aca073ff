/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! Register addresses and fixed sensor limits

/// 16-bit register addresses used outside of the mode recipes
#[repr(u16)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Register {
    ChipId = 0x0000,
    ModeSelect = 0x0100,
    AnalogGain = 0x0157,
    DigitalGain = 0x0158,
    Exposure = 0x015a,
    /// Frame length in lines (VTS)
    FrameLength = 0x0160,
    /// Bit 0: horizontal mirror, bit 1: vertical flip
    Orientation = 0x0172,
    TestPattern = 0x0600,
    TestPatternRed = 0x0602,
    TestPatternGreenR = 0x0604,
    TestPatternBlue = 0x0606,
    TestPatternGreenB = 0x0608,
}

impl Register {
    pub const fn addr(self) -> u16 {
        self as u16
    }
}

/// Values for `Register::ModeSelect`
pub const MODE_STANDBY: u32 = 0x00;
pub const MODE_STREAMING: u32 = 0x01;

pub const CHIP_ID: u16 = 0x0219;

/// External clock frequency required by the mode recipes
pub const XCLK_FREQ: u32 = 24_000_000;
/// Pixel rate is fixed for all modes
pub const PIXEL_RATE: i32 = 182_400_000;
pub const DEFAULT_LINK_FREQ: u64 = 456_000_000;
pub const CSI2_DATA_LANES: u8 = 2;

// V-timing
pub const VTS_15FPS: u32 = 0x0dc6;
pub const VTS_30FPS_1080P: u32 = 0x06e3;
pub const VTS_30FPS_BINNED: u32 = 0x06e3;
pub const VTS_30FPS_640X480: u32 = 0x06e3;
pub const VTS_MAX: i32 = 0xffff;
pub const VBLANK_MIN: i32 = 4;

/// Pixels per line is fixed, so hblank only depends on mode width
pub const PPL_DEFAULT: i32 = 3448;

pub const EXPOSURE_MIN: i32 = 4;
pub const EXPOSURE_STEP: i32 = 1;
pub const EXPOSURE_DEFAULT: i32 = 0x640;
/// Exposure must stay this many lines short of the frame length
pub const EXPOSURE_MARGIN: i32 = 4;

pub const ANA_GAIN_MIN: i32 = 0;
pub const ANA_GAIN_MAX: i32 = 232;
pub const ANA_GAIN_STEP: i32 = 1;
pub const ANA_GAIN_DEFAULT: i32 = 0x0;

pub const DGTL_GAIN_MIN: i32 = 0x0100;
pub const DGTL_GAIN_MAX: i32 = 0x0fff;
pub const DGTL_GAIN_DEFAULT: i32 = 0x0100;
pub const DGTL_GAIN_STEP: i32 = 1;

pub const TESTP_COLOUR_MIN: i32 = 0;
pub const TESTP_COLOUR_MAX: i32 = 0x03ff;
pub const TESTP_COLOUR_STEP: i32 = 1;

// Native and active pixel array size
pub const NATIVE_WIDTH: u32 = 3296;
pub const NATIVE_HEIGHT: u32 = 2480;
pub const PIXEL_ARRAY_LEFT: u32 = 8;
pub const PIXEL_ARRAY_TOP: u32 = 8;
pub const PIXEL_ARRAY_WIDTH: u32 = 3280;
pub const PIXEL_ARRAY_HEIGHT: u32 = 2464;

// Embedded metadata stream
pub const EMBEDDED_LINE_WIDTH: u32 = 16384;
pub const NUM_EMBEDDED_LINES: u32 = 1;

/// Minimum wait between releasing XCLR and the first register write:
/// t4 (200 us) + t5 (6000 us)
pub const XCLR_MIN_DELAY_US: u32 = 6200;

/// Wait after each run-bit toggle during attach
pub const MODE_SWITCH_DELAY_US: u32 = 100;
