/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! Media bus pixel codes and their Bayer order under flips

/// Media bus code for the embedded metadata stream
pub const SENSOR_DATA: u32 = 0x7002;

/// Raw Bayer codes the sensor can emit
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelCode {
    Srggb10 = 0x300f,
    Sgrbg10 = 0x300a,
    Sgbrg10 = 0x300e,
    Sbggr10 = 0x3007,
    Srggb8 = 0x3014,
    Sgrbg8 = 0x3002,
    Sgbrg8 = 0x3013,
    Sbggr8 = 0x3001,
}

/// Groups of four sharing one bit depth, in flip order:
/// no flip, h flip, v flip, h&v flip
pub const CODES: [PixelCode; 8] = [
    PixelCode::Srggb10,
    PixelCode::Sgrbg10,
    PixelCode::Sgbrg10,
    PixelCode::Sbggr10,
    PixelCode::Srggb8,
    PixelCode::Sgrbg8,
    PixelCode::Sgbrg8,
    PixelCode::Sbggr8,
];

pub const DEFAULT_CODE: PixelCode = PixelCode::Srggb10;

const RAW8_FRAMEFMT_REGS: [(u16, u8); 3] =
    [(0x018c, 0x08), (0x018d, 0x08), (0x0309, 0x08)];

const RAW10_FRAMEFMT_REGS: [(u16, u8); 3] =
    [(0x018c, 0x0a), (0x018d, 0x0a), (0x0309, 0x0a)];

impl PixelCode {
    pub const fn code(self) -> u32 {
        self as u32
    }

    pub fn from_code(code: u32) -> Option<Self> {
        CODES.iter().copied().find(|c| c.code() == code)
    }

    pub fn bits_per_pixel(self) -> u8 {
        match self {
            PixelCode::Srggb10
            | PixelCode::Sgrbg10
            | PixelCode::Sgbrg10
            | PixelCode::Sbggr10 => 10,
            PixelCode::Srggb8
            | PixelCode::Sgrbg8
            | PixelCode::Sgbrg8
            | PixelCode::Sbggr8 => 8,
        }
    }

    /// Registers selecting RAW8 or RAW10 output for this code
    pub fn framefmt_regs(self) -> &'static [(u16, u8)] {
        match self.bits_per_pixel() {
            8 => &RAW8_FRAMEFMT_REGS,
            _ => &RAW10_FRAMEFMT_REGS,
        }
    }

    fn index(self) -> usize {
        CODES.iter().position(|c| *c == self).unwrap_or(0)
    }
}

/// Bayer order the sensor emits for `requested` under the given flips.
///
/// Codes that are not in `CODES` fall back to the first group
/// instead of being rejected.
pub fn select_format_code(requested: u32, hflip: bool, vflip: bool) -> PixelCode {
    let index = PixelCode::from_code(requested)
        .map(PixelCode::index)
        .unwrap_or(0);
    let variant = (if vflip { 2 } else { 0 }) | (if hflip { 1 } else { 0 });
    CODES[(index & !3) | variant]
}
