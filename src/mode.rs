/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! The fixed catalog of sensor modes

use crate::regs::{
    PIXEL_ARRAY_LEFT, PIXEL_ARRAY_TOP, VTS_15FPS, VTS_30FPS_1080P,
    VTS_30FPS_640X480, VTS_30FPS_BINNED,
};

/// Ordered (address, value) register writes. Every entry is applied, in order.
pub type RegisterRecipe = &'static [(u16, u8)];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

/// Resolution, analog crop and timing preset
#[derive(Debug, PartialEq, Eq)]
pub struct Mode {
    pub width: u32,
    pub height: u32,
    /// Analog crop rectangle
    pub crop: Rect,
    /// Default frame length in lines
    pub vts_def: u32,
    pub recipe: RegisterRecipe,
}

// Register sets lifted off the i2c interface of the vendor firmware driver.
// 3280x2464 = mode 2, 1920x1080 = mode 1, 1640x1232 = mode 4, 640x480 = mode 7.
const MODE_3280X2464_REGS: [(u16, u8); 54] = [
    (0x0100, 0x00), (0x30eb, 0x0c), (0x30eb, 0x05), (0x300a, 0xff),
    (0x300b, 0xff), (0x30eb, 0x05), (0x30eb, 0x09), (0x0114, 0x01),
    (0x0128, 0x00), (0x012a, 0x18), (0x012b, 0x00), (0x0164, 0x00),
    (0x0165, 0x00), (0x0166, 0x0c), (0x0167, 0xcf), (0x0168, 0x00),
    (0x0169, 0x00), (0x016a, 0x09), (0x016b, 0x9f), (0x016c, 0x0c),
    (0x016d, 0xd0), (0x016e, 0x09), (0x016f, 0xa0), (0x0170, 0x01),
    (0x0171, 0x01), (0x0174, 0x00), (0x0175, 0x00), (0x0301, 0x05),
    (0x0303, 0x01), (0x0304, 0x03), (0x0305, 0x03), (0x0306, 0x00),
    (0x0307, 0x39), (0x030b, 0x01), (0x030c, 0x00), (0x030d, 0x72),
    (0x0624, 0x0c), (0x0625, 0xd0), (0x0626, 0x09), (0x0627, 0xa0),
    (0x455e, 0x00), (0x471e, 0x4b), (0x4767, 0x0f), (0x4750, 0x14),
    (0x4540, 0x00), (0x47b4, 0x14), (0x4713, 0x30), (0x478b, 0x10),
    (0x478f, 0x10), (0x4793, 0x10), (0x4797, 0x0e), (0x479b, 0x0e),
    (0x0162, 0x0d), (0x0163, 0x78),
];

const MODE_1920X1080_REGS: [(u16, u8); 56] = [
    (0x0100, 0x00), (0x30eb, 0x05), (0x30eb, 0x0c), (0x300a, 0xff),
    (0x300b, 0xff), (0x30eb, 0x05), (0x30eb, 0x09), (0x0114, 0x01),
    (0x0128, 0x00), (0x012a, 0x18), (0x012b, 0x00), (0x0162, 0x0d),
    (0x0163, 0x78), (0x0164, 0x02), (0x0165, 0xa8), (0x0166, 0x0a),
    (0x0167, 0x27), (0x0168, 0x02), (0x0169, 0xb4), (0x016a, 0x06),
    (0x016b, 0xeb), (0x016c, 0x07), (0x016d, 0x80), (0x016e, 0x04),
    (0x016f, 0x38), (0x0170, 0x01), (0x0171, 0x01), (0x0174, 0x00),
    (0x0175, 0x00), (0x0301, 0x05), (0x0303, 0x01), (0x0304, 0x03),
    (0x0305, 0x03), (0x0306, 0x00), (0x0307, 0x39), (0x030b, 0x01),
    (0x030c, 0x00), (0x030d, 0x72), (0x0624, 0x07), (0x0625, 0x80),
    (0x0626, 0x04), (0x0627, 0x38), (0x455e, 0x00), (0x471e, 0x4b),
    (0x4767, 0x0f), (0x4750, 0x14), (0x4540, 0x00), (0x47b4, 0x14),
    (0x4713, 0x30), (0x478b, 0x10), (0x478f, 0x10), (0x4793, 0x10),
    (0x4797, 0x0e), (0x479b, 0x0e), (0x0162, 0x0d), (0x0163, 0x78),
];

const MODE_1640X1232_REGS: [(u16, u8); 54] = [
    (0x0100, 0x00), (0x30eb, 0x0c), (0x30eb, 0x05), (0x300a, 0xff),
    (0x300b, 0xff), (0x30eb, 0x05), (0x30eb, 0x09), (0x0114, 0x01),
    (0x0128, 0x00), (0x012a, 0x18), (0x012b, 0x00), (0x0164, 0x00),
    (0x0165, 0x00), (0x0166, 0x0c), (0x0167, 0xcf), (0x0168, 0x00),
    (0x0169, 0x00), (0x016a, 0x09), (0x016b, 0x9f), (0x016c, 0x06),
    (0x016d, 0x68), (0x016e, 0x04), (0x016f, 0xd0), (0x0170, 0x01),
    (0x0171, 0x01), (0x0174, 0x01), (0x0175, 0x01), (0x0301, 0x05),
    (0x0303, 0x01), (0x0304, 0x03), (0x0305, 0x03), (0x0306, 0x00),
    (0x0307, 0x39), (0x030b, 0x01), (0x030c, 0x00), (0x030d, 0x72),
    (0x0624, 0x06), (0x0625, 0x68), (0x0626, 0x04), (0x0627, 0xd0),
    (0x455e, 0x00), (0x471e, 0x4b), (0x4767, 0x0f), (0x4750, 0x14),
    (0x4540, 0x00), (0x47b4, 0x14), (0x4713, 0x30), (0x478b, 0x10),
    (0x478f, 0x10), (0x4793, 0x10), (0x4797, 0x0e), (0x479b, 0x0e),
    (0x0162, 0x0d), (0x0163, 0x78),
];

const MODE_640X480_REGS: [(u16, u8); 54] = [
    (0x0100, 0x00), (0x30eb, 0x05), (0x30eb, 0x0c), (0x300a, 0xff),
    (0x300b, 0xff), (0x30eb, 0x05), (0x30eb, 0x09), (0x0114, 0x01),
    (0x0128, 0x00), (0x012a, 0x18), (0x012b, 0x00), (0x0162, 0x0d),
    (0x0163, 0x78), (0x0164, 0x03), (0x0165, 0xe8), (0x0166, 0x08),
    (0x0167, 0xe7), (0x0168, 0x02), (0x0169, 0xf0), (0x016a, 0x06),
    (0x016b, 0xaf), (0x016c, 0x02), (0x016d, 0x80), (0x016e, 0x01),
    (0x016f, 0xe0), (0x0170, 0x01), (0x0171, 0x01), (0x0174, 0x03),
    (0x0175, 0x03), (0x0301, 0x05), (0x0303, 0x01), (0x0304, 0x03),
    (0x0305, 0x03), (0x0306, 0x00), (0x0307, 0x39), (0x030b, 0x01),
    (0x030c, 0x00), (0x030d, 0x72), (0x0624, 0x06), (0x0625, 0x68),
    (0x0626, 0x04), (0x0627, 0xd0), (0x455e, 0x00), (0x471e, 0x4b),
    (0x4767, 0x0f), (0x4750, 0x14), (0x4540, 0x00), (0x47b4, 0x14),
    (0x4713, 0x30), (0x478b, 0x10), (0x478f, 0x10), (0x4793, 0x10),
    (0x4797, 0x0e), (0x479b, 0x0e),
];
pub static SUPPORTED_MODES: [Mode; 4] = [
    // 8MPix 15fps
    Mode {
        width: 3280,
        height: 2464,
        crop: Rect {
            left: PIXEL_ARRAY_LEFT,
            top: PIXEL_ARRAY_TOP,
            width: 3280,
            height: 2464,
        },
        vts_def: VTS_15FPS,
        recipe: &MODE_3280X2464_REGS,
    },
    // 1080P 30fps cropped
    Mode {
        width: 1920,
        height: 1080,
        crop: Rect {
            left: 688,
            top: 700,
            width: 1920,
            height: 1080,
        },
        vts_def: VTS_30FPS_1080P,
        recipe: &MODE_1920X1080_REGS,
    },
    // 2x2 binned 30fps
    Mode {
        width: 1640,
        height: 1232,
        crop: Rect {
            left: PIXEL_ARRAY_LEFT,
            top: PIXEL_ARRAY_TOP,
            width: 3280,
            height: 2464,
        },
        vts_def: VTS_30FPS_BINNED,
        recipe: &MODE_1640X1232_REGS,
    },
    // 640x480 30fps
    Mode {
        width: 640,
        height: 480,
        crop: Rect {
            left: 1008,
            top: 760,
            width: 1280,
            height: 960,
        },
        vts_def: VTS_30FPS_640X480,
        recipe: &MODE_640X480_REGS,
    },
];

/// The mode the driver starts in, maximum resolution
pub fn default_mode() -> &'static Mode {
    &SUPPORTED_MODES[0]
}

/// Pick the mode closest to the requested size.
///
/// Distance is `|width - w| + |height - h|`. An exact match ends the search;
/// among equally distant modes the later catalog entry wins.
pub fn select_mode(width: u32, height: u32) -> &'static Mode {
    let mut best = default_mode();
    let mut min_error = u32::MAX;

    for mode in SUPPORTED_MODES.iter() {
        let error = abs_diff(mode.width, width) + abs_diff(mode.height, height);
        if error > min_error {
            continue;
        }
        min_error = error;
        best = mode;
        if error == 0 {
            break;
        }
    }
    best
}

fn abs_diff(a: u32, b: u32) -> u32 {
    if a > b {
        a - b
    } else {
        b - a
    }
}
