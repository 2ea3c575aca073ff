/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/
#![cfg_attr(not(test), no_std)]

//! Configuration and streaming driver for the Sony IMX307 image sensor
//! This imaging sensor has multiple interfaces:
//! - Two-wire i2c for configuration registers (i2c)
//! - MIPI CSI-2 pixel data out, two lanes
//! - power rails, external clock and reset (XCLR)
//! This driver is concerned with the i2c interface and the power sequencing
//! around it: mode selection, runtime controls and the standby/streaming
//! state machine. Pixel data is received elsewhere.

pub mod config;
pub mod controls;
pub mod format;
pub mod mode;
pub mod port;
pub mod power;
pub mod regs;
pub mod sensor;
pub mod shared;

#[cfg(test)]
mod testing;

pub use config::{HardwareConfig, HardwareConfigError};
pub use controls::{Control, ControlError, ControlId};
pub use format::{select_format_code, PixelCode};
pub use mode::{select_mode, Mode, Rect};
pub use port::{I2cRegisterPort, RegisterPort, Width};
pub use power::{GpioPowerSequencer, PowerSequencer};
pub use sensor::{Format, Imx307, Pad, RunState, SelectionTarget};
pub use shared::SharedImx307;

/// Errors in this crate
#[derive(Debug, PartialEq)]
pub enum Error<CommE, PowerE> {
    /// Sensor communication error
    Comm(CommE),

    /// The sensor could not be powered up
    Power(PowerE),

    /// Value out of range, off the step grid, or an unknown pad/index
    InvalidArgument,

    /// The control is derived and cannot be written
    ReadOnly,

    /// The request conflicts with streaming (flips, mode changes)
    Busy,

    /// The chip ID register did not hold the expected value
    IdentityMismatch(u16),

    /// The board wiring is not supported
    HardwareConfig(HardwareConfigError),
}

impl<CommE, PowerE> From<ControlError> for Error<CommE, PowerE> {
    fn from(err: ControlError) -> Self {
        match err {
            ControlError::InvalidArgument => Error::InvalidArgument,
            ControlError::ReadOnly => Error::ReadOnly,
            ControlError::Busy => Error::Busy,
        }
    }
}

impl<CommE, PowerE> From<HardwareConfigError> for Error<CommE, PowerE> {
    fn from(err: HardwareConfigError) -> Self {
        Error::HardwareConfig(err)
    }
}

/// 7-bit i2c address of the sensor
pub const DEFAULT_I2C_ADDRESS: u8 = 0x10;
