/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! Board wiring the driver is attached with

use crate::regs::{CSI2_DATA_LANES, DEFAULT_LINK_FREQ, XCLK_FREQ};

/// Reasons a board configuration cannot drive this sensor
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HardwareConfigError {
    /// Only two CSI-2 data lanes are supported
    DataLanes(u8),
    MissingLinkFrequency,
    /// Exactly one link frequency must be listed
    LinkFrequencyCount(usize),
    LinkFrequency(u64),
    XclkFrequency(u32),
}

/// CSI-2 link and clock setup, as described by the board's firmware tables
#[derive(Clone, Copy, Debug)]
pub struct HardwareConfig<'a> {
    pub data_lanes: u8,
    pub link_frequencies: &'a [u64],
    /// Measured rate of the external clock in Hz
    pub xclk_freq: u32,
}

impl Default for HardwareConfig<'static> {
    fn default() -> Self {
        Self {
            data_lanes: CSI2_DATA_LANES,
            link_frequencies: &[DEFAULT_LINK_FREQ],
            xclk_freq: XCLK_FREQ,
        }
    }
}

impl HardwareConfig<'_> {
    /// Accept only the single lane/clock configuration the mode recipes are written for
    pub fn check(&self) -> Result<(), HardwareConfigError> {
        if self.data_lanes != CSI2_DATA_LANES {
            log::error!("only {} data lanes are currently supported", CSI2_DATA_LANES);
            return Err(HardwareConfigError::DataLanes(self.data_lanes));
        }

        match self.link_frequencies {
            [] => {
                log::error!("link-frequency property not found");
                Err(HardwareConfigError::MissingLinkFrequency)
            }
            [freq] if *freq == DEFAULT_LINK_FREQ => Ok(()),
            [freq] => {
                log::error!("link frequency not supported: {}", freq);
                Err(HardwareConfigError::LinkFrequency(*freq))
            }
            freqs => {
                log::error!("link frequency not supported: {:?}", freqs);
                Err(HardwareConfigError::LinkFrequencyCount(freqs.len()))
            }
        }?;

        if self.xclk_freq != XCLK_FREQ {
            log::error!("xclk frequency not supported: {} Hz", self.xclk_freq);
            return Err(HardwareConfigError::XclkFrequency(self.xclk_freq));
        }
        Ok(())
    }
}
