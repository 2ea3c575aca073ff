/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! Power rail, clock and reset sequencing

use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::digital::v2::OutputPin;

use crate::regs::XCLR_MIN_DELAY_US;

/// Energizes and de-energizes the sensor
pub trait PowerSequencer {
    type Error;

    /// Bring the sensor to a state where it accepts register writes
    fn power_on(&mut self) -> Result<(), Self::Error>;

    /// Best-effort shutdown, never fails
    fn power_off(&mut self);
}

/// The sensor supply rails, switched as a group:
/// - VANA: analog (2.8V)
/// - VDIG: digital core (1.8V)
/// - VDDL: interface (1.2V)
pub trait Supplies {
    type Error;

    fn enable(&mut self) -> Result<(), Self::Error>;
    fn disable(&mut self);
}

/// The external reference clock (XCLK)
pub trait ExternalClock {
    type Error;

    fn enable(&mut self) -> Result<(), Self::Error>;
    fn disable(&mut self);
}

/// Which power-on step failed
#[derive(Debug, PartialEq)]
pub enum PowerError<SupE, ClkE, PinE> {
    Supplies(SupE),
    Clock(ClkE),
    Reset(PinE),
}

/// Power sequencer built from board supplies, a clock, and an optional XCLR reset pin
pub struct GpioPowerSequencer<SUP, CLK, RST, D> {
    supplies: SUP,
    clock: CLK,
    reset: Option<RST>,
    delay: D,
}

impl<SUP, CLK, RST, D> GpioPowerSequencer<SUP, CLK, RST, D> {
    pub fn new(supplies: SUP, clock: CLK, reset: Option<RST>, delay: D) -> Self {
        Self {
            supplies,
            clock,
            reset,
            delay,
        }
    }

    pub fn release(self) -> (SUP, CLK, Option<RST>, D) {
        (self.supplies, self.clock, self.reset, self.delay)
    }
}

impl<SUP, CLK, RST, D, PinE> PowerSequencer for GpioPowerSequencer<SUP, CLK, RST, D>
where
    SUP: Supplies,
    CLK: ExternalClock,
    RST: OutputPin<Error = PinE>,
    D: DelayUs<u32>,
{
    type Error = PowerError<SUP::Error, CLK::Error, PinE>;

    fn power_on(&mut self) -> Result<(), Self::Error> {
        if let Err(e) = self.supplies.enable() {
            log::error!("failed to enable regulators");
            return Err(PowerError::Supplies(e));
        }

        if let Err(e) = self.clock.enable() {
            log::error!("failed to enable clock");
            self.supplies.disable();
            return Err(PowerError::Clock(e));
        }

        if let Some(reset) = self.reset.as_mut() {
            if let Err(e) = reset.set_high() {
                log::error!("failed to assert reset");
                self.clock.disable();
                self.supplies.disable();
                return Err(PowerError::Reset(e));
            }
        }
        // the sensor must not be touched before XCLR has settled
        self.delay.delay_us(XCLR_MIN_DELAY_US);

        Ok(())
    }

    fn power_off(&mut self) {
        if let Some(reset) = self.reset.as_mut() {
            let _ = reset.set_low();
        }
        self.clock.disable();
        self.supplies.disable();
    }
}
