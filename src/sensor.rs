/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! The sensor driver: pads, controls, and the standby/streaming state machine

use core::ptr;

use embedded_hal::blocking::delay::DelayUs;
#[cfg(feature = "rttdebug")]
use panic_rtt_core::rprintln;

use crate::config::HardwareConfig;
use crate::controls::{Control, ControlId, ControlState};
use crate::format::{select_format_code, PixelCode, CODES, DEFAULT_CODE, SENSOR_DATA};
use crate::mode::{default_mode, select_mode, Mode, Rect, SUPPORTED_MODES};
use crate::port::{write_recipe, RegisterPort, Width};
use crate::power::PowerSequencer;
use crate::regs::*;
use crate::Error;

type DevError<P, S> =
    Error<<P as RegisterPort>::Error, <S as PowerSequencer>::Error>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Standby,
    Streaming,
}

/// Source pads of the sensor
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pad {
    Image,
    /// Embedded register data preceding each frame
    Metadata,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Format {
    pub width: u32,
    pub height: u32,
    /// Media bus code
    pub code: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionTarget {
    /// Analog crop of the current mode
    Crop,
    /// The whole pixel array, including inactive pixels
    NativeSize,
    CropDefault,
    CropBounds,
}

const METADATA_FORMAT: Format = Format {
    width: EMBEDDED_LINE_WIDTH,
    height: NUM_EMBEDDED_LINES,
    code: SENSOR_DATA,
};

const ACTIVE_AREA: Rect = Rect {
    left: PIXEL_ARRAY_LEFT,
    top: PIXEL_ARRAY_TOP,
    width: PIXEL_ARRAY_WIDTH,
    height: PIXEL_ARRAY_HEIGHT,
};

/// Main driver struct.
///
/// Owns the register port and the power sequencer. The device is only
/// powered while streaming; in standby, control writes update the
/// in-memory state and are replayed on the next stream start.
pub struct Imx307<P, S> {
    port: P,
    power: S,
    mode: &'static Mode,
    /// Requested pixel code, as resolved when the format was set
    code: PixelCode,
    controls: ControlState,
    run_state: RunState,
    /// Streaming was interrupted by `suspend`
    resume_streaming: bool,
}

impl<P, S> Imx307<P, S>
where
    P: RegisterPort,
    S: PowerSequencer,
{
    /// Verify the board configuration and the chip identity, then leave the
    /// sensor powered down in standby with the maximum resolution mode selected.
    pub fn attach<D: DelayUs<u32>>(
        port: P,
        power: S,
        config: &HardwareConfig,
        delay: &mut D,
    ) -> Result<Self, DevError<P, S>> {
        #[cfg(feature = "rttdebug")]
        rprintln!("imx307-i2c attach start");

        config.check()?;

        let mut port = port;
        let mut power = power;
        // the sensor must be powered for the chip id to be readable
        power.power_on().map_err(Error::Power)?;
        if let Err(e) = Self::probe(&mut port, delay) {
            power.power_off();
            return Err(e);
        }

        // runtime idle until the first stream start
        power.power_off();

        let mode = default_mode();
        let dev = Self {
            port,
            power,
            mode,
            code: DEFAULT_CODE,
            controls: ControlState::new(mode),
            run_state: RunState::Standby,
            resume_streaming: false,
        };

        #[cfg(feature = "rttdebug")]
        rprintln!("imx307-i2c attach done");
        Ok(dev)
    }

    fn probe<D: DelayUs<u32>>(port: &mut P, delay: &mut D) -> Result<(), DevError<P, S>> {
        let chip_id = port
            .read(Register::ChipId.addr(), Width::U16)
            .map_err(|e| {
                log::error!("failed to read chip id {:x}", CHIP_ID);
                Error::Comm(e)
            })? as u16;
        if chip_id != CHIP_ID {
            log::error!("chip id mismatch: {:x}!={:x}", CHIP_ID, chip_id);
            return Err(Error::IdentityMismatch(chip_id));
        }

        // The data lanes only enter LP-11 once streaming has started,
        // so cycle streaming -> standby once.
        port.write(Register::ModeSelect.addr(), Width::U8, MODE_STREAMING)
            .map_err(Error::Comm)?;
        delay.delay_us(MODE_SWITCH_DELAY_US);
        port.write(Register::ModeSelect.addr(), Width::U8, MODE_STANDBY)
            .map_err(Error::Comm)?;
        delay.delay_us(MODE_SWITCH_DELAY_US);
        Ok(())
    }

    /// Stop streaming if needed and hand back the bus and power collaborators
    pub fn release(mut self) -> (P, S) {
        if self.run_state == RunState::Streaming {
            self.stop_streaming();
        }
        (self.port, self.power)
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn mode(&self) -> &'static Mode {
        self.mode
    }

    pub fn controls(&self) -> &ControlState {
        &self.controls
    }

    /// Bayer order currently emitted, given the flips
    fn current_code(&self) -> PixelCode {
        select_format_code(
            self.code.code(),
            self.controls.hflip(),
            self.controls.vflip(),
        )
    }

    /// Media bus code number `index` on `pad`
    pub fn enum_mbus_code(&self, pad: Pad, index: usize) -> Result<u32, DevError<P, S>> {
        match pad {
            Pad::Image => {
                if index >= CODES.len() / 4 {
                    return Err(Error::InvalidArgument);
                }
                let base = CODES[index * 4];
                let code = select_format_code(
                    base.code(),
                    self.controls.hflip(),
                    self.controls.vflip(),
                );
                Ok(code.code())
            }
            Pad::Metadata if index == 0 => Ok(SENSOR_DATA),
            Pad::Metadata => Err(Error::InvalidArgument),
        }
    }

    /// Fixed frame size number `index` for `code` on `pad`, as (width, height)
    pub fn enum_frame_size(
        &self,
        pad: Pad,
        code: u32,
        index: usize,
    ) -> Result<(u32, u32), DevError<P, S>> {
        match pad {
            Pad::Image => {
                let mode = SUPPORTED_MODES.get(index).ok_or(Error::InvalidArgument)?;
                let flipped = select_format_code(
                    code,
                    self.controls.hflip(),
                    self.controls.vflip(),
                );
                if flipped.code() != code {
                    return Err(Error::InvalidArgument);
                }
                Ok((mode.width, mode.height))
            }
            Pad::Metadata => {
                if code != SENSOR_DATA || index > 0 {
                    return Err(Error::InvalidArgument);
                }
                Ok((METADATA_FORMAT.width, METADATA_FORMAT.height))
            }
        }
    }

    pub fn format(&self, pad: Pad) -> Format {
        match pad {
            Pad::Image => Format {
                width: self.mode.width,
                height: self.mode.height,
                code: self.current_code().code(),
            },
            Pad::Metadata => METADATA_FORMAT,
        }
    }

    /// Select the mode nearest to `width` x `height` and the Bayer order matching
    /// `code` under the current flips. Returns the format actually applied.
    pub fn set_format(
        &mut self,
        pad: Pad,
        code: u32,
        width: u32,
        height: u32,
    ) -> Result<Format, DevError<P, S>> {
        if pad == Pad::Metadata {
            // only one embedded data format
            return Ok(METADATA_FORMAT);
        }

        let code = select_format_code(code, self.controls.hflip(), self.controls.vflip());
        let mode = select_mode(width, height);

        if !ptr::eq(self.mode, mode) || self.code != code {
            if self.run_state == RunState::Streaming {
                return Err(Error::Busy);
            }
            self.code = code;
            self.mode = mode;
            self.controls.on_mode_changed(mode);
        }

        Ok(Format {
            width: mode.width,
            height: mode.height,
            code: code.code(),
        })
    }

    pub fn selection(&self, target: SelectionTarget) -> Rect {
        match target {
            SelectionTarget::Crop => self.mode.crop,
            SelectionTarget::NativeSize => Rect {
                left: 0,
                top: 0,
                width: NATIVE_WIDTH,
                height: NATIVE_HEIGHT,
            },
            SelectionTarget::CropDefault | SelectionTarget::CropBounds => ACTIVE_AREA,
        }
    }

    pub fn control(&self, id: ControlId) -> Control {
        *self.controls.get(id)
    }

    /// Update a control.
    ///
    /// In standby only the stored value changes. While streaming the register
    /// is written too; if that write fails the stored value is kept and
    /// reaches the device on the next stream start.
    pub fn set_control(&mut self, id: ControlId, value: i32) -> Result<(), DevError<P, S>> {
        let outcome = self.controls.set(self.mode, id, value)?;
        if !outcome.changed || self.run_state != RunState::Streaming {
            return Ok(());
        }

        if outcome.exposure_clamped {
            if let Some(reg) = self.controls.register_write(self.mode, ControlId::Exposure) {
                self.port.apply(reg).map_err(Error::Comm)?;
            }
        }
        // controls without a register are read-only and never get here
        if let Some(reg) = self.controls.register_write(self.mode, id) {
            self.port.apply(reg).map_err(Error::Comm)?;
        }
        Ok(())
    }

    /// Start or stop streaming. Repeating the current state is a no-op.
    pub fn set_stream(&mut self, enable: bool) -> Result<(), DevError<P, S>> {
        self.resume_streaming = false;
        let streaming = self.run_state == RunState::Streaming;
        if streaming == enable {
            return Ok(());
        }

        if enable {
            self.start_streaming()?;
            self.run_state = RunState::Streaming;
        } else {
            self.stop_streaming();
            self.run_state = RunState::Standby;
        }
        Ok(())
    }

    /// System sleep: stop streaming and remember to restart on `resume`
    pub fn suspend(&mut self) {
        if self.run_state == RunState::Streaming {
            self.stop_streaming();
            self.run_state = RunState::Standby;
            self.resume_streaming = true;
        }
    }

    /// Restart streaming if it was running at `suspend`.
    /// If the restart fails the device stays in standby.
    pub fn resume(&mut self) -> Result<(), DevError<P, S>> {
        if !self.resume_streaming {
            return Ok(());
        }
        self.resume_streaming = false;
        if self.run_state == RunState::Standby {
            self.start_streaming()?;
            self.run_state = RunState::Streaming;
        }
        Ok(())
    }

    /// Power up and configure. On any failure power is released again.
    fn start_streaming(&mut self) -> Result<(), DevError<P, S>> {
        self.power.power_on().map_err(Error::Power)?;

        if let Err(e) = self.configure() {
            self.power.power_off();
            return Err(e);
        }

        // vflip and hflip cannot change during streaming
        self.controls.grab_flips(true);
        log::debug!("streaming {}x{}", self.mode.width, self.mode.height);
        Ok(())
    }

    fn configure(&mut self) -> Result<(), DevError<P, S>> {
        if let Err(e) = write_recipe(&mut self.port, self.mode.recipe) {
            log::error!("failed to set mode");
            return Err(Error::Comm(e));
        }

        if let Err(e) = write_recipe(&mut self.port, self.code.framefmt_regs()) {
            log::error!("failed to set frame format");
            return Err(Error::Comm(e));
        }

        // customized values from the user
        for reg in self.controls.replay(self.mode) {
            self.port.apply(reg).map_err(Error::Comm)?;
        }

        if let Err(e) = self
            .port
            .write(Register::ModeSelect.addr(), Width::U8, MODE_STREAMING)
        {
            log::error!("failed to set stream");
            return Err(Error::Comm(e));
        }
        Ok(())
    }

    fn stop_streaming(&mut self) {
        if self
            .port
            .write(Register::ModeSelect.addr(), Width::U8, MODE_STANDBY)
            .is_err()
        {
            log::error!("failed to set stream off");
        }
        self.controls.grab_flips(false);
        self.power.power_off();
        log::debug!("standby");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HardwareConfigError;
    use crate::port::RegWrite;
    use crate::testing::{
        FakeBusError, FakePort, FakePower, FakePowerError, PortLog, PowerLog,
    };
    use embedded_hal_mock::delay::MockNoop;
    use std::vec::Vec;

    type Dev = Imx307<FakePort, FakePower>;

    fn attached() -> (Dev, PortLog, PowerLog) {
        let (port, port_log) = FakePort::new();
        let (power, power_log) = FakePower::new();
        let dev = Imx307::attach(
            port,
            power,
            &HardwareConfig::default(),
            &mut MockNoop::new(),
        )
        .unwrap();
        port_log.clear();
        (dev, port_log, power_log)
    }

    fn run_bit(value: u32) -> RegWrite {
        RegWrite::new(0x0100, Width::U8, value)
    }

    fn expected_start(dev: &Dev, code: PixelCode) -> Vec<RegWrite> {
        let mut writes: Vec<RegWrite> = dev
            .mode()
            .recipe
            .iter()
            .chain(code.framefmt_regs())
            .map(|&(address, value)| RegWrite::new(address, Width::U8, value as u32))
            .collect();
        writes.extend(dev.controls().replay(dev.mode()));
        writes.push(run_bit(1));
        writes
    }

    #[test]
    fn attach_cycles_run_bit_and_powers_down() {
        let (port, port_log) = FakePort::new();
        let (power, power_log) = FakePower::new();
        let dev = Imx307::attach(
            port,
            power,
            &HardwareConfig::default(),
            &mut MockNoop::new(),
        )
        .unwrap();

        assert_eq!(port_log.writes(), [run_bit(1), run_bit(0)]);
        assert_eq!(power_log.on_calls(), 1);
        assert!(!power_log.powered());
        assert_eq!(dev.run_state(), RunState::Standby);
        assert_eq!(dev.mode().width, 3280);
        assert_eq!(dev.format(Pad::Image).code, PixelCode::Srggb10.code());
    }

    #[test]
    fn attach_rejects_foreign_chip() {
        let (port, port_log) = FakePort::new();
        port_log.set_register(0x0000, 0x0307);
        let (power, power_log) = FakePower::new();
        let result = Imx307::attach(
            port,
            power,
            &HardwareConfig::default(),
            &mut MockNoop::new(),
        );

        assert_eq!(result.err(), Some(Error::IdentityMismatch(0x0307)));
        assert!(port_log.writes().is_empty());
        assert!(!power_log.powered());
    }

    #[test]
    fn attach_surfaces_unreadable_chip() {
        let (port, port_log) = FakePort::new();
        port_log.fail_reads();
        let (power, power_log) = FakePower::new();
        let result = Imx307::attach(
            port,
            power,
            &HardwareConfig::default(),
            &mut MockNoop::new(),
        );

        assert_eq!(result.err(), Some(Error::Comm(FakeBusError)));
        assert_eq!(power_log.off_calls(), 1);
    }

    #[test]
    fn attach_rejects_unsupported_wiring_before_power() {
        let (port, _) = FakePort::new();
        let (power, power_log) = FakePower::new();
        let config = HardwareConfig {
            data_lanes: 4,
            ..HardwareConfig::default()
        };
        let result = Imx307::attach(port, power, &config, &mut MockNoop::new());

        assert_eq!(
            result.err(),
            Some(Error::HardwareConfig(HardwareConfigError::DataLanes(4)))
        );
        assert_eq!(power_log.on_calls(), 0);
    }

    #[test]
    fn start_writes_recipe_format_controls_then_run_bit() {
        let (mut dev, port_log, power_log) = attached();
        let expected = expected_start(&dev, PixelCode::Srggb10);

        dev.set_stream(true).unwrap();

        assert_eq!(port_log.writes(), expected);
        assert_eq!(dev.run_state(), RunState::Streaming);
        assert!(power_log.powered());
        assert!(dev.control(ControlId::Hflip).grabbed);
        assert!(dev.control(ControlId::Vflip).grabbed);
    }

    #[test]
    fn repeated_enable_is_a_no_op() {
        let (mut dev, port_log, power_log) = attached();
        dev.set_stream(true).unwrap();
        let writes = port_log.writes().len();
        dev.set_stream(true).unwrap();
        assert_eq!(port_log.writes().len(), writes);
        assert_eq!(power_log.on_calls(), 2);
    }

    #[test]
    fn restart_replays_identical_sequence() {
        let (mut dev, port_log, _) = attached();
        dev.set_control(ControlId::Exposure, 1000).unwrap();
        dev.set_control(ControlId::TestPattern, 2).unwrap();

        dev.set_stream(true).unwrap();
        let first = port_log.writes();

        dev.set_stream(false).unwrap();
        assert_eq!(port_log.last_write(0x0100), Some(0));
        port_log.clear();

        dev.set_stream(true).unwrap();
        assert_eq!(port_log.writes(), first);
        assert_eq!(port_log.last_write(0x015a), Some(1000));
    }

    #[test]
    fn recipe_failure_releases_power_and_is_retryable() {
        let (mut dev, port_log, power_log) = attached();
        port_log.fail_write_at(2);

        assert_eq!(dev.set_stream(true), Err(Error::Comm(FakeBusError)));
        assert_eq!(dev.run_state(), RunState::Standby);
        assert!(!power_log.powered());
        assert_eq!(port_log.writes().len(), 2);
        assert!(!dev.control(ControlId::Hflip).grabbed);

        port_log.heal();
        port_log.clear();
        dev.set_stream(true).unwrap();
        assert_eq!(dev.run_state(), RunState::Streaming);
        assert!(power_log.powered());
    }

    #[test]
    fn format_replay_and_run_bit_failures_abort_start() {
        let (mut dev, port_log, power_log) = attached();
        let total = expected_start(&dev, PixelCode::Srggb10).len();

        // first format register, first control replay write, run bit
        let framefmt_at = dev.mode().recipe.len();
        let replay_at = framefmt_at + 3;
        for attempt in [framefmt_at, replay_at, total - 1].iter() {
            port_log.clear();
            port_log.fail_write_at(*attempt);
            assert_eq!(dev.set_stream(true), Err(Error::Comm(FakeBusError)));
            assert_eq!(port_log.writes().len(), *attempt);
            assert_eq!(dev.run_state(), RunState::Standby);
            assert!(!power_log.powered());
            assert!(!dev.control(ControlId::Hflip).grabbed);
        }
    }

    #[test]
    fn power_failure_leaves_bus_untouched() {
        let (mut dev, port_log, power_log) = attached();
        power_log.fail_power_on(true);

        assert_eq!(dev.set_stream(true), Err(Error::Power(FakePowerError)));
        assert!(port_log.writes().is_empty());
        assert_eq!(dev.run_state(), RunState::Standby);
    }

    #[test]
    fn stop_completes_when_run_bit_write_fails() {
        let (mut dev, port_log, power_log) = attached();
        dev.set_stream(true).unwrap();
        port_log.clear();
        port_log.fail_write_at(0);

        assert_eq!(dev.set_stream(false), Ok(()));
        assert_eq!(dev.run_state(), RunState::Standby);
        assert!(!power_log.powered());
        assert!(!dev.control(ControlId::Vflip).grabbed);
    }

    #[test]
    fn flips_are_locked_while_streaming() {
        let (mut dev, port_log, _) = attached();
        dev.set_control(ControlId::Hflip, 1).unwrap();
        assert!(port_log.writes().is_empty());

        dev.set_stream(true).unwrap();
        assert_eq!(dev.set_control(ControlId::Hflip, 0), Err(Error::Busy));
        assert_eq!(dev.set_control(ControlId::Vflip, 1), Err(Error::Busy));
        assert_eq!(dev.control(ControlId::Hflip).value, 1);

        dev.set_stream(false).unwrap();
        assert!(dev.set_control(ControlId::Vflip, 1).is_ok());
    }

    #[test]
    fn streaming_control_writes_reach_the_bus() {
        let (mut dev, port_log, _) = attached();
        dev.set_stream(true).unwrap();
        port_log.clear();

        dev.set_control(ControlId::AnalogGain, 100).unwrap();
        dev.set_control(ControlId::DigitalGain, 0x200).unwrap();
        // unchanged value, nothing to write
        dev.set_control(ControlId::DigitalGain, 0x200).unwrap();
        assert_eq!(
            port_log.writes(),
            [
                RegWrite::new(0x0157, Width::U8, 100),
                RegWrite::new(0x0158, Width::U16, 0x200),
            ]
        );
    }

    #[test]
    fn failed_streaming_write_keeps_new_value() {
        let (mut dev, port_log, _) = attached();
        dev.set_stream(true).unwrap();
        port_log.clear();
        port_log.fail_write_at(0);

        assert_eq!(
            dev.set_control(ControlId::Exposure, 500),
            Err(Error::Comm(FakeBusError))
        );
        assert_eq!(dev.control(ControlId::Exposure).value, 500);
    }

    #[test]
    fn streaming_vblank_write_clamps_exposure_on_device() {
        let (mut dev, port_log, _) = attached();
        dev.set_format(Pad::Image, PixelCode::Srggb10.code(), 1920, 1080)
            .unwrap();
        dev.set_stream(true).unwrap();
        port_log.clear();

        dev.set_control(ControlId::Vblank, 10).unwrap();
        assert_eq!(
            port_log.writes(),
            [
                RegWrite::new(0x015a, Width::U16, 1086),
                RegWrite::new(0x0160, Width::U16, 1090),
            ]
        );
        assert_eq!(dev.control(ControlId::Exposure).max, 1086);
    }

    #[test]
    fn read_only_and_out_of_range_writes_fail() {
        let (mut dev, _, _) = attached();
        assert_eq!(dev.set_control(ControlId::Hblank, 168), Err(Error::ReadOnly));
        assert_eq!(
            dev.set_control(ControlId::AnalogGain, 233),
            Err(Error::InvalidArgument)
        );
        assert_eq!(dev.control(ControlId::AnalogGain).value, 0);
    }

    #[test]
    fn set_format_picks_mode_and_updates_ranges() {
        let (mut dev, _, _) = attached();
        let format = dev
            .set_format(Pad::Image, PixelCode::Sbggr8.code(), 650, 470)
            .unwrap();

        assert_eq!(
            format,
            Format {
                width: 640,
                height: 480,
                code: PixelCode::Srggb8.code(),
            }
        );
        assert_eq!(dev.control(ControlId::Vblank).value, 0x06e3 - 480);
        assert_eq!(dev.control(ControlId::Hblank).value, 3448 - 640);
        assert_eq!(dev.selection(SelectionTarget::Crop).left, 1008);
    }

    #[test]
    fn unchanged_format_keeps_user_vblank() {
        let (mut dev, _, _) = attached();
        dev.set_control(ControlId::Vblank, 100).unwrap();
        dev.set_format(Pad::Image, PixelCode::Srggb10.code(), 3280, 2464)
            .unwrap();
        assert_eq!(dev.control(ControlId::Vblank).value, 100);
    }

    #[test]
    fn eight_bit_format_writes_raw8_registers() {
        let (mut dev, port_log, _) = attached();
        dev.set_format(Pad::Image, PixelCode::Srggb8.code(), 1640, 1232)
            .unwrap();
        let expected = expected_start(&dev, PixelCode::Srggb8);
        dev.set_stream(true).unwrap();
        assert_eq!(port_log.writes(), expected);
        assert_eq!(port_log.last_write(0x0309), Some(0x08));
    }

    #[test]
    fn format_changes_are_refused_while_streaming() {
        let (mut dev, _, _) = attached();
        dev.set_stream(true).unwrap();
        assert_eq!(
            dev.set_format(Pad::Image, PixelCode::Srggb10.code(), 640, 480),
            Err(Error::Busy)
        );
        // same mode and code is fine
        assert!(dev
            .set_format(Pad::Image, PixelCode::Srggb10.code(), 3280, 2464)
            .is_ok());
    }

    #[test]
    fn flips_change_reported_bayer_order() {
        let (mut dev, _, _) = attached();
        dev.set_control(ControlId::Hflip, 1).unwrap();
        assert_eq!(dev.format(Pad::Image).code, PixelCode::Sgrbg10.code());
        dev.set_control(ControlId::Vflip, 1).unwrap();
        assert_eq!(dev.format(Pad::Image).code, PixelCode::Sbggr10.code());
        assert_eq!(
            dev.enum_mbus_code(Pad::Image, 1),
            Ok(PixelCode::Sbggr8.code())
        );
    }

    #[test]
    fn enumeration() {
        let (dev, _, _) = attached();
        assert_eq!(dev.enum_mbus_code(Pad::Image, 0), Ok(0x300f));
        assert_eq!(dev.enum_mbus_code(Pad::Image, 2), Err(Error::InvalidArgument));
        assert_eq!(
            dev.enum_mbus_code(Pad::Image, usize::MAX),
            Err(Error::InvalidArgument)
        );
        assert_eq!(
            dev.enum_mbus_code(Pad::Image, usize::MAX / 2),
            Err(Error::InvalidArgument)
        );
        assert_eq!(dev.enum_mbus_code(Pad::Metadata, 0), Ok(SENSOR_DATA));
        assert_eq!(dev.enum_mbus_code(Pad::Metadata, 1), Err(Error::InvalidArgument));

        assert_eq!(dev.enum_frame_size(Pad::Image, 0x300f, 1), Ok((1920, 1080)));
        assert_eq!(dev.enum_frame_size(Pad::Image, 0x300f, 4), Err(Error::InvalidArgument));
        // not the Bayer order for the current flips
        assert_eq!(dev.enum_frame_size(Pad::Image, 0x300a, 0), Err(Error::InvalidArgument));
        assert_eq!(
            dev.enum_frame_size(Pad::Metadata, SENSOR_DATA, 0),
            Ok((16384, 1))
        );
        assert_eq!(dev.format(Pad::Metadata), METADATA_FORMAT);
    }

    #[test]
    fn selection_targets() {
        let (dev, _, _) = attached();
        assert_eq!(dev.selection(SelectionTarget::NativeSize).width, 3296);
        assert_eq!(dev.selection(SelectionTarget::CropBounds), ACTIVE_AREA);
        assert_eq!(
            dev.selection(SelectionTarget::Crop),
            SUPPORTED_MODES[0].crop
        );
    }

    #[test]
    fn suspend_and_resume_restart_streaming() {
        let (mut dev, _, power_log) = attached();
        dev.set_stream(true).unwrap();

        dev.suspend();
        assert_eq!(dev.run_state(), RunState::Standby);
        assert!(!power_log.powered());

        dev.resume().unwrap();
        assert_eq!(dev.run_state(), RunState::Streaming);
        assert!(power_log.powered());
    }

    #[test]
    fn failed_resume_falls_back_to_standby() {
        let (mut dev, port_log, power_log) = attached();
        dev.set_stream(true).unwrap();
        dev.suspend();

        port_log.clear();
        port_log.fail_write_at(0);
        assert_eq!(dev.resume(), Err(Error::Comm(FakeBusError)));
        assert_eq!(dev.run_state(), RunState::Standby);
        assert!(!power_log.powered());

        // nothing left to resume
        port_log.heal();
        assert_eq!(dev.resume(), Ok(()));
        assert_eq!(dev.run_state(), RunState::Standby);
    }

    #[test]
    fn resume_without_suspend_is_idle() {
        let (mut dev, port_log, power_log) = attached();
        dev.suspend();
        dev.resume().unwrap();
        assert!(port_log.writes().is_empty());
        assert_eq!(power_log.on_calls(), 1);
    }

    #[test]
    fn release_stops_streaming() {
        let (mut dev, port_log, power_log) = attached();
        dev.set_stream(true).unwrap();
        let _ = dev.release();
        assert_eq!(port_log.last_write(0x0100), Some(0));
        assert!(!power_log.powered());
    }
}
