/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! Recording fakes for the bus and power collaborators

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::vec::Vec;

use crate::port::{RegWrite, RegisterPort, Width};
use crate::power::PowerSequencer;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FakeBusError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FakePowerError;

#[derive(Default)]
struct PortState {
    writes: Vec<RegWrite>,
    attempts: usize,
    fail_at: Option<usize>,
    fail_reads: bool,
    registers: BTreeMap<u16, u32>,
}

/// Inspection handle for a `FakePort` that has been moved into a driver
#[derive(Clone, Default)]
pub struct PortLog(Arc<Mutex<PortState>>);

impl PortLog {
    /// Successful writes, in issue order
    pub fn writes(&self) -> Vec<RegWrite> {
        self.0.lock().unwrap().writes.clone()
    }

    pub fn clear(&self) {
        let mut state = self.0.lock().unwrap();
        state.writes.clear();
        state.attempts = 0;
    }

    /// Fail the write attempt with this zero-based index (counted since the last `clear`)
    pub fn fail_write_at(&self, attempt: usize) {
        self.0.lock().unwrap().fail_at = Some(attempt);
    }

    pub fn heal(&self) {
        let mut state = self.0.lock().unwrap();
        state.fail_at = None;
        state.fail_reads = false;
    }

    pub fn fail_reads(&self) {
        self.0.lock().unwrap().fail_reads = true;
    }

    pub fn set_register(&self, address: u16, value: u32) {
        self.0.lock().unwrap().registers.insert(address, value);
    }

    /// Last value written to `address`
    pub fn last_write(&self, address: u16) -> Option<u32> {
        self.writes()
            .iter()
            .rev()
            .find(|w| w.address == address)
            .map(|w| w.value)
    }
}

pub struct FakePort {
    log: PortLog,
}

impl FakePort {
    /// A port whose chip-id register answers like a real sensor
    pub fn new() -> (Self, PortLog) {
        let log = PortLog::default();
        log.set_register(0x0000, crate::regs::CHIP_ID as u32);
        (Self { log: log.clone() }, log)
    }
}

impl RegisterPort for FakePort {
    type Error = FakeBusError;

    fn read(&mut self, address: u16, width: Width) -> Result<u32, FakeBusError> {
        let state = self.log.0.lock().unwrap();
        if state.fail_reads {
            return Err(FakeBusError);
        }
        let value = state.registers.get(&address).copied().unwrap_or(0);
        Ok(width.truncate(value))
    }

    fn write(&mut self, address: u16, width: Width, value: u32) -> Result<(), FakeBusError> {
        let mut state = self.log.0.lock().unwrap();
        let attempt = state.attempts;
        state.attempts += 1;
        if state.fail_at == Some(attempt) {
            return Err(FakeBusError);
        }
        state.writes.push(RegWrite::new(address, width, width.truncate(value)));
        Ok(())
    }
}

#[derive(Default)]
struct PowerState {
    powered: bool,
    on_calls: usize,
    off_calls: usize,
    fail_on: bool,
}

#[derive(Clone, Default)]
pub struct PowerLog(Arc<Mutex<PowerState>>);

impl PowerLog {
    pub fn powered(&self) -> bool {
        self.0.lock().unwrap().powered
    }

    pub fn on_calls(&self) -> usize {
        self.0.lock().unwrap().on_calls
    }

    pub fn off_calls(&self) -> usize {
        self.0.lock().unwrap().off_calls
    }

    pub fn fail_power_on(&self, fail: bool) {
        self.0.lock().unwrap().fail_on = fail;
    }
}

pub struct FakePower {
    log: PowerLog,
}

impl FakePower {
    pub fn new() -> (Self, PowerLog) {
        let log = PowerLog::default();
        (Self { log: log.clone() }, log)
    }
}

impl PowerSequencer for FakePower {
    type Error = FakePowerError;

    fn power_on(&mut self) -> Result<(), FakePowerError> {
        let mut state = self.log.0.lock().unwrap();
        state.on_calls += 1;
        if state.fail_on {
            return Err(FakePowerError);
        }
        state.powered = true;
        Ok(())
    }

    fn power_off(&mut self) {
        let mut state = self.log.0.lock().unwrap();
        state.off_calls += 1;
        state.powered = false;
    }
}
