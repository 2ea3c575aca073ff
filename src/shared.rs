/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! A driver handle that can be shared between contexts.
//! Every entry point runs under one lock, so control writes, format changes
//! and stream transitions never interleave on the bus.

use spin::{Mutex, MutexGuard};

use crate::controls::{Control, ControlId};
use crate::port::RegisterPort;
use crate::power::PowerSequencer;
use crate::sensor::{Format, Imx307, Pad, RunState};
use crate::Error;

pub struct SharedImx307<P, S> {
    inner: Mutex<Imx307<P, S>>,
}

impl<P, S> SharedImx307<P, S>
where
    P: RegisterPort,
    S: PowerSequencer,
{
    pub fn new(dev: Imx307<P, S>) -> Self {
        Self {
            inner: Mutex::new(dev),
        }
    }

    /// Exclusive access for sequences of calls
    pub fn lock(&self) -> MutexGuard<'_, Imx307<P, S>> {
        self.inner.lock()
    }

    pub fn into_inner(self) -> Imx307<P, S> {
        self.inner.into_inner()
    }

    pub fn run_state(&self) -> RunState {
        self.lock().run_state()
    }

    pub fn control(&self, id: ControlId) -> Control {
        self.lock().control(id)
    }

    pub fn set_control(&self, id: ControlId, value: i32) -> Result<(), Error<P::Error, S::Error>> {
        self.lock().set_control(id, value)
    }

    pub fn format(&self, pad: Pad) -> Format {
        self.lock().format(pad)
    }

    pub fn set_format(
        &self,
        pad: Pad,
        code: u32,
        width: u32,
        height: u32,
    ) -> Result<Format, Error<P::Error, S::Error>> {
        self.lock().set_format(pad, code, width, height)
    }

    pub fn set_stream(&self, enable: bool) -> Result<(), Error<P::Error, S::Error>> {
        self.lock().set_stream(enable)
    }

    pub fn suspend(&self) {
        self.lock().suspend()
    }

    pub fn resume(&self) -> Result<(), Error<P::Error, S::Error>> {
        self.lock().resume()
    }
}
