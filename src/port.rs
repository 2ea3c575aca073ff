/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! Register access over the two-wire bus.
//! Registers use 16-bit addresses and big-endian values of one to four bytes.

use embedded_hal::blocking::i2c;

/// Size of a register value in bytes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Width {
    U8 = 1,
    U16 = 2,
    U24 = 3,
    U32 = 4,
}

impl Width {
    pub const fn bytes(self) -> usize {
        self as usize
    }

    /// Keep only the low bytes of `value` that fit this width
    pub fn truncate(self, value: u32) -> u32 {
        match self {
            Width::U32 => value,
            _ => value & ((1u32 << (8 * self.bytes())) - 1),
        }
    }
}

/// A single register write
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegWrite {
    pub address: u16,
    pub width: Width,
    pub value: u32,
}

impl RegWrite {
    pub const fn new(address: u16, width: Width, value: u32) -> Self {
        Self {
            address,
            width,
            value,
        }
    }
}

/// Capability to read and write sensor registers.
/// Each call is a single bus transaction that either completes or fails.
pub trait RegisterPort {
    type Error;

    fn read(&mut self, address: u16, width: Width) -> Result<u32, Self::Error>;

    fn write(&mut self, address: u16, width: Width, value: u32) -> Result<(), Self::Error>;

    fn apply(&mut self, reg: RegWrite) -> Result<(), Self::Error> {
        self.write(reg.address, reg.width, reg.value)
    }
}

/// Write an ordered list of 8-bit registers, stopping at the first failure
pub fn write_recipe<P: RegisterPort>(port: &mut P, regs: &[(u16, u8)]) -> Result<(), P::Error> {
    for &(address, value) in regs {
        if let Err(e) = port.write(address, Width::U8, value as u32) {
            log::error!("failed to write reg 0x{:04x}", address);
            return Err(e);
        }
    }
    Ok(())
}

/// `RegisterPort` on top of an embedded-hal I2C bus
pub struct I2cRegisterPort<I2C> {
    address: u8,
    i2c: I2C,
}

impl<I2C> I2cRegisterPort<I2C> {
    /// Create a new port with a 7-bit i2c address:
    /// May use DEFAULT_I2C_ADDRESS if in doubt.
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { address, i2c }
    }

    pub fn default(i2c: I2C) -> Self {
        Self::new(i2c, crate::DEFAULT_I2C_ADDRESS)
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C, CommE> RegisterPort for I2cRegisterPort<I2C>
where
    I2C: i2c::Write<Error = CommE> + i2c::WriteRead<Error = CommE>,
{
    type Error = CommE;

    fn read(&mut self, address: u16, width: Width) -> Result<u32, CommE> {
        let cmd_buf = address.to_be_bytes();
        let mut data_buf = [0u8; 4];
        // right-align the value so it decodes as a big-endian u32
        let offset = 4 - width.bytes();
        self.i2c
            .write_read(self.address, &cmd_buf, &mut data_buf[offset..])?;
        Ok(u32::from_be_bytes(data_buf))
    }

    fn write(&mut self, address: u16, width: Width, value: u32) -> Result<(), CommE> {
        let len = width.bytes();
        let value_buf = width.truncate(value).to_be_bytes();
        let mut write_buf = [0u8; 6];
        write_buf[..2].copy_from_slice(&address.to_be_bytes());
        write_buf[2..2 + len].copy_from_slice(&value_buf[4 - len..]);
        self.i2c.write(self.address, &write_buf[..2 + len])
    }
}
