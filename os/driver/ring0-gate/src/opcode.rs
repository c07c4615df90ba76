//! # Control codes
//!
//! Every control request names its operation with a 32-bit code laid out as
//!
//! ```text
//!  31            16 15  14 13          2 1    0
//! ┌────────────────┬──────┬─────────────┬──────┐
//! │  device type   │access│  function   │method│
//! └────────────────┴──────┴─────────────┴──────┘
//! ```
//!
//! All codes of this service use device type [`DEVICE_TYPE`] and the
//! buffered transfer method; they differ in function number and in the access
//! class a caller's handle must have been granted.

/// Device type shared by every control code of this service.
///
/// Values from 32768 to 65535 are reserved for vendor use.
pub const DEVICE_TYPE: u16 = 40_000;

/// Buffered transfer: input and output share one system buffer.
const METHOD_BUFFERED: u32 = 0;

/// Access a handle must hold to issue a control code.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Access {
    Any = 0,
    Read = 1,
    Write = 2,
    ReadWrite = 3,
}

impl Access {
    const fn from_bits(bits: u32) -> Self {
        match bits & 0b11 {
            0 => Self::Any,
            1 => Self::Read,
            2 => Self::Write,
            _ => Self::ReadWrite,
        }
    }
}

/// Builds a control code from its parts.
#[must_use]
pub const fn control_code(device_type: u16, function: u16, method: u32, access: Access) -> u32 {
    ((device_type as u32) << 16) | ((access as u32) << 14) | ((function as u32) << 2) | method
}

const fn code(function: u16, access: Access) -> u32 {
    control_code(DEVICE_TYPE, function, METHOD_BUFFERED, access)
}

/// The closed set of operations this service recognizes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Opcode {
    GetDriverVersion = code(0x800, Access::Any),
    GetRefCount = code(0x801, Access::Any),

    ReadMsr = code(0x821, Access::Any),
    WriteMsr = code(0x822, Access::Any),
    ReadPmc = code(0x823, Access::Any),
    Halt = code(0x824, Access::Any),

    /// Width-less port read. Recognized, but always rejected.
    ReadIoPort = code(0x831, Access::Read),
    /// Width-less port write. Recognized, but always rejected.
    WriteIoPort = code(0x832, Access::Write),
    ReadIoPortByte = code(0x833, Access::Read),
    ReadIoPortWord = code(0x834, Access::Read),
    ReadIoPortDword = code(0x835, Access::Read),
    WriteIoPortByte = code(0x836, Access::Write),
    WriteIoPortWord = code(0x837, Access::Write),
    WriteIoPortDword = code(0x838, Access::Write),

    ReadMemory = code(0x841, Access::Read),
    WriteMemory = code(0x842, Access::Write),

    ReadPciConfig = code(0x851, Access::Read),
    WritePciConfig = code(0x852, Access::Write),
}

impl Opcode {
    pub const ALL: [Self; 18] = [
        Self::GetDriverVersion,
        Self::GetRefCount,
        Self::ReadMsr,
        Self::WriteMsr,
        Self::ReadPmc,
        Self::Halt,
        Self::ReadIoPort,
        Self::WriteIoPort,
        Self::ReadIoPortByte,
        Self::ReadIoPortWord,
        Self::ReadIoPortDword,
        Self::WriteIoPortByte,
        Self::WriteIoPortWord,
        Self::WriteIoPortDword,
        Self::ReadMemory,
        Self::WriteMemory,
        Self::ReadPciConfig,
        Self::WritePciConfig,
    ];

    /// Looks up the opcode for a raw control code.
    #[must_use]
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.code() == code)
    }

    #[inline]
    #[must_use]
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Function number (bits 2–13).
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn function(self) -> u16 {
        ((self.code() >> 2) & 0x0FFF) as u16
    }

    /// Access class the issuing handle must hold (bits 14–15).
    #[inline]
    #[must_use]
    pub const fn access(self) -> Access {
        Access::from_bits(self.code() >> 14)
    }
}

impl TryFrom<u32> for Opcode {
    type Error = u32;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::from_code(value).ok_or(value)
    }
}
