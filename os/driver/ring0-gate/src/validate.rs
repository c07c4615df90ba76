//! # Request validation
//!
//! Turns an opcode and its raw buffers into a [`Command`] whose fields have
//! been parsed and checked against the per-operation size and range rules.
//! Nothing here touches hardware: a request that fails validation never
//! reaches a primitive, and is answered with
//! [`AccessError::InvalidParameter`] and zero bytes.

use crate::capabilities::Capabilities;
use crate::opcode::Opcode;
use crate::physical::{LEGACY_WINDOW, PhysicalRange};
use crate::status::AccessError;
use crate::wire::{
    MemoryDescriptor, PciAddress, PciConfigHeader, PortWidth, PortValue, QUERY_REPLY_LEN,
    REGISTER_VALUE_LEN, WriteMsrInput, WritePortInput, parse_index,
};

/// A request that passed validation, borrowing any payload from the input
/// buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    DriverVersion,
    RefCount,
    ReadMsr {
        index: u32,
    },
    WriteMsr {
        index: u32,
        value: u64,
    },
    ReadPmc {
        counter: u32,
    },
    Halt,
    ReadPort {
        port: u16,
        width: PortWidth,
        /// Declared input length, reported back as the byte count.
        input_len: usize,
    },
    WritePort {
        port: u16,
        value: PortValue,
    },
    ReadPciConfig {
        address: PciAddress,
        offset: u32,
        len: usize,
    },
    WritePciConfig {
        address: PciAddress,
        offset: u32,
        data: &'a [u8],
    },
    ReadMemory {
        range: PhysicalRange,
    },
    WriteMemory {
        range: PhysicalRange,
        data: &'a [u8],
    },
}

/// Validates a request for `opcode`.
///
/// `output_len` is the capacity of the caller's output buffer.
///
/// # Errors
/// [`AccessError::InvalidParameter`] if any size, range or capability rule
/// for `opcode` is violated.
pub fn validate(
    opcode: Opcode,
    input: &[u8],
    output_len: usize,
    caps: Capabilities,
) -> Result<Command<'_>, AccessError> {
    match opcode {
        Opcode::GetDriverVersion => query_reply(output_len).map(|()| Command::DriverVersion),
        Opcode::GetRefCount => query_reply(output_len).map(|()| Command::RefCount),
        Opcode::ReadMsr => register_read(input, output_len).map(|index| Command::ReadMsr { index }),
        Opcode::ReadPmc => register_read(input, output_len).map(|counter| Command::ReadPmc { counter }),
        Opcode::WriteMsr => write_msr(input),
        Opcode::Halt => Ok(Command::Halt),
        Opcode::ReadIoPort | Opcode::WriteIoPort => Err(AccessError::InvalidParameter),
        Opcode::ReadIoPortByte => read_port(input, output_len, PortWidth::Byte),
        Opcode::ReadIoPortWord => read_port(input, output_len, PortWidth::Word),
        Opcode::ReadIoPortDword => read_port(input, output_len, PortWidth::Dword),
        Opcode::WriteIoPortByte => write_port(input, PortWidth::Byte),
        Opcode::WriteIoPortWord => write_port(input, PortWidth::Word),
        Opcode::WriteIoPortDword => write_port(input, PortWidth::Dword),
        Opcode::ReadPciConfig => read_pci_config(input, output_len),
        Opcode::WritePciConfig => write_pci_config(input),
        Opcode::ReadMemory => read_memory(input, output_len, caps),
        Opcode::WriteMemory => write_memory(input, caps),
    }
}

const fn ensure(ok: bool) -> Result<(), AccessError> {
    if ok { Ok(()) } else { Err(AccessError::InvalidParameter) }
}

fn query_reply(output_len: usize) -> Result<(), AccessError> {
    ensure(output_len >= QUERY_REPLY_LEN)
}

/// MSR and PMC reads: a 4-byte index in, a full 64-bit value out.
fn register_read(input: &[u8], output_len: usize) -> Result<u32, AccessError> {
    ensure(output_len >= REGISTER_VALUE_LEN)?;
    parse_index(input).ok_or(AccessError::InvalidParameter)
}

fn write_msr(input: &[u8]) -> Result<Command<'_>, AccessError> {
    let WriteMsrInput { register, value } = WriteMsrInput::parse(input).ok_or(AccessError::InvalidParameter)?;
    Ok(Command::WriteMsr { index: register, value })
}

fn port_number(raw: u32) -> Result<u16, AccessError> {
    u16::try_from(raw).map_err(|_| AccessError::InvalidParameter)
}

fn read_port(input: &[u8], output_len: usize, width: PortWidth) -> Result<Command<'_>, AccessError> {
    ensure(output_len >= width.bytes())?;
    let port = parse_index(input).ok_or(AccessError::InvalidParameter)?;
    Ok(Command::ReadPort {
        port: port_number(port)?,
        width,
        input_len: input.len(),
    })
}

fn write_port(input: &[u8], width: PortWidth) -> Result<Command<'_>, AccessError> {
    let WritePortInput { port, value } = WritePortInput::parse(input, width).ok_or(AccessError::InvalidParameter)?;
    Ok(Command::WritePort {
        port: port_number(port)?,
        value,
    })
}

/// The input must be exactly the header; the output capacity is the read
/// length.
fn read_pci_config(input: &[u8], output_len: usize) -> Result<Command<'_>, AccessError> {
    ensure(input.len() == PciConfigHeader::LEN)?;
    let PciConfigHeader { address, offset } = PciConfigHeader::parse(input).ok_or(AccessError::InvalidParameter)?;
    Ok(Command::ReadPciConfig {
        address,
        offset,
        len: output_len,
    })
}

/// Everything after the header is written, including nothing at all.
fn write_pci_config(input: &[u8]) -> Result<Command<'_>, AccessError> {
    let PciConfigHeader { address, offset } = PciConfigHeader::parse(input).ok_or(AccessError::InvalidParameter)?;
    Ok(Command::WritePciConfig {
        address,
        offset,
        data: &input[PciConfigHeader::LEN..],
    })
}

fn read_memory(input: &[u8], output_len: usize, caps: Capabilities) -> Result<Command<'_>, AccessError> {
    ensure(input.len() == MemoryDescriptor::LEN)?;
    let range = MemoryDescriptor::parse(input)
        .ok_or(AccessError::InvalidParameter)?
        .range();
    let len = range.byte_len().ok_or(AccessError::InvalidParameter)?;
    ensure(output_len >= len)?;
    ensure(len == 0 || range.last().is_some())?;
    if !caps.full_physical_memory {
        ensure(range.is_within(&LEGACY_WINDOW))?;
    }
    Ok(Command::ReadMemory { range })
}

fn write_memory(input: &[u8], caps: Capabilities) -> Result<Command<'_>, AccessError> {
    ensure(caps.full_physical_memory)?;
    let range = MemoryDescriptor::parse(input)
        .ok_or(AccessError::InvalidParameter)?
        .range();
    let len = range.byte_len().ok_or(AccessError::InvalidParameter)?;
    let payload = &input[MemoryDescriptor::LEN..];
    ensure(payload.len() >= len)?;
    ensure(len == 0 || range.last().is_some())?;
    Ok(Command::WriteMemory {
        range,
        data: &payload[..len],
    })
}
