//! # Wire contract
//!
//! Input structures exchanged through the buffered request path. All fields
//! are little-endian and packed on 4-byte boundaries; variable-length payloads
//! follow their fixed header directly.
//!
//! | Structure                | Layout                                     | Size   |
//! |--------------------------|--------------------------------------------|--------|
//! | index (MSR/PMC/port)     | `u32`                                      | 4      |
//! | [`WriteMsrInput`]        | `u32 register`, `u64 value`                | 12     |
//! | [`WritePortInput`]       | `u32 port`, value union                    | 8      |
//! | [`PciConfigHeader`]      | `u32 address`, `u32 offset`, payload…      | 8 + n  |
//! | [`MemoryDescriptor`]     | `u64 address`, `u32 unit`, `u32 count`, …  | 16 + n |
//!
//! Parsers only check that enough bytes are present; per-operation policy
//! lives in [`validate`](crate::validate).

use crate::physical::{PhysicalAddress, PhysicalRange};
use bitfield_struct::bitfield;

/// Length of a bare register, counter or port index.
pub const INDEX_INPUT_LEN: usize = 4;

/// Every 64-bit register read produces this many bytes.
pub const REGISTER_VALUE_LEN: usize = 8;

/// Length of the version and reference count replies.
pub const QUERY_REPLY_LEN: usize = 4;

#[inline]
fn le_u32(bytes: &[u8], at: usize) -> Option<u32> {
    let raw = bytes.get(at..at + 4)?;
    Some(u32::from_le_bytes(raw.try_into().ok()?))
}

#[inline]
fn le_u64(bytes: &[u8], at: usize) -> Option<u64> {
    let raw = bytes.get(at..at + 8)?;
    Some(u64::from_le_bytes(raw.try_into().ok()?))
}

/// Reads the leading `u32` index of an MSR, PMC or port request.
#[must_use]
pub fn parse_index(input: &[u8]) -> Option<u32> {
    le_u32(input, 0)
}

/// Packed `(bus, device, function)` PCI address.
///
/// ```text
///  31        16 15     8 7      3 2    0
/// ┌────────────┬────────┬────────┬──────┐
/// │  reserved  │  bus   │ device │ func │
/// └────────────┴────────┴────────┴──────┘
/// ```
#[bitfield(u32)]
#[derive(PartialEq, Eq, Hash)]
pub struct PciAddress {
    /// Bits 0–2: function number.
    #[bits(3)]
    pub function: u8,
    /// Bits 3–7: device number.
    #[bits(5)]
    pub device: u8,
    /// Bits 8–15: bus number.
    pub bus: u8,
    /// Bits 16–31: ignored.
    #[bits(16)]
    _reserved: u16,
}

impl PciAddress {
    /// Packs a bus/device/function triple, discarding out-of-range bits the
    /// same way the hardware selector does.
    #[must_use]
    pub const fn from_parts(bus: u8, device: u8, function: u8) -> Self {
        Self::new()
            .with_bus(bus)
            .with_device(device & 0x1F)
            .with_function(function & 0x07)
    }
}

/// Input of a write-MSR request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct WriteMsrInput {
    pub register: u32,
    pub value: u64,
}

impl WriteMsrInput {
    pub const LEN: usize = 12;

    #[must_use]
    pub fn parse(input: &[u8]) -> Option<Self> {
        Some(Self {
            register: le_u32(input, 0)?,
            value: le_u64(input, 4)?,
        })
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut out = [0; Self::LEN];
        out[..4].copy_from_slice(&self.register.to_le_bytes());
        out[4..].copy_from_slice(&self.value.to_le_bytes());
        out
    }
}

/// Width of a single port access, fixed by the opcode variant.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PortWidth {
    Byte = 1,
    Word = 2,
    Dword = 4,
}

impl PortWidth {
    #[inline]
    #[must_use]
    pub const fn bytes(self) -> usize {
        self as usize
    }
}

/// A value written to, or read from, an I/O port.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PortValue {
    Byte(u8),
    Word(u16),
    Dword(u32),
}

impl PortValue {
    #[must_use]
    pub const fn width(self) -> PortWidth {
        match self {
            Self::Byte(_) => PortWidth::Byte,
            Self::Word(_) => PortWidth::Word,
            Self::Dword(_) => PortWidth::Dword,
        }
    }

    /// Zero-extended value.
    #[must_use]
    pub const fn widened(self) -> u32 {
        match self {
            Self::Byte(v) => v as u32,
            Self::Word(v) => v as u32,
            Self::Dword(v) => v,
        }
    }

    /// Truncates `raw` to `width`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn truncate(width: PortWidth, raw: u32) -> Self {
        match width {
            PortWidth::Byte => Self::Byte(raw as u8),
            PortWidth::Word => Self::Word(raw as u16),
            PortWidth::Dword => Self::Dword(raw),
        }
    }

    /// Copies the value into `out` in native byte order.
    ///
    /// Returns `None` if `out` is shorter than the value.
    pub fn copy_to(self, out: &mut [u8]) -> Option<()> {
        match self {
            Self::Byte(v) => out.first_mut().map(|b| *b = v),
            Self::Word(v) => out.get_mut(..2).map(|o| o.copy_from_slice(&v.to_ne_bytes())),
            Self::Dword(v) => out.get_mut(..4).map(|o| o.copy_from_slice(&v.to_ne_bytes())),
        }
    }
}

/// Input of a width-specific port write. The value sits in a union after the
/// port number; only the leading `width` bytes of it are read.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct WritePortInput {
    pub port: u32,
    pub value: PortValue,
}

impl WritePortInput {
    /// Size of the full structure including the 4-byte union.
    pub const LEN: usize = 8;

    /// Smallest input that carries a value of `width`.
    #[must_use]
    pub const fn min_len(width: PortWidth) -> usize {
        INDEX_INPUT_LEN + width.bytes()
    }

    #[must_use]
    pub fn parse(input: &[u8], width: PortWidth) -> Option<Self> {
        let port = le_u32(input, 0)?;
        let v = input.get(INDEX_INPUT_LEN..Self::min_len(width))?;
        let value = match width {
            PortWidth::Byte => PortValue::Byte(v[0]),
            PortWidth::Word => PortValue::Word(u16::from_le_bytes([v[0], v[1]])),
            PortWidth::Dword => PortValue::Dword(u32::from_le_bytes([v[0], v[1], v[2], v[3]])),
        };
        Some(Self { port, value })
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut out = [0; Self::LEN];
        out[..4].copy_from_slice(&self.port.to_le_bytes());
        out[4..].copy_from_slice(&self.value.widened().to_le_bytes());
        out
    }
}

/// Fixed header of the PCI configuration requests.
///
/// A read request is exactly this header; a write request appends the bytes
/// to write.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PciConfigHeader {
    pub address: PciAddress,
    pub offset: u32,
}

impl PciConfigHeader {
    pub const LEN: usize = 8;

    #[must_use]
    pub fn parse(input: &[u8]) -> Option<Self> {
        Some(Self {
            address: PciAddress::from_bits(le_u32(input, 0)?),
            offset: le_u32(input, 4)?,
        })
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut out = [0; Self::LEN];
        out[..4].copy_from_slice(&self.address.into_bits().to_le_bytes());
        out[4..].copy_from_slice(&self.offset.to_le_bytes());
        out
    }
}

/// Fixed header of the physical memory requests.
///
/// A read request is exactly this descriptor; a write request appends
/// `unit_size * count` bytes of data.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MemoryDescriptor {
    pub address: PhysicalAddress,
    pub unit_size: u32,
    pub count: u32,
}

impl MemoryDescriptor {
    pub const LEN: usize = 16;

    #[must_use]
    pub fn parse(input: &[u8]) -> Option<Self> {
        Some(Self {
            address: PhysicalAddress::new(le_u64(input, 0)?),
            unit_size: le_u32(input, 8)?,
            count: le_u32(input, 12)?,
        })
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut out = [0; Self::LEN];
        out[..8].copy_from_slice(&self.address.as_u64().to_le_bytes());
        out[8..12].copy_from_slice(&self.unit_size.to_le_bytes());
        out[12..].copy_from_slice(&self.count.to_le_bytes());
        out
    }

    #[must_use]
    pub const fn range(&self) -> PhysicalRange {
        PhysicalRange::new(self.address, self.unit_size, self.count)
    }
}

/// Packed service version: one byte each for major, minor, revision and
/// release, most significant first.
#[bitfield(u32)]
#[derive(PartialEq, Eq)]
pub struct DriverVersion {
    /// Bits 0–7.
    pub release: u8,
    /// Bits 8–15.
    pub revision: u8,
    /// Bits 16–23.
    pub minor: u8,
    /// Bits 24–31.
    pub major: u8,
}

/// Identifier under which the service publishes itself.
pub const SERVICE_ID: &str = "WinRing0_1_2_0";

/// The version reported by the version query.
pub const VERSION: DriverVersion = DriverVersion::new()
    .with_major(1)
    .with_minor(2)
    .with_revision(0)
    .with_release(5);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pci_address_bit_positions() {
        let a = PciAddress::from_parts(0x12, 0x1F, 0x7);
        assert_eq!(a.into_bits(), 0x12FF);
        let b = PciAddress::from_bits(0xABCD_0A0B);
        assert_eq!(b.bus(), 0x0A);
        assert_eq!(b.device(), 0x01);
        assert_eq!(b.function(), 0x03);
    }

    #[test]
    fn pci_address_masks_out_of_range_parts() {
        let a = PciAddress::from_parts(0, 0x21, 0x09);
        assert_eq!(a.device(), 0x01);
        assert_eq!(a.function(), 0x01);
    }

    #[test]
    fn version_is_packed_most_significant_first() {
        assert_eq!(VERSION.into_bits(), 0x0102_0005);
    }

    #[test]
    fn short_inputs_do_not_parse() {
        assert!(parse_index(&[1, 2, 3]).is_none());
        assert!(WriteMsrInput::parse(&[0; 11]).is_none());
        assert!(PciConfigHeader::parse(&[0; 7]).is_none());
        assert!(MemoryDescriptor::parse(&[0; 15]).is_none());
        assert!(WritePortInput::parse(&[0; 5], PortWidth::Word).is_none());
        assert!(WritePortInput::parse(&[0; 6], PortWidth::Word).is_some());
    }

    #[test]
    fn port_union_reads_leading_bytes() {
        let bytes = WritePortInput {
            port: 0x80,
            value: PortValue::Dword(0xAABB_CCDD),
        }
        .to_bytes();
        let byte = WritePortInput::parse(&bytes, PortWidth::Byte).unwrap();
        assert_eq!(byte.value, PortValue::Byte(0xDD));
        let word = WritePortInput::parse(&bytes, PortWidth::Word).unwrap();
        assert_eq!(word.value, PortValue::Word(0xCCDD));
    }

    #[test]
    fn port_value_copy_respects_buffer() {
        let mut out = [0u8; 1];
        assert!(PortValue::Word(0x1234).copy_to(&mut out).is_none());
        assert!(PortValue::Byte(0x12).copy_to(&mut out).is_some());
        assert_eq!(out, [0x12]);
    }
}
