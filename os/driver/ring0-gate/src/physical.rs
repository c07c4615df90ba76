//! Physical addresses and the ranges requested by memory reads and writes.

use core::fmt;
use core::ops::RangeInclusive;

/// Physical memory address.
///
/// A thin wrapper around a raw `u64` that denotes a **physical** address
/// (host RAM / MMIO), so it cannot be confused with a pointer in the current
/// address space.
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PhysicalAddress(u64);

impl PhysicalAddress {
    #[inline]
    #[must_use]
    pub const fn new(v: u64) -> Self {
        Self(v)
    }

    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn checked_add(self, rhs: u64) -> Option<Self> {
        match self.0.checked_add(rhs) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }
}

impl fmt::Debug for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PA(0x{:016X})", self.as_u64())
    }
}

impl fmt::Display for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.as_u64())
    }
}

/// The legacy option-ROM / BIOS window, `0x000C_0000..=0x000F_FFFF`.
///
/// Without the `physical-memory` capability, reads must lie entirely inside
/// this window.
pub const LEGACY_WINDOW: RangeInclusive<PhysicalAddress> =
    PhysicalAddress::new(0x000C_0000)..=PhysicalAddress::new(0x000F_FFFF);

/// Element width of a bulk physical memory transfer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum UnitSize {
    Byte = 1,
    Word = 2,
    Dword = 4,
}

impl UnitSize {
    #[must_use]
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            1 => Some(Self::Byte),
            2 => Some(Self::Word),
            4 => Some(Self::Dword),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn bytes(self) -> usize {
        self as usize
    }
}

/// `count` elements of `unit_size` bytes starting at `base`.
///
/// The unit size is kept raw: an unsupported width is only refused once the
/// transfer itself is attempted.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PhysicalRange {
    pub base: PhysicalAddress,
    pub unit_size: u32,
    pub count: u32,
}

impl PhysicalRange {
    #[must_use]
    pub const fn new(base: PhysicalAddress, unit_size: u32, count: u32) -> Self {
        Self {
            base,
            unit_size,
            count,
        }
    }

    #[must_use]
    pub const fn unit(&self) -> Option<UnitSize> {
        UnitSize::from_raw(self.unit_size)
    }

    /// `unit_size * count`, or `None` on overflow.
    #[must_use]
    pub const fn byte_len(&self) -> Option<usize> {
        match (self.unit_size as usize).checked_mul(self.count as usize) {
            // Transfers are described with 32-bit lengths.
            Some(len) if len <= u32::MAX as usize => Some(len),
            _ => None,
        }
    }

    /// Last address touched, or `None` if the range is empty or wraps.
    #[must_use]
    pub fn last(&self) -> Option<PhysicalAddress> {
        let len = self.byte_len()?;
        if len == 0 {
            return None;
        }
        self.base.checked_add(len as u64 - 1)
    }

    /// Whether every byte of the range lies inside `window`.
    ///
    /// An empty range is inside when its base is.
    #[must_use]
    pub fn is_within(&self, window: &RangeInclusive<PhysicalAddress>) -> bool {
        if !window.contains(&self.base) {
            return false;
        }
        match self.byte_len() {
            Some(0) => true,
            Some(_) => self.last().is_some_and(|last| window.contains(&last)),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_sizes() {
        assert_eq!(UnitSize::from_raw(1), Some(UnitSize::Byte));
        assert_eq!(UnitSize::from_raw(4), Some(UnitSize::Dword));
        assert_eq!(UnitSize::from_raw(3), None);
        assert_eq!(UnitSize::from_raw(8), None);
    }

    #[test]
    fn legacy_window_edges() {
        let start = PhysicalAddress::new(0x000C_0000);
        assert!(PhysicalRange::new(start, 1, 16).is_within(&LEGACY_WINDOW));
        assert!(PhysicalRange::new(PhysicalAddress::new(0x000F_FFFC), 4, 1).is_within(&LEGACY_WINDOW));
        assert!(!PhysicalRange::new(PhysicalAddress::new(0x000F_FFFC), 4, 2).is_within(&LEGACY_WINDOW));
        assert!(!PhysicalRange::new(PhysicalAddress::new(0x000B_FFFF), 1, 1).is_within(&LEGACY_WINDOW));
        assert!(!PhysicalRange::new(PhysicalAddress::new(0), 1, 16).is_within(&LEGACY_WINDOW));
    }

    #[test]
    fn wrapping_ranges_are_rejected() {
        let r = PhysicalRange::new(PhysicalAddress::new(u64::MAX), 4, 2);
        assert_eq!(r.last(), None);
        assert!(!r.is_within(&(PhysicalAddress::new(0)..=PhysicalAddress::new(u64::MAX))));
    }

    #[test]
    fn length_overflow_is_detected() {
        assert_eq!(PhysicalRange::new(PhysicalAddress::new(0), u32::MAX, 2).byte_len(), None);
        assert_eq!(PhysicalRange::new(PhysicalAddress::new(0), 4, 4).byte_len(), Some(16));
    }
}
