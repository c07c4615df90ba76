//! # Hardware platform seams
//!
//! The primitive access routines never execute privileged instructions
//! directly; they go through the traits in this module. [`Platform`] is the
//! union of all of them and is what the [`Dispatcher`](crate::Dispatcher) is
//! generic over.
//!
//! ```text
//! Dispatcher ─► validate ─► access::* ─► Platform
//!                                          ├─ ModelSpecificRegisters  (rdmsr / wrmsr / rdpmc)
//!                                          ├─ PortIo                  (in / out)
//!                                          ├─ PciConfigSpace          (bus/slot/offset accessor)
//!                                          ├─ IoSpaceMapper           (map / unmap physical ranges)
//!                                          └─ Processor               (hlt)
//! ```
//!
//! [`native`] implements all of them for x86-64 hardware.

use crate::physical::PhysicalAddress;
use crate::wire::{PortValue, PortWidth};
use core::ptr::NonNull;

#[cfg(all(feature = "native", target_arch = "x86_64"))]
pub mod native;

/// A CPU exception raised by a privileged instruction, caught before it could
/// take down the host.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
#[error("privileged instruction raised a processor exception")]
pub struct Fault;

/// Register-level CPU primitives. Each call is expected to fault for indices
/// the executing core does not implement; implementations must report that as
/// [`Fault`] instead of letting it escape.
pub trait ModelSpecificRegisters {
    /// # Errors
    /// [`Fault`] if `index` names no readable MSR on this core.
    fn read_msr(&self, index: u32) -> Result<u64, Fault>;

    /// # Errors
    /// [`Fault`] if `index` names no writable MSR or `value` sets reserved bits.
    fn write_msr(&self, index: u32, value: u64) -> Result<(), Fault>;

    /// # Errors
    /// [`Fault`] if `counter` selects no implemented counter.
    fn read_pmc(&self, counter: u32) -> Result<u64, Fault>;
}

/// Legacy I/O port space.
pub trait PortIo {
    fn read_port(&self, port: u16, width: PortWidth) -> PortValue;
    fn write_port(&self, port: u16, value: PortValue);
}

/// Bus, device and function selector used by [`PciConfigSpace`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PciSlot {
    pub bus: u8,
    pub device: u8,
    pub function: u8,
}

/// Byte-granular PCI configuration space accessor.
///
/// Both methods return the number of bytes actually transferred, using the
/// conventions of the platform bus-data accessor:
///
/// * `0`: the bus does not exist,
/// * `2` when more or fewer than two bytes were requested: no device
///   answers at `slot` (the all-ones vendor ID was returned instead),
/// * anything else: the byte count transferred, which may fall short of
///   the request when it runs past the end of the configuration space.
pub trait PciConfigSpace {
    fn read_config(&self, slot: PciSlot, offset: u32, buf: &mut [u8]) -> usize;
    fn write_config(&self, slot: PciSlot, offset: u32, data: &[u8]) -> usize;
}

/// Maps physical ranges into the current address space for the duration of
/// one request.
pub trait IoSpaceMapper {
    /// Maps `len` bytes starting at `base`, uncached.
    ///
    /// Returns `None` if the range cannot be mapped.
    ///
    /// # Safety
    /// The returned pointer is only valid until the matching
    /// [`unmap_io_space`](Self::unmap_io_space) call and may alias device
    /// registers; it must only be accessed with volatile operations.
    unsafe fn map_io_space(&self, base: PhysicalAddress, len: usize) -> Option<NonNull<u8>>;

    /// Tears down a mapping made by [`map_io_space`](Self::map_io_space).
    ///
    /// # Safety
    /// `mapped` and `len` must be exactly what a prior `map_io_space` call
    /// returned and received, and the mapping must not be used afterwards.
    unsafe fn unmap_io_space(&self, mapped: NonNull<u8>, len: usize);
}

pub trait Processor {
    /// Halts the executing processor.
    fn halt(&self);
}

/// Everything the dispatcher needs from the hardware.
pub trait Platform: ModelSpecificRegisters + PortIo + PciConfigSpace + IoSpaceMapper + Processor {}

impl<T> Platform for T where T: ModelSpecificRegisters + PortIo + PciConfigSpace + IoSpaceMapper + Processor {}

/// A physical range mapped for the lifetime of this guard.
///
/// Dropping the guard unmaps the range, so every exit path of a transfer
/// tears the mapping down.
pub struct MappedRange<'a, M: IoSpaceMapper + ?Sized> {
    mapper: &'a M,
    base: NonNull<u8>,
    len: usize,
}

impl<'a, M: IoSpaceMapper + ?Sized> MappedRange<'a, M> {
    /// Maps `len` bytes at `base`.
    ///
    /// # Safety
    /// Same as [`IoSpaceMapper::map_io_space`].
    pub unsafe fn map(mapper: &'a M, base: PhysicalAddress, len: usize) -> Option<Self> {
        let ptr = unsafe { mapper.map_io_space(base, len)? };
        Some(Self { mapper, base: ptr, len })
    }

    #[inline]
    #[must_use]
    pub const fn as_ptr(&self) -> *mut u8 {
        self.base.as_ptr()
    }

    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<M: IoSpaceMapper + ?Sized> Drop for MappedRange<'_, M> {
    fn drop(&mut self) {
        // SAFETY: base/len are exactly what map_io_space produced and consumed.
        unsafe { self.mapper.unmap_io_space(self.base, self.len) }
    }
}
