//! # x86-64 hardware backend
//!
//! Implements the [`Platform`](super::Platform) seams on bare hardware:
//!
//! * MSRs and PMCs through `ring0-registers`, each access wrapped in a
//!   host-supplied [`FaultTrap`],
//! * I/O ports through `in`/`out`,
//! * PCI configuration space through configuration mechanism #1
//!   (`CONFIG_ADDRESS` at `0xCF8`, `CONFIG_DATA` at `0xCFC`),
//! * physical ranges through the kernel's higher-half direct map.
//!
//! ## Fault trapping
//! `rdmsr`, `wrmsr` and `rdpmc` raise `#GP(0)` for indices the core does not
//! implement. Only the host's exception dispatcher can recover from that (an
//! exception-table fixup, structured exception handling, …), so the host
//! provides a [`FaultTrap`] that runs an operation and reports whether it
//! faulted. [`Untrapped`] runs the operation bare and is only suitable when
//! every index is known to be valid.

use super::{Fault, IoSpaceMapper, ModelSpecificRegisters, PciConfigSpace, PciSlot, PortIo, Processor};
use crate::physical::PhysicalAddress;
use crate::wire::{PortValue, PortWidth};
use core::ptr::NonNull;
use ring0_registers::{Msr, Pmc, port, processor};
use spin::Mutex;

/// Runs a privileged operation and reports whether it raised an exception.
pub trait FaultTrap {
    /// # Errors
    /// [`Fault`] if `op` raised a processor exception that was caught.
    fn catch(&self, op: &mut dyn FnMut()) -> Result<(), Fault>;
}

/// Runs operations without any recovery; a fault is fatal to the host.
#[derive(Debug, Default, Copy, Clone)]
pub struct Untrapped;

impl FaultTrap for Untrapped {
    #[inline]
    fn catch(&self, op: &mut dyn FnMut()) -> Result<(), Fault> {
        op();
        Ok(())
    }
}

const CONFIG_ADDRESS: u16 = 0xCF8;
const CONFIG_DATA: u16 = 0xCFC;
const CONFIG_ENABLE: u32 = 1 << 31;

/// Size of the configuration space reachable through mechanism #1.
const CONFIG_SPACE_LEN: u32 = 256;

const VENDOR_ID_NONE: u16 = 0xFFFF;

/// Configuration mechanism #1.
///
/// Selecting a register and accessing it are two separate port operations,
/// so the pair is serialized across processors with a spin lock.
struct Mechanism1 {
    lock: Mutex<()>,
}

impl Mechanism1 {
    const fn new() -> Self {
        Self { lock: Mutex::new(()) }
    }

    /// Runs `f` with the configuration ports held; released when the guard
    /// drops, including on unwind.
    fn exclusive<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.lock.lock();
        f()
    }

    const fn address(slot: PciSlot, offset: u32) -> u32 {
        CONFIG_ENABLE
            | ((slot.bus as u32) << 16)
            | (((slot.device & 0x1F) as u32) << 11)
            | (((slot.function & 0x07) as u32) << 8)
            | (offset & 0xFC)
    }

    #[allow(clippy::cast_possible_truncation)]
    unsafe fn read_byte(slot: PciSlot, offset: u32) -> u8 {
        unsafe {
            port::outl(CONFIG_ADDRESS, Self::address(slot, offset));
            port::inb(CONFIG_DATA + (offset & 0x3) as u16)
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    unsafe fn write_byte(slot: PciSlot, offset: u32, value: u8) {
        unsafe {
            port::outl(CONFIG_ADDRESS, Self::address(slot, offset));
            port::outb(CONFIG_DATA + (offset & 0x3) as u16, value);
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    unsafe fn vendor_id(slot: PciSlot) -> u16 {
        unsafe {
            port::outl(CONFIG_ADDRESS, Self::address(slot, 0));
            (port::inl(CONFIG_DATA) & 0xFFFF) as u16
        }
    }

    /// Number of bytes of a `len`-byte access at `offset` that fall inside
    /// the configuration space.
    fn clamp(offset: u32, len: usize) -> usize {
        let room = CONFIG_SPACE_LEN.saturating_sub(offset) as usize;
        len.min(room)
    }
}

/// Bare-metal x86-64 [`Platform`](super::Platform).
pub struct NativePlatform<T: FaultTrap = Untrapped> {
    trap: T,
    /// Virtual base of the higher-half direct map of physical memory.
    hhdm_base: u64,
    pci: Mechanism1,
}

impl<T: FaultTrap> NativePlatform<T> {
    /// Creates the backend.
    ///
    /// # Safety
    /// Must only be used at CPL0. `hhdm_base` must be the base of a direct
    /// map covering every physical address that will be requested, mapped
    /// uncached where it covers device memory.
    pub const unsafe fn new(trap: T, hhdm_base: u64) -> Self {
        Self {
            trap,
            hhdm_base,
            pci: Mechanism1::new(),
        }
    }
}

impl<T: FaultTrap> ModelSpecificRegisters for NativePlatform<T> {
    fn read_msr(&self, index: u32) -> Result<u64, Fault> {
        let mut value = 0;
        // SAFETY: CPL0 is a construction precondition; #GP is caught by the trap.
        self.trap.catch(&mut || value = unsafe { Msr::new(index).load_raw() })?;
        Ok(value)
    }

    fn write_msr(&self, index: u32, value: u64) -> Result<(), Fault> {
        // SAFETY: as above.
        self.trap.catch(&mut || unsafe { Msr::new(index).store_raw(value) })
    }

    fn read_pmc(&self, counter: u32) -> Result<u64, Fault> {
        let mut value = 0;
        // SAFETY: as above.
        self.trap.catch(&mut || value = unsafe { Pmc::new(counter).load_raw() })?;
        Ok(value)
    }
}

impl<T: FaultTrap> PortIo for NativePlatform<T> {
    fn read_port(&self, port: u16, width: PortWidth) -> PortValue {
        // SAFETY: CPL0; the caller chose the port.
        unsafe {
            match width {
                PortWidth::Byte => PortValue::Byte(port::inb(port)),
                PortWidth::Word => PortValue::Word(port::inw(port)),
                PortWidth::Dword => PortValue::Dword(port::inl(port)),
            }
        }
    }

    fn write_port(&self, port: u16, value: PortValue) {
        // SAFETY: CPL0; the caller chose the port and value.
        unsafe {
            match value {
                PortValue::Byte(v) => port::outb(port, v),
                PortValue::Word(v) => port::outw(port, v),
                PortValue::Dword(v) => port::outl(port, v),
            }
        }
    }
}

impl<T: FaultTrap> PciConfigSpace for NativePlatform<T> {
    fn read_config(&self, slot: PciSlot, offset: u32, buf: &mut [u8]) -> usize {
        self.pci.exclusive(|| {
            // SAFETY: CPL0; mechanism #1 ports are serialized by the lock.
            if unsafe { Mechanism1::vendor_id(slot) } == VENDOR_ID_NONE {
                for b in buf.iter_mut().take(2) {
                    *b = 0xFF;
                }
                return 2;
            }
            let n = Mechanism1::clamp(offset, buf.len());
            for (b, reg) in buf[..n].iter_mut().zip(offset..) {
                *b = unsafe { Mechanism1::read_byte(slot, reg) };
            }
            n
        })
    }

    fn write_config(&self, slot: PciSlot, offset: u32, data: &[u8]) -> usize {
        self.pci.exclusive(|| {
            // SAFETY: CPL0; mechanism #1 ports are serialized by the lock.
            if unsafe { Mechanism1::vendor_id(slot) } == VENDOR_ID_NONE {
                return 0;
            }
            let n = Mechanism1::clamp(offset, data.len());
            for (&b, reg) in data[..n].iter().zip(offset..) {
                unsafe { Mechanism1::write_byte(slot, reg, b) };
            }
            n
        })
    }
}

impl<T: FaultTrap> IoSpaceMapper for NativePlatform<T> {
    unsafe fn map_io_space(&self, base: PhysicalAddress, len: usize) -> Option<NonNull<u8>> {
        let va = self.hhdm_base.checked_add(base.as_u64())?;
        va.checked_add(len as u64)?;
        NonNull::new(va as *mut u8)
    }

    unsafe fn unmap_io_space(&self, _mapped: NonNull<u8>, _len: usize) {
        // The direct map is permanent.
    }
}

impl<T: FaultTrap> Processor for NativePlatform<T> {
    fn halt(&self) {
        // SAFETY: CPL0.
        unsafe { processor::hlt() }
    }
}
