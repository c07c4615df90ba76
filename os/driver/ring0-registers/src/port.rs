//! # x86 I/O Port Access
//!
//! Wrappers around the `in` and `out` instructions for the legacy, 16-bit
//! **I/O port address space** (`0x0000..=0xFFFF`). This space is separate from
//! physical memory; devices that live here (PIC, PIT, CMOS/RTC, super-I/O
//! sensor chips, the PCI configuration mechanism at `0xCF8`/`0xCFC`) cannot be
//! reached through ordinary loads and stores.
//!
//! ## Safety Requirements
//!
//! All functions in this module are `unsafe`. Callers must ensure:
//! * **Privilege:** Execute at CPL0 **or** have I/O permission (IOPL/IO bitmap)
//!   that allows access to `port`. Otherwise the CPU raises `#GP`.
//! * **Correct port:** Writing the wrong port or wrong value can wedge the
//!   device or the system (e.g., disabling the PIC, reprogramming timers).
//! * **Device presence:** Some platforms hang on accesses to nonexistent ports.
//! * **Ordering:** `in`/`out` are ordered relative to each other but are **not**
//!   a general memory fence.

/// Write one byte to an I/O port. Uses `out dx, al`.
///
/// # Safety
/// See the [module documentation](self).
#[cfg(all(feature = "asm", target_arch = "x86_64"))]
#[inline]
pub unsafe fn outb(port: u16, val: u8) {
    unsafe {
        core::arch::asm!("out dx, al", in("dx") port, in("al") val, options(nomem, nostack, preserves_flags));
    }
}

/// Write one word to an I/O port. Uses `out dx, ax`.
///
/// # Safety
/// See the [module documentation](self).
#[cfg(all(feature = "asm", target_arch = "x86_64"))]
#[inline]
pub unsafe fn outw(port: u16, val: u16) {
    unsafe {
        core::arch::asm!("out dx, ax", in("dx") port, in("ax") val, options(nomem, nostack, preserves_flags));
    }
}

/// Write one double word to an I/O port. Uses `out dx, eax`.
///
/// # Safety
/// See the [module documentation](self).
#[cfg(all(feature = "asm", target_arch = "x86_64"))]
#[inline]
pub unsafe fn outl(port: u16, val: u32) {
    unsafe {
        core::arch::asm!("out dx, eax", in("dx") port, in("eax") val, options(nomem, nostack, preserves_flags));
    }
}

/// Read one byte from an I/O port. Uses `in al, dx`.
///
/// # Safety
/// See the [module documentation](self). Reading some device registers has
/// side effects (e.g. clearing a latched status).
#[cfg(all(feature = "asm", target_arch = "x86_64"))]
#[inline]
pub unsafe fn inb(port: u16) -> u8 {
    let mut v: u8;
    unsafe {
        core::arch::asm!("in al, dx", in("dx") port, out("al") v, options(nomem, nostack, preserves_flags));
    }
    v
}

/// Read one word from an I/O port. Uses `in ax, dx`.
///
/// # Safety
/// See [`inb`].
#[cfg(all(feature = "asm", target_arch = "x86_64"))]
#[inline]
pub unsafe fn inw(port: u16) -> u16 {
    let mut v: u16;
    unsafe {
        core::arch::asm!("in ax, dx", in("dx") port, out("ax") v, options(nomem, nostack, preserves_flags));
    }
    v
}

/// Read one double word from an I/O port. Uses `in eax, dx`.
///
/// # Safety
/// See [`inb`].
#[cfg(all(feature = "asm", target_arch = "x86_64"))]
#[inline]
pub unsafe fn inl(port: u16) -> u32 {
    let mut v: u32;
    unsafe {
        core::arch::asm!("in eax, dx", in("dx") port, out("eax") v, options(nomem, nostack, preserves_flags));
    }
    v
}
