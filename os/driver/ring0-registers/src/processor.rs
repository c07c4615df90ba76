//! Processor control.

/// Halts the executing processor until the next external interrupt.
///
/// If interrupts are masked when this executes, the core does not resume
/// until an NMI, SMI or INIT arrives.
///
/// # Safety
/// Requires **CPL=0**. Halting the processor that holds a lock other cores
/// spin on stalls them too.
#[cfg(all(feature = "asm", target_arch = "x86_64"))]
#[inline]
pub unsafe fn hlt() {
    unsafe {
        core::arch::asm!("hlt", options(nomem, nostack, preserves_flags));
    }
}
