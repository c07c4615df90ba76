//! # Performance-Monitoring Counters (PMC)
//!
//! `RDPMC` reads the counter selected by `ecx`. Bit 30 of the selector picks
//! the fixed-function counters on Intel parts; the remaining bits index into
//! the general-purpose counters. Outside of CPL0 the instruction faults unless
//! `CR4.PCE` is set.

use crate::join_edx_eax;

/// Selects a performance-monitoring counter for `rdpmc`.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pmc(pub u32);

impl Pmc {
    /// Selector bit for Intel fixed-function counters.
    pub const FIXED_FUNCTION: u32 = 1 << 30;

    #[inline]
    #[must_use]
    pub const fn new(selector: u32) -> Self {
        Self(selector)
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Reads the selected counter.
    ///
    /// # Safety
    /// - Requires **CPL=0** or `CR4.PCE=1`.
    /// - The selector must name a counter implemented by the executing core;
    ///   otherwise the CPU raises **#GP(0)**.
    #[cfg(all(feature = "asm", target_arch = "x86_64"))]
    #[inline]
    #[doc(alias = "read_performance_monitoring_counter")]
    pub unsafe fn load_raw(self) -> u64 {
        let lo: u32;
        let hi: u32;
        let ecx = self.raw();
        unsafe {
            core::arch::asm!(
            "rdpmc",
            in("ecx") ecx,
            out("eax") lo,
            out("edx") hi,
            options(nomem, nostack, preserves_flags)
            );
        }
        join_edx_eax(hi, lo)
    }
}
