//! # Model-Specific Registers (MSR)
//!
//! Raw access to CPU **Model-Specific Registers** through the privileged
//! `RDMSR` and `WRMSR` instructions. The index space is architecture-defined
//! and differs between vendors and even between steppings; an index the
//! executing core does not implement raises **#GP(0)**.
//!
//! ## References
//! - Intel SDM Vol. 4, "Model-Specific Registers (MSRs)"
//! - AMD64 Architecture Programmer's Manual Vol. 2, Appendix A

use crate::{join_edx_eax, split_edx_eax};

/// Identifies a **Model-Specific Register (MSR)** by its architectural index.
///
/// MSR indices are 32-bit identifiers passed in `ecx` to the `rdmsr` and
/// `wrmsr` instructions.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Msr(pub u32);

impl Msr {
    /// `IA32_TIME_STAMP_COUNTER`.
    pub const IA32_TIME_STAMP_COUNTER: Self = Self(0x0000_0010);

    /// `IA32_THERM_STATUS`, the per-core digital thermal sensor readout.
    pub const IA32_THERM_STATUS: Self = Self(0x0000_019C);

    /// Creates a new `Msr` from a raw index.
    #[inline(always)]
    #[allow(clippy::inline_always)]
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the underlying raw MSR index.
    #[inline(always)]
    #[allow(clippy::inline_always)]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Write a 64-bit value to this **Model-Specific Register (MSR)**.
    ///
    /// # Safety
    /// - This function executes the privileged `WRMSR` instruction, which is only
    ///   valid at **CPL=0** (kernel mode). Executing this in user mode will raise a
    ///   **#GP(0)** exception.
    /// - The target MSR must be **valid and writable** on the current CPU.
    ///   Writing an invalid or reserved MSR, or setting reserved bits, causes a
    ///   general protection fault.
    /// - Many MSRs change processor behavior (power limits, clock ratios,
    ///   microcode state). The caller owns the consequences of the write.
    #[cfg(all(feature = "asm", target_arch = "x86_64"))]
    #[inline]
    #[doc(alias = "write_model_specific_register")]
    pub unsafe fn store_raw(self, val: u64) {
        let (hi, lo) = split_edx_eax(val);
        let msr = self.raw();
        unsafe {
            core::arch::asm!(
            "wrmsr",
            in("ecx") msr,
            in("eax") lo,
            in("edx") hi,
            options(nostack, preserves_flags)
            );
        }
    }

    /// Reads the 64-bit value from this **Model-Specific Register (MSR)**.
    ///
    /// # Safety
    /// Same privilege and validity requirements as [`Msr::store_raw`]; reading an
    /// unimplemented index raises **#GP(0)**.
    #[cfg(all(feature = "asm", target_arch = "x86_64"))]
    #[inline(always)]
    #[allow(clippy::inline_always)]
    #[doc(alias = "read_model_specific_register")]
    pub unsafe fn load_raw(self) -> u64 {
        let lo: u32;
        let hi: u32;
        let ecx = self.raw();
        unsafe {
            core::arch::asm!(
            "rdmsr",
            in("ecx") ecx,
            out("eax") lo,
            out("edx") hi,
            options(nomem, nostack, preserves_flags)
            );
        }
        join_edx_eax(hi, lo)
    }
}

impl From<u32> for Msr {
    #[inline]
    fn from(index: u32) -> Self {
        Self::new(index)
    }
}
