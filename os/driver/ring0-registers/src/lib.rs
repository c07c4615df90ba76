//! # Privileged x86-64 Instruction Wrappers
//!
//! Each item in this crate wraps exactly one privileged instruction:
//!
//! | Module          | Instructions            |
//! |-----------------|-------------------------|
//! | [`msr`]         | `rdmsr`, `wrmsr`        |
//! | [`pmc`]         | `rdpmc`                 |
//! | [`port`]        | `in`, `out` (8/16/32)   |
//! | [`processor`]   | `hlt`                   |
//!
//! None of these perform validation. Executing them outside of CPL0 (or with
//! an index the current core does not implement) raises `#GP`; catching that
//! fault is the responsibility of whoever calls in.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

pub mod msr;
pub mod pmc;
pub mod port;
pub mod processor;

pub use msr::Msr;
pub use pmc::Pmc;

/// Joins the `edx:eax` halves returned by `rdmsr`/`rdpmc`.
#[inline]
#[must_use]
pub const fn join_edx_eax(hi: u32, lo: u32) -> u64 {
    ((hi as u64) << 32) | lo as u64
}

/// Splits a 64-bit value into the `(edx, eax)` halves expected by `wrmsr`.
#[inline]
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn split_edx_eax(value: u64) -> (u32, u32) {
    ((value >> 32) as u32, (value & 0xFFFF_FFFF) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edx_eax_halves() {
        let v = 0x0123_4567_89AB_CDEF;
        let (hi, lo) = split_edx_eax(v);
        assert_eq!(hi, 0x0123_4567);
        assert_eq!(lo, 0x89AB_CDEF);
        assert_eq!(join_edx_eax(hi, lo), v);
    }
}
