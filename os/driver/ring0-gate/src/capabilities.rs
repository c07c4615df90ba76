//! Build-time capability switches.

/// What this build of the service is allowed to do.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Capabilities {
    /// Physical memory may be written, and read anywhere rather than only
    /// inside the [legacy window](crate::physical::LEGACY_WINDOW).
    pub full_physical_memory: bool,
}

impl Capabilities {
    /// The capabilities selected by the crate's Cargo features.
    pub const BUILD: Self = Self {
        full_physical_memory: cfg!(feature = "physical-memory"),
    };

    /// Legacy-window reads only; no physical memory writes.
    pub const RESTRICTED: Self = Self {
        full_physical_memory: false,
    };

    pub const UNRESTRICTED: Self = Self {
        full_physical_memory: true,
    };
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::BUILD
    }
}
