//! Completion status reported for every request.

/// Why a request did not complete successfully.
///
/// Every variant is resolved at the dispatcher boundary and handed back to the
/// caller as a [`Status`]; none of them is fatal to the host.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, thiserror::Error)]
pub enum AccessError {
    /// The request was malformed, undersized or out of range and was
    /// rejected before any hardware was touched.
    #[error("invalid parameter")]
    InvalidParameter,
    /// A privileged primitive faulted while executing.
    #[error("privileged operation did not complete")]
    Unsuccessful,
    /// The control code is not one this service understands.
    #[error("request code not implemented")]
    NotImplemented,
    #[error("PCI bus does not exist")]
    PciBusNotExist,
    #[error("no PCI device present at the requested address")]
    PciNoDevice,
    #[error("PCI configuration write was incomplete")]
    PciWriteConfig,
    #[error("PCI configuration read was incomplete")]
    PciReadConfig,
}

impl AccessError {
    /// The stable 32-bit status code of this error.
    #[must_use]
    pub const fn status(self) -> Status {
        match self {
            Self::InvalidParameter => Status::INVALID_PARAMETER,
            Self::Unsuccessful => Status::UNSUCCESSFUL,
            Self::NotImplemented => Status::NOT_IMPLEMENTED,
            Self::PciBusNotExist => Status::PCI_BUS_NOT_EXIST,
            Self::PciNoDevice => Status::PCI_NO_DEVICE,
            Self::PciWriteConfig => Status::PCI_WRITE_CONFIG,
            Self::PciReadConfig => Status::PCI_READ_CONFIG,
        }
    }
}

/// A 32-bit completion code as seen on the wire.
///
/// Codes with the two top bits set are errors; `0` is success. The
/// `0xE000_000x` range carries the PCI-specific failures.
#[repr(transparent)]
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Status(pub u32);

impl Status {
    pub const SUCCESS: Self = Self(0x0000_0000);
    pub const UNSUCCESSFUL: Self = Self(0xC000_0001);
    pub const NOT_IMPLEMENTED: Self = Self(0xC000_0002);
    pub const INVALID_PARAMETER: Self = Self(0xC000_000D);
    pub const PCI_BUS_NOT_EXIST: Self = Self(0xE000_0001);
    pub const PCI_NO_DEVICE: Self = Self(0xE000_0002);
    pub const PCI_WRITE_CONFIG: Self = Self(0xE000_0003);
    pub const PCI_READ_CONFIG: Self = Self(0xE000_0004);

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 == Self::SUCCESS.0
    }

    /// Maps a wire code back onto the error it stands for.
    ///
    /// Returns `Ok(())` for [`Status::SUCCESS`] and `Err(None)` for a code
    /// this service never produces.
    ///
    /// # Errors
    /// The [`AccessError`] the code stands for, or `None` for an unknown code.
    pub const fn into_result(self) -> Result<(), Option<AccessError>> {
        Err(Some(match self {
            Self::SUCCESS => return Ok(()),
            Self::UNSUCCESSFUL => AccessError::Unsuccessful,
            Self::NOT_IMPLEMENTED => AccessError::NotImplemented,
            Self::INVALID_PARAMETER => AccessError::InvalidParameter,
            Self::PCI_BUS_NOT_EXIST => AccessError::PciBusNotExist,
            Self::PCI_NO_DEVICE => AccessError::PciNoDevice,
            Self::PCI_WRITE_CONFIG => AccessError::PciWriteConfig,
            Self::PCI_READ_CONFIG => AccessError::PciReadConfig,
            _ => return Err(None),
        }))
    }
}

impl core::fmt::Debug for Status {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.into_result() {
            Ok(()) => f.write_str("Status::SUCCESS"),
            Err(Some(e)) => write!(f, "Status({:#010X}: {e})", self.0),
            Err(None) => write!(f, "Status({:#010X})", self.0),
        }
    }
}

impl From<AccessError> for Status {
    #[inline]
    fn from(value: AccessError) -> Self {
        value.status()
    }
}

/// Status plus the number of output bytes produced.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct IoStatus {
    pub status: Status,
    /// Bytes produced into the output buffer. Zero on every failure.
    pub information: usize,
}

impl IoStatus {
    #[must_use]
    pub const fn success(information: usize) -> Self {
        Self {
            status: Status::SUCCESS,
            information,
        }
    }

    #[must_use]
    pub const fn failure(error: AccessError) -> Self {
        Self {
            status: error.status(),
            information: 0,
        }
    }
}

impl From<Result<usize, AccessError>> for IoStatus {
    fn from(value: Result<usize, AccessError>) -> Self {
        match value {
            Ok(information) => Self::success(information),
            Err(e) => Self::failure(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_map_back_to_errors() {
        for e in [
            AccessError::InvalidParameter,
            AccessError::Unsuccessful,
            AccessError::NotImplemented,
            AccessError::PciBusNotExist,
            AccessError::PciNoDevice,
            AccessError::PciWriteConfig,
            AccessError::PciReadConfig,
        ] {
            assert_eq!(e.status().into_result(), Err(Some(e)));
        }
        assert_eq!(Status::SUCCESS.into_result(), Ok(()));
        assert_eq!(Status(0x1234).into_result(), Err(None));
    }

    #[test]
    fn pci_codes_are_customer_range() {
        assert_eq!(Status::PCI_BUS_NOT_EXIST.raw(), 0xE000_0001);
        assert_eq!(Status::PCI_READ_CONFIG.raw(), 0xE000_0004);
    }

    #[test]
    fn failures_produce_no_bytes() {
        let s = IoStatus::from(Err(AccessError::Unsuccessful));
        assert_eq!(s.information, 0);
        assert_eq!(s.status, Status::UNSUCCESSFUL);
        assert!(IoStatus::from(Ok(8)).status.is_success());
    }
}
