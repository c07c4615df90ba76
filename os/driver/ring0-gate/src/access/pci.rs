use crate::platform::{PciConfigSpace, PciSlot};
use crate::status::AccessError;
use crate::wire::PciAddress;

impl From<PciAddress> for PciSlot {
    fn from(a: PciAddress) -> Self {
        Self {
            bus: a.bus(),
            device: a.device(),
            function: a.function(),
        }
    }
}

/// Reads `out.len()` bytes of configuration space at `offset`.
///
/// # Errors
/// - [`AccessError::PciBusNotExist`] if the accessor transferred nothing,
/// - [`AccessError::PciNoDevice`] if it returned only the two-byte
///   "no device" vendor ID for a request of any other length,
/// - [`AccessError::PciReadConfig`] for any other short transfer.
pub fn read_pci_config<P>(platform: &P, address: PciAddress, offset: u32, out: &mut [u8]) -> Result<usize, AccessError>
where
    P: PciConfigSpace + ?Sized,
{
    let wanted = out.len();
    let got = platform.read_config(address.into(), offset, out);
    match got {
        0 => Err(AccessError::PciBusNotExist),
        2 if wanted != 2 => Err(AccessError::PciNoDevice),
        n if n != wanted => Err(AccessError::PciReadConfig),
        _ => Ok(wanted),
    }
    .inspect_err(|e| log::debug!("PCI read {address:?}+{offset:#x} ({wanted} bytes, got {got}): {e}"))
}

/// Writes `data` to configuration space at `offset`.
///
/// # Errors
/// [`AccessError::PciWriteConfig`] if fewer bytes than `data.len()` were
/// written.
pub fn write_pci_config<P>(platform: &P, address: PciAddress, offset: u32, data: &[u8]) -> Result<usize, AccessError>
where
    P: PciConfigSpace + ?Sized,
{
    let written = platform.write_config(address.into(), offset, data);
    if written == data.len() {
        Ok(0)
    } else {
        log::debug!("PCI write {address:?}+{offset:#x}: {written} of {} bytes", data.len());
        Err(AccessError::PciWriteConfig)
    }
}
