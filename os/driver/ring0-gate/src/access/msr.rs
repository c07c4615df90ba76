use crate::platform::{Fault, ModelSpecificRegisters};
use crate::status::AccessError;
use crate::wire::REGISTER_VALUE_LEN;

impl From<Fault> for AccessError {
    fn from(_: Fault) -> Self {
        Self::Unsuccessful
    }
}

fn emit(value: u64, out: &mut [u8]) -> Result<usize, AccessError> {
    out.get_mut(..REGISTER_VALUE_LEN)
        .ok_or(AccessError::InvalidParameter)?
        .copy_from_slice(&value.to_le_bytes());
    Ok(REGISTER_VALUE_LEN)
}

/// Reads MSR `index` into the first eight bytes of `out`.
///
/// # Errors
/// [`AccessError::Unsuccessful`] if the read faulted.
pub fn read_msr<P>(platform: &P, index: u32, out: &mut [u8]) -> Result<usize, AccessError>
where
    P: ModelSpecificRegisters + ?Sized,
{
    let value = platform.read_msr(index).inspect_err(|_| {
        log::debug!("rdmsr {index:#010x} faulted");
    })?;
    emit(value, out)
}

/// # Errors
/// [`AccessError::Unsuccessful`] if the write faulted.
pub fn write_msr<P>(platform: &P, index: u32, value: u64) -> Result<usize, AccessError>
where
    P: ModelSpecificRegisters + ?Sized,
{
    platform.write_msr(index, value).inspect_err(|_| {
        log::debug!("wrmsr {index:#010x} <- {value:#018x} faulted");
    })?;
    Ok(0)
}

/// Reads performance counter `counter` into the first eight bytes of `out`.
///
/// # Errors
/// [`AccessError::Unsuccessful`] if the read faulted.
pub fn read_pmc<P>(platform: &P, counter: u32, out: &mut [u8]) -> Result<usize, AccessError>
where
    P: ModelSpecificRegisters + ?Sized,
{
    let value = platform.read_pmc(counter).inspect_err(|_| {
        log::debug!("rdpmc {counter:#010x} faulted");
    })?;
    emit(value, out)
}
