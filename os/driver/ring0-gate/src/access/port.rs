use crate::platform::PortIo;
use crate::status::AccessError;
use crate::wire::{PortValue, PortWidth};

/// Reads `width` bytes from `port` into `out`.
///
/// The reported byte count is the length of the request's *input* buffer,
/// not the width of the value. Existing callers depend on that count.
///
/// # Errors
/// [`AccessError::InvalidParameter`] if `out` cannot hold the value.
pub fn read_port<P>(
    platform: &P,
    port: u16,
    width: PortWidth,
    input_len: usize,
    out: &mut [u8],
) -> Result<usize, AccessError>
where
    P: PortIo + ?Sized,
{
    platform
        .read_port(port, width)
        .copy_to(out)
        .ok_or(AccessError::InvalidParameter)?;
    Ok(input_len)
}

/// # Errors
/// Never fails; the `Result` keeps the routine shape uniform.
pub fn write_port<P>(platform: &P, port: u16, value: PortValue) -> Result<usize, AccessError>
where
    P: PortIo + ?Sized,
{
    platform.write_port(port, value);
    Ok(0)
}
