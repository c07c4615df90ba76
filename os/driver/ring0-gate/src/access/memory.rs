use crate::physical::{PhysicalRange, UnitSize};
use crate::platform::{IoSpaceMapper, MappedRange};
use crate::status::AccessError;
use core::ptr::{read_volatile, write_volatile};

/// Loads one element of `unit` width from device memory into `dst`.
///
/// Uses a single access of the element width when `src` is aligned for it,
/// and a byte-array access otherwise.
///
/// # Safety
/// `src` must be valid for `unit.bytes()` volatile reads; `dst` must be
/// exactly `unit.bytes()` long.
#[allow(clippy::cast_ptr_alignment)] // wide accesses only through aligned pointers
unsafe fn load(src: *const u8, unit: UnitSize, dst: &mut [u8]) {
    unsafe {
        match unit {
            UnitSize::Byte => dst[0] = read_volatile(src),
            UnitSize::Word => {
                let p = src.cast::<u16>();
                let v = if p.is_aligned() {
                    read_volatile(p)
                } else {
                    u16::from_ne_bytes(read_volatile(src.cast::<[u8; 2]>()))
                };
                dst.copy_from_slice(&v.to_ne_bytes());
            }
            UnitSize::Dword => {
                let p = src.cast::<u32>();
                let v = if p.is_aligned() {
                    read_volatile(p)
                } else {
                    u32::from_ne_bytes(read_volatile(src.cast::<[u8; 4]>()))
                };
                dst.copy_from_slice(&v.to_ne_bytes());
            }
        }
    }
}

/// Stores one element of `unit` width from `src` into device memory.
///
/// # Safety
/// `dst` must be valid for `unit.bytes()` volatile writes; `src` must be
/// exactly `unit.bytes()` long.
#[allow(clippy::cast_ptr_alignment)] // wide accesses only through aligned pointers
unsafe fn store(dst: *mut u8, unit: UnitSize, src: &[u8]) {
    unsafe {
        match unit {
            UnitSize::Byte => write_volatile(dst, src[0]),
            UnitSize::Word => {
                let v = [src[0], src[1]];
                let p = dst.cast::<u16>();
                if p.is_aligned() {
                    write_volatile(p, u16::from_ne_bytes(v));
                } else {
                    write_volatile(dst.cast::<[u8; 2]>(), v);
                }
            }
            UnitSize::Dword => {
                let v = [src[0], src[1], src[2], src[3]];
                let p = dst.cast::<u32>();
                if p.is_aligned() {
                    write_volatile(p, u32::from_ne_bytes(v));
                } else {
                    write_volatile(dst.cast::<[u8; 4]>(), v);
                }
            }
        }
    }
}

fn map<'a, M>(mapper: &'a M, range: &PhysicalRange) -> Result<MappedRange<'a, M>, AccessError>
where
    M: IoSpaceMapper + ?Sized,
{
    let len = range.byte_len().ok_or(AccessError::InvalidParameter)?;
    // SAFETY: the mapping is only accessed through volatile loads/stores
    // within `len` and is torn down when the guard drops.
    unsafe { MappedRange::map(mapper, range.base, len) }.ok_or_else(|| {
        log::debug!("cannot map {len} bytes at {}", range.base);
        AccessError::Unsuccessful
    })
}

/// Copies `range` out of physical memory into `out`, element by element.
///
/// The range is mapped before the unit size is looked at; an unsupported
/// unit size is refused afterwards and the mapping is still torn down.
/// On success the whole output buffer is reported as produced.
///
/// # Errors
/// - [`AccessError::InvalidParameter`] for a unit size other than 1, 2 or 4,
///   or an output buffer shorter than the range,
/// - [`AccessError::Unsuccessful`] if the range could not be mapped.
pub fn read_memory<M>(mapper: &M, range: PhysicalRange, out: &mut [u8]) -> Result<usize, AccessError>
where
    M: IoSpaceMapper + ?Sized,
{
    let window = map(mapper, &range)?;
    let unit = range.unit().ok_or(AccessError::InvalidParameter)?;
    let dst = out.get_mut(..window.len()).ok_or(AccessError::InvalidParameter)?;

    for (i, element) in dst.chunks_exact_mut(unit.bytes()).enumerate() {
        // SAFETY: element i lies inside the mapping of byte_len() bytes.
        unsafe { load(window.as_ptr().add(i * unit.bytes()), unit, element) };
    }
    drop(window);
    Ok(out.len())
}

/// Copies `data` into physical memory at `range`, element by element.
///
/// # Errors
/// Same as [`read_memory`]; `data` must be exactly the range's byte length.
pub fn write_memory<M>(mapper: &M, range: PhysicalRange, data: &[u8]) -> Result<usize, AccessError>
where
    M: IoSpaceMapper + ?Sized,
{
    let window = map(mapper, &range)?;
    let unit = range.unit().ok_or(AccessError::InvalidParameter)?;
    if data.len() != window.len() {
        return Err(AccessError::InvalidParameter);
    }

    for (i, element) in data.chunks_exact(unit.bytes()).enumerate() {
        // SAFETY: element i lies inside the mapping of byte_len() bytes.
        unsafe { store(window.as_ptr().add(i * unit.bytes()), unit, element) };
    }
    Ok(0)
}
