use heapless::Vec;

use crate::Error;

use super::{BCD_VERSION, EXTENDED_COMPAT_ID};

const HEADER_LEN: usize = 16;
const FUNCTION_LEN: usize = 24;

/// Compatible ID of the Xbox 360 controller driver shipped with Windows.
pub const XUSB10: [u8; 8] = *b"XUSB10\0\0";

/// One function section of an extended compat ID descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CompatFunction {
    pub first_interface: u8,
    pub compatible_id: [u8; 8],
    pub sub_compatible_id: [u8; 8],
}

impl CompatFunction {
    pub const fn new(first_interface: u8, compatible_id: [u8; 8]) -> Self {
        CompatFunction {
            first_interface,
            compatible_id,
            sub_compatible_id: [0; 8],
        }
    }
}

/// Builds the extended compat ID descriptor listing `functions`, in increasing interface order.
pub fn compat_id_descriptor<const N: usize>(
    functions: &[CompatFunction],
) -> Result<Vec<u8, N>, Error> {
    let required = HEADER_LEN + functions.len() * FUNCTION_LEN;
    let too_long = Error::DescriptorTooLong {
        required,
        capacity: N,
    };
    let count = u8::try_from(functions.len()).map_err(|_| too_long)?;

    let mut desc = Vec::new();
    desc.extend_from_slice(&(required as u32).to_le_bytes())
        .map_err(|_| too_long)?;
    desc.extend_from_slice(&BCD_VERSION.to_le_bytes())
        .map_err(|_| too_long)?;
    desc.extend_from_slice(&EXTENDED_COMPAT_ID.to_le_bytes())
        .map_err(|_| too_long)?;
    desc.extend_from_slice(&[count, 0, 0, 0, 0, 0, 0, 0])
        .map_err(|_| too_long)?;
    for function in functions {
        desc.extend_from_slice(&[function.first_interface, 0x01])
            .map_err(|_| too_long)?;
        desc.extend_from_slice(&function.compatible_id)
            .map_err(|_| too_long)?;
        desc.extend_from_slice(&function.sub_compatible_id)
            .map_err(|_| too_long)?;
        desc.extend_from_slice(&[0; 6]).map_err(|_| too_long)?;
    }
    Ok(desc)
}
