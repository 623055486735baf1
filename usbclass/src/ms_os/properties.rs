use heapless::Vec;

use crate::Error;

use super::{BCD_VERSION, EXTENDED_PROPERTIES};

const HEADER_LEN: usize = 10;
/// `dwSize`, `dwPropertyDataType`, `wPropertyNameLength` and `dwPropertyDataLength`.
const SECTION_FIXED_LEN: usize = 14;

/// Registry type of a custom property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum PropertyDataType {
    /// NUL-terminated UTF-16LE string.
    Sz = 1,
    ExpandSz = 2,
    Binary = 3,
    DwordLittleEndian = 4,
    DwordBigEndian = 5,
    Link = 6,
    /// Several NUL-terminated strings, closed by an empty one.
    MultiSz = 7,
}

/// One custom property section. `data` is stored as given, so string data has to be
/// UTF-16LE already.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomProperty<'d> {
    pub data_type: PropertyDataType,
    pub name: &'d str,
    pub data: &'d [u8],
}

impl<'d> CustomProperty<'d> {
    /// `name` as NUL-terminated UTF-16LE.
    fn name_len(&self) -> usize {
        (self.name.encode_utf16().count() + 1) * 2
    }

    fn section_len(&self) -> usize {
        SECTION_FIXED_LEN + self.name_len() + self.data.len()
    }
}

/// Builds the extended properties descriptor of one interface.
pub fn extended_properties_descriptor<const N: usize>(
    properties: &[CustomProperty],
) -> Result<Vec<u8, N>, Error> {
    let required = HEADER_LEN + properties.iter().map(CustomProperty::section_len).sum::<usize>();
    let too_long = Error::DescriptorTooLong {
        required,
        capacity: N,
    };
    let count = u16::try_from(properties.len()).map_err(|_| too_long)?;
    let length = u32::try_from(required).map_err(|_| too_long)?;

    let mut desc = Vec::new();
    desc.extend_from_slice(&length.to_le_bytes())
        .map_err(|_| too_long)?;
    desc.extend_from_slice(&BCD_VERSION.to_le_bytes())
        .map_err(|_| too_long)?;
    desc.extend_from_slice(&EXTENDED_PROPERTIES.to_le_bytes())
        .map_err(|_| too_long)?;
    desc.extend_from_slice(&count.to_le_bytes())
        .map_err(|_| too_long)?;
    for property in properties {
        let name_len = property.name_len() as u16;
        desc.extend_from_slice(&(property.section_len() as u32).to_le_bytes())
            .map_err(|_| too_long)?;
        desc.extend_from_slice(&(property.data_type as u32).to_le_bytes())
            .map_err(|_| too_long)?;
        desc.extend_from_slice(&name_len.to_le_bytes())
            .map_err(|_| too_long)?;
        for unit in property.name.encode_utf16().chain([0]) {
            desc.extend_from_slice(&unit.to_le_bytes())
                .map_err(|_| too_long)?;
        }
        desc.extend_from_slice(&(property.data.len() as u32).to_le_bytes())
            .map_err(|_| too_long)?;
        desc.extend_from_slice(property.data)
            .map_err(|_| too_long)?;
    }
    Ok(desc)
}
