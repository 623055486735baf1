//! The slice of descriptor layout the class drivers need to parse at bind time.
pub use endpoint::{open_endpoint_pair, EndpointDescriptor, EndpointPair, TransferType};
pub use interface::InterfaceDescriptor;

use crate::OpenError;

mod endpoint;
mod interface;

pub const INTERFACE: u8 = 0x04;
pub const ENDPOINT: u8 = 0x05;
pub const HID: u8 = 0x21;
pub const REPORT: u8 = 0x22;
pub const PHYSICAL: u8 = 0x23;

pub const INTERFACE_LEN: usize = 9;
pub const ENDPOINT_LEN: usize = 7;
pub const HID_LEN: usize = 9;

/// `bDescriptorType` of the descriptor at the head of `buf`.
pub fn descriptor_type(buf: &[u8]) -> Option<u8> {
    buf.get(1).copied()
}

/// The descriptor at the head of `buf`, sized by its own `bLength`.
pub fn first(buf: &[u8]) -> Result<&[u8], OpenError> {
    let len = match buf.first() {
        Some(&len) if len >= 2 => usize::from(len),
        _ => {
            return Err(OpenError::Truncated {
                required: 2,
                available: buf.len(),
            })
        }
    };
    buf.get(..len).ok_or(OpenError::Truncated {
        required: len,
        available: buf.len(),
    })
}

/// Everything after the descriptor at the head of `buf`.
pub fn next(buf: &[u8]) -> Result<&[u8], OpenError> {
    let len = first(buf)?.len();
    Ok(&buf[len..])
}

/// Checks that `buf` starts with a descriptor of type `expected` and returns it.
pub fn expect(buf: &[u8], expected: u8) -> Result<&[u8], OpenError> {
    let desc = first(buf)?;
    match descriptor_type(desc) {
        Some(found) if found == expected => Ok(desc),
        Some(found) => Err(OpenError::UnexpectedDescriptor { expected, found }),
        None => Err(OpenError::Truncated {
            required: 2,
            available: desc.len(),
        }),
    }
}
