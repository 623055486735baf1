use crate::OpenError;

use super::{expect, INTERFACE, INTERFACE_LEN};

#[allow(non_snake_case)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterfaceDescriptor {
    pub bLength: u8,
    pub bInterfaceNumber: u8,
    pub bAlternateSetting: u8,
    pub bNumEndpoints: u8,
    pub bInterfaceClass: u8,
    pub bInterfaceSubClass: u8,
    pub bInterfaceProtocol: u8,
    pub iInterface: u8,
}

impl InterfaceDescriptor {
    pub fn parse(buf: &[u8]) -> Result<Self, OpenError> {
        let desc = expect(buf, INTERFACE)?;
        match *desc {
            [b_length, _, number, alternate, endpoints, class, subclass, protocol, string, ..] => {
                Ok(InterfaceDescriptor {
                    bLength: b_length,
                    bInterfaceNumber: number,
                    bAlternateSetting: alternate,
                    bNumEndpoints: endpoints,
                    bInterfaceClass: class,
                    bInterfaceSubClass: subclass,
                    bInterfaceProtocol: protocol,
                    iInterface: string,
                })
            }
            _ => Err(OpenError::Truncated {
                required: INTERFACE_LEN,
                available: desc.len(),
            }),
        }
    }

    pub fn matches(&self, class: u8, subclass: u8, protocol: u8) -> bool {
        self.bInterfaceClass == class
            && self.bInterfaceSubClass == subclass
            && self.bInterfaceProtocol == protocol
    }
}
