use heapless::Vec;
use usb_device::{endpoint::EndpointAddress, UsbDirection};

use crate::{OpenError, Port, UsbStack};

use super::{expect, next, ENDPOINT, ENDPOINT_LEN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TransferType {
    Control = 0b00,
    Isochronous = 0b01,
    Bulk = 0b10,
    Interrupt = 0b11,
}

impl From<u8> for TransferType {
    fn from(attributes: u8) -> Self {
        match attributes & 0b11 {
            0b00 => TransferType::Control,
            0b01 => TransferType::Isochronous,
            0b10 => TransferType::Bulk,
            _ => TransferType::Interrupt,
        }
    }
}

#[allow(non_snake_case)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointDescriptor {
    pub bEndpointAddress: EndpointAddress,
    pub bmAttributes: u8,
    pub wMaxPacketSize: u16,
    pub bInterval: u8,
}

impl EndpointDescriptor {
    pub fn parse(buf: &[u8]) -> Result<Self, OpenError> {
        let desc = expect(buf, ENDPOINT)?;
        match *desc {
            [_, _, address, attributes, size_lo, size_hi, interval, ..] => Ok(EndpointDescriptor {
                bEndpointAddress: EndpointAddress::from(address),
                bmAttributes: attributes,
                wMaxPacketSize: u16::from_le_bytes([size_lo, size_hi]),
                bInterval: interval,
            }),
            _ => Err(OpenError::Truncated {
                required: ENDPOINT_LEN,
                available: desc.len(),
            }),
        }
    }

    pub fn transfer_type(&self) -> TransferType {
        TransferType::from(self.bmAttributes)
    }
}

/// The validated endpoints of one interface, at most one per direction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointPair {
    pub ep_out: Option<EndpointAddress>,
    pub ep_in: Option<EndpointAddress>,
    descriptors: Vec<EndpointDescriptor, 2>,
}

impl EndpointPair {
    /// Parses `count` consecutive endpoint descriptors of `transfer_type` without opening
    /// anything.
    pub fn parse(
        mut descriptors: &[u8],
        count: u8,
        transfer_type: TransferType,
    ) -> Result<Self, OpenError> {
        if !(1..=2).contains(&count) {
            return Err(OpenError::EndpointCount { count });
        }
        let mut pair = EndpointPair::default();
        for _ in 0..count {
            let endpoint = EndpointDescriptor::parse(descriptors)?;
            if endpoint.transfer_type() != transfer_type {
                return Err(OpenError::EndpointMismatch);
            }
            let address = endpoint.bEndpointAddress;
            let slot = match address.direction() {
                UsbDirection::In => &mut pair.ep_in,
                UsbDirection::Out => &mut pair.ep_out,
            };
            if slot.replace(address).is_some() {
                return Err(OpenError::DuplicateDirection {
                    address: address.into(),
                });
            }
            pair.descriptors
                .push(endpoint)
                .map_err(|_| OpenError::EndpointCount { count })?;
            descriptors = next(descriptors)?;
        }
        Ok(pair)
    }

    pub fn addresses(&self) -> impl Iterator<Item = EndpointAddress> + '_ {
        self.descriptors
            .iter()
            .map(|endpoint| endpoint.bEndpointAddress)
    }

    /// Opens every endpoint in descriptor order.
    pub fn open<S: UsbStack>(&self, stack: &mut S, port: Port) -> Result<(), OpenError> {
        for endpoint in &self.descriptors {
            if !stack.open_endpoint(port, endpoint) {
                return Err(OpenError::EndpointOpenFailed {
                    address: endpoint.bEndpointAddress.into(),
                });
            }
        }
        Ok(())
    }
}

/// Parses and opens `count` consecutive endpoint descriptors of `transfer_type`.
pub fn open_endpoint_pair<S: UsbStack>(
    stack: &mut S,
    port: Port,
    descriptors: &[u8],
    count: u8,
    transfer_type: TransferType,
) -> Result<EndpointPair, OpenError> {
    let pair = EndpointPair::parse(descriptors, count, transfer_type)?;
    pair.open(stack, port)?;
    Ok(pair)
}
