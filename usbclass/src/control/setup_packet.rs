use usb_device::control::Request;

use super::BmRequestType;

/// Raw 8-byte SETUP packet as it arrives on endpoint zero.
#[allow(non_snake_case)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SetupPacket {
    pub bmRequestType: BmRequestType,
    pub bRequest: u8,
    pub wValue: u16,
    pub wIndex: u16,
    pub wLength: u16,
}

impl SetupPacket {
    pub const LEN: usize = 8;

    pub fn parse(buf: &[u8; Self::LEN]) -> Self {
        SetupPacket {
            bmRequestType: BmRequestType::from(buf[0]),
            bRequest: buf[1],
            wValue: u16::from_le_bytes([buf[2], buf[3]]),
            wIndex: u16::from_le_bytes([buf[4], buf[5]]),
            wLength: u16::from_le_bytes([buf[6], buf[7]]),
        }
    }

    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut buf = [0u8; Self::LEN];
        buf[0] = self.bmRequestType.bits();
        buf[1] = self.bRequest;
        buf[2..4].copy_from_slice(&self.wValue.to_le_bytes());
        buf[4..6].copy_from_slice(&self.wIndex.to_le_bytes());
        buf[6..8].copy_from_slice(&self.wLength.to_le_bytes());
        buf
    }

    pub fn request(&self) -> Request {
        Request {
            direction: self.bmRequestType.direction(),
            request_type: self.bmRequestType.request_type(),
            recipient: self.bmRequestType.recipient(),
            request: self.bRequest,
            value: self.wValue,
            index: self.wIndex,
            length: self.wLength,
        }
    }
}

impl From<SetupPacket> for Request {
    fn from(packet: SetupPacket) -> Self {
        packet.request()
    }
}
