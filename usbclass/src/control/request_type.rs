use usb_device::{
    control::{Recipient, RequestType},
    UsbDirection,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BmRequestType(u8);

impl BmRequestType {
    pub const fn new(
        direction: UsbDirection,
        request_type: RequestType,
        recipient: Recipient,
    ) -> Self {
        BmRequestType(direction as u8 | ((request_type as u8) << 5) | recipient as u8)
    }

    #[inline]
    pub fn bits(&self) -> u8 {
        self.0
    }

    #[inline]
    pub fn direction(&self) -> UsbDirection {
        if self.bits() & 0x80 == 0 {
            UsbDirection::Out
        } else {
            UsbDirection::In
        }
    }

    #[inline]
    pub fn request_type(&self) -> RequestType {
        match (self.bits() >> 5) & 0b11 {
            0 => RequestType::Standard,
            1 => RequestType::Class,
            2 => RequestType::Vendor,
            _ => RequestType::Reserved,
        }
    }

    #[inline]
    pub fn recipient(&self) -> Recipient {
        match self.bits() & 0b11111 {
            0 => Recipient::Device,
            1 => Recipient::Interface,
            2 => Recipient::Endpoint,
            3 => Recipient::Other,
            _ => Recipient::Reserved,
        }
    }
}

impl From<u8> for BmRequestType {
    fn from(bits: u8) -> Self {
        BmRequestType(bits)
    }
}
