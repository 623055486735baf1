//! Microsoft OS 1.0 descriptors, which let Windows pick a driver for a vendor interface without
//! an INF file.
//!
//! The host first asks for string descriptor [`STRING_INDEX`]. The vendor code in the reply is
//! then used as `bRequest` of the vendor requests fetching the feature descriptors, which
//! [`MsOs`] answers from its [`MsOsProvider`].
pub use compat_id::{compat_id_descriptor, CompatFunction, XUSB10};
pub use properties::{extended_properties_descriptor, CustomProperty, PropertyDataType};

use usb_device::control::{Request, RequestType};

use crate::{control::reply, driver::ControlHandler, ControlStage, Port, UsbStack};

mod compat_id;
mod properties;

pub const STRING_INDEX: u8 = 0xEE;
pub const DEFAULT_VENDOR_CODE: u8 = 0x42;
pub const BCD_VERSION: u16 = 0x0100;

/// `wIndex` of the feature descriptor requests.
pub const EXTENDED_COMPAT_ID: u16 = 0x0004;
pub const EXTENDED_PROPERTIES: u16 = 0x0005;

pub const OS_STRING_LEN: usize = 18;
const STRING_DESCRIPTOR_TYPE: u8 = 0x03;
const FLAG_CONTAINER_ID: u8 = 1 << 1;

/// "MSFT100" in UTF-16LE.
const SIGNATURE: [u8; 14] = [
    b'M', 0, b'S', 0, b'F', 0, b'T', 0, b'1', 0, b'0', 0, b'0', 0,
];

/// Source of the feature descriptors. A descriptor left at `None` stalls its request.
pub trait MsOsProvider {
    fn compat_id(&mut self) -> Option<&[u8]> {
        None
    }

    /// Extended properties of `interface`, taken from the high byte of `wValue`.
    fn properties(&mut self, _interface: u8) -> Option<&[u8]> {
        None
    }
}

/// Serves a fixed extended compat ID descriptor.
impl MsOsProvider for &[u8] {
    fn compat_id(&mut self) -> Option<&[u8]> {
        Some(*self)
    }
}

/// The OS string descriptor announcing `vendor_code`.
pub fn os_string_descriptor(vendor_code: u8, container_id: bool) -> [u8; OS_STRING_LEN] {
    let mut desc = [0u8; OS_STRING_LEN];
    desc[0] = OS_STRING_LEN as u8;
    desc[1] = STRING_DESCRIPTOR_TYPE;
    desc[2..16].copy_from_slice(&SIGNATURE);
    desc[16] = vendor_code;
    desc[17] = if container_id { FLAG_CONTAINER_ID } else { 0 };
    desc
}

pub struct MsOs<P> {
    vendor_code: u8,
    container_id: bool,
    provider: P,
}

impl<P: MsOsProvider> MsOs<P> {
    pub fn new(provider: P) -> Self {
        Self::with_vendor_code(DEFAULT_VENDOR_CODE, provider)
    }

    pub fn with_vendor_code(vendor_code: u8, provider: P) -> Self {
        MsOs {
            vendor_code,
            container_id: true,
            provider,
        }
    }

    /// Whether the OS string descriptor advertises ContainerID support. Defaults to true.
    pub fn container_id(mut self, supported: bool) -> Self {
        self.container_id = supported;
        self
    }

    pub fn vendor_code(&self) -> u8 {
        self.vendor_code
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    /// Answers the string descriptor request for `index`, if it is the OS string.
    pub fn string_descriptor(&self, index: u8) -> Option<[u8; OS_STRING_LEN]> {
        (index == STRING_INDEX).then(|| os_string_descriptor(self.vendor_code, self.container_id))
    }
}

impl<S: UsbStack, P: MsOsProvider> ControlHandler<S> for MsOs<P> {
    fn control_transfer(
        &mut self,
        stack: &mut S,
        port: Port,
        stage: ControlStage,
        request: &Request,
    ) -> bool {
        if request.request_type != RequestType::Vendor || request.request != self.vendor_code {
            return false;
        }
        let desc = match request.index {
            EXTENDED_COMPAT_ID => self.provider.compat_id(),
            EXTENDED_PROPERTIES => self.provider.properties((request.value >> 8) as u8),
            index => {
                debug!("unsupported OS feature descriptor {}", index);
                return false;
            }
        };
        match desc {
            // No completion is reported, so only SETUP does any work.
            Some(_) if stage != ControlStage::Setup => true,
            Some(desc) => reply(stack, port, request, desc),
            None => false,
        }
    }
}
