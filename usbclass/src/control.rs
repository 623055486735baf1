//! Control request vocabulary shared by the class drivers.
mod request_type;
mod setup_packet;

pub use request_type::BmRequestType;
pub use setup_packet::SetupPacket;
pub use usb_device::control::{Recipient, Request, RequestType};

use crate::{Port, UsbStack};

/// Splits `wValue` into its high and low byte.
///
/// Descriptor requests carry `(type, index)`, HID report requests `(report type, report id)`
/// and HID idle requests `(duration, report id)`.
#[inline]
pub fn value_bytes(request: &Request) -> (u8, u8) {
    let [low, high] = request.value.to_le_bytes();
    (high, low)
}

/// Whether the request addresses interface `interface`, comparing the full 16-bit `wIndex`.
#[inline]
pub fn targets_interface(request: &Request, interface: u8) -> bool {
    request.index == u16::from(interface)
}

/// Queues `data` as the reply of a device-to-host request. Returns whether the request is
/// handled.
pub(crate) fn reply<S: UsbStack>(
    stack: &mut S,
    port: Port,
    request: &Request,
    data: &[u8],
) -> bool {
    match stack.control_in(port, request, data) {
        Ok(()) => true,
        Err(e) => {
            warn!("control reply refused: {}", e);
            false
        }
    }
}

/// Acknowledges a host-to-device request without data stage.
pub(crate) fn accept<S: UsbStack>(stack: &mut S, port: Port, request: &Request) -> bool {
    match stack.control_status(port, request) {
        Ok(()) => true,
        Err(e) => {
            warn!("control status refused: {}", e);
            false
        }
    }
}
