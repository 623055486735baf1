use usb_device::endpoint::EndpointAddress;

use crate::{Recovery, TransferResult};

use super::LedAnimation;

/// Application side of a [`super::X360Class`]. Everything is optional.
pub trait X360Handler {
    fn report_complete(&mut self, _interface: u8, _report: &[u8], _len: usize) {}

    /// The host changed the LED animation. Repeating the current animation is not reported.
    fn led_received(&mut self, _interface: u8, _led: LedAnimation) {}

    fn rumble_received(&mut self, _interface: u8, _left: u8, _right: u8) {}

    /// Returning [`Recovery::Application`] leaves re-arming the endpoint to the application.
    fn report_issue(
        &mut self,
        _interface: u8,
        _address: EndpointAddress,
        _result: TransferResult,
        _len: usize,
    ) -> Recovery {
        Recovery::Driver
    }
}

impl X360Handler for () {}
