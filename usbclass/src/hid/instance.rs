use usb_device::endpoint::EndpointAddress;

use crate::{pool::Slot, Port};

use super::Protocol;

#[derive(Debug, Default)]
pub(super) struct HidInstance<'a> {
    pub port: Port,
    pub interface: u8,
    pub ep_in: Option<EndpointAddress>,
    pub ep_out: Option<EndpointAddress>,
    /// The class descriptor found at bind time, answered verbatim.
    pub hid_descriptor: &'a [u8],
    pub in_report: Option<&'a [u8]>,
    pub out_buffer: Option<&'a mut [u8]>,
    /// Destination of a pending `SET_REPORT`.
    pub control_buffer: Option<&'a mut [u8]>,
    pub protocol: Protocol,
    /// Idle rate for all reports, 4 ms per unit.
    pub idle: u8,
}

impl<'a> Slot for HidInstance<'a> {
    fn port(&self) -> Port {
        self.port
    }

    fn interface(&self) -> u8 {
        self.interface
    }

    fn ep_in(&self) -> Option<EndpointAddress> {
        self.ep_in
    }

    fn ep_out(&self) -> Option<EndpointAddress> {
        self.ep_out
    }
}
