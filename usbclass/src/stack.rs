//! The contract between the class drivers and the USB device stack underneath them.
//!
//! The stack owns enumeration, endpoint scheduling and the hardware. Drivers only call
//! the primitives below and are called back through [`crate::driver::ClassDriver`].
use usb_device::{
    control::Request, device::UsbDeviceState, endpoint::EndpointAddress, UsbError,
};

use crate::descriptor::EndpointDescriptor;

/// Identifier of the root hub port / controller an instance is bound to.
pub type Port = u8;

/// Stage of a control transfer at which a driver is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlStage {
    Setup,
    Data,
    Ack,
}

/// Outcome of a transaction on a non-control endpoint, as reported by the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferResult {
    Success,
    Failed,
    Stalled,
    Timeout,
    Invalid,
}

impl TransferResult {
    pub fn is_success(self) -> bool {
        self == TransferResult::Success
    }
}

/// Who is responsible for re-arming an endpoint after a failed transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Recovery {
    /// The driver re-arms the OUT endpoint with the buffer it used before.
    Driver,
    /// The application took the failure over and re-arms on its own.
    Application,
}

pub trait UsbStack {
    fn state(&self) -> UsbDeviceState;

    fn ready(&self) -> bool {
        self.state() == UsbDeviceState::Configured
    }

    fn endpoint_busy(&self, port: Port, address: EndpointAddress) -> bool;

    /// Claims an endpoint for a new transfer. Fails if it is busy or already claimed.
    fn claim_endpoint(&mut self, port: Port, address: EndpointAddress) -> bool;

    fn open_endpoint(&mut self, port: Port, endpoint: &EndpointDescriptor) -> bool;

    /// Starts an IN transfer.
    fn write(&mut self, port: Port, address: EndpointAddress, data: &[u8]) -> Result<(), UsbError>;

    /// Arms an OUT endpoint to receive up to `len` bytes.
    fn prepare_read(&mut self, port: Port, address: EndpointAddress, len: usize)
        -> Result<(), UsbError>;

    /// Collects the data of a completed OUT transfer.
    fn read(&mut self, port: Port, address: EndpointAddress, buffer: &mut [u8])
        -> Result<usize, UsbError>;

    /// Replies to a device-to-host control request. The stack clamps to `wLength`.
    fn control_in(&mut self, port: Port, request: &Request, data: &[u8]) -> Result<(), UsbError>;

    /// Accepts the data stage of a host-to-device control request.
    fn control_out(&mut self, port: Port, request: &Request, len: usize) -> Result<(), UsbError>;

    /// Collects the data received by [`UsbStack::control_out`], valid from the ACK stage on.
    fn control_read(&mut self, port: Port, buffer: &mut [u8]) -> Result<usize, UsbError>;

    /// Sends a zero-length status packet.
    fn control_status(&mut self, port: Port, request: &Request) -> Result<(), UsbError>;
}
