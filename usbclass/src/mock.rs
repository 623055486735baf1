//! Recording [`UsbStack`] for unit tests.
use std::vec::Vec;

use usb_device::{
    control::Request, device::UsbDeviceState, endpoint::EndpointAddress, UsbError,
};

use crate::{descriptor::EndpointDescriptor, Port, UsbStack};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    OpenEndpoint(Port, u8),
    Claim(Port, u8),
    Write(Port, u8, Vec<u8>),
    PrepareRead(Port, u8, usize),
    ControlIn(Port, Vec<u8>),
    ControlOut(Port, usize),
    ControlStatus(Port),
}

pub struct MockStack {
    pub state: UsbDeviceState,
    pub calls: Vec<Call>,
    pub busy: Vec<u8>,
    pub refuse_open: bool,
    pub refuse_read: bool,
    out_data: Vec<(u8, Vec<u8>)>,
    control_data: Vec<u8>,
}

impl MockStack {
    pub fn new() -> Self {
        MockStack {
            state: UsbDeviceState::Configured,
            calls: Vec::new(),
            busy: Vec::new(),
            refuse_open: false,
            refuse_read: false,
            out_data: Vec::new(),
            control_data: Vec::new(),
        }
    }

    /// Data the host sends on the OUT endpoint `address`.
    pub fn host_out(&mut self, address: u8, data: &[u8]) {
        self.out_data.push((address, data.to_vec()));
    }

    /// Data the host sends in the data stage of a control OUT request.
    pub fn host_control_out(&mut self, data: &[u8]) {
        self.control_data = data.to_vec();
    }

    pub fn take_calls(&mut self) -> Vec<Call> {
        core::mem::take(&mut self.calls)
    }
}

impl UsbStack for MockStack {
    fn state(&self) -> UsbDeviceState {
        self.state
    }

    fn endpoint_busy(&self, _port: Port, address: EndpointAddress) -> bool {
        self.busy.contains(&address.into())
    }

    fn claim_endpoint(&mut self, port: Port, address: EndpointAddress) -> bool {
        if self.endpoint_busy(port, address) {
            return false;
        }
        self.calls.push(Call::Claim(port, address.into()));
        true
    }

    fn open_endpoint(&mut self, port: Port, endpoint: &EndpointDescriptor) -> bool {
        if self.refuse_open {
            return false;
        }
        self.calls
            .push(Call::OpenEndpoint(port, endpoint.bEndpointAddress.into()));
        true
    }

    fn write(&mut self, port: Port, address: EndpointAddress, data: &[u8]) -> Result<(), UsbError> {
        self.calls.push(Call::Write(port, address.into(), data.to_vec()));
        Ok(())
    }

    fn prepare_read(
        &mut self,
        port: Port,
        address: EndpointAddress,
        len: usize,
    ) -> Result<(), UsbError> {
        if self.refuse_read {
            return Err(UsbError::InvalidState);
        }
        self.calls.push(Call::PrepareRead(port, address.into(), len));
        Ok(())
    }

    fn read(
        &mut self,
        _port: Port,
        address: EndpointAddress,
        buffer: &mut [u8],
    ) -> Result<usize, UsbError> {
        let address: u8 = address.into();
        let index = self
            .out_data
            .iter()
            .position(|(a, _)| *a == address)
            .ok_or(UsbError::WouldBlock)?;
        let (_, data) = self.out_data.remove(index);
        if data.len() > buffer.len() {
            return Err(UsbError::BufferOverflow);
        }
        buffer[..data.len()].copy_from_slice(&data);
        Ok(data.len())
    }

    fn control_in(&mut self, port: Port, request: &Request, data: &[u8]) -> Result<(), UsbError> {
        let len = data.len().min(usize::from(request.length));
        self.calls.push(Call::ControlIn(port, data[..len].to_vec()));
        Ok(())
    }

    fn control_out(&mut self, port: Port, _request: &Request, len: usize) -> Result<(), UsbError> {
        self.calls.push(Call::ControlOut(port, len));
        Ok(())
    }

    fn control_read(&mut self, _port: Port, buffer: &mut [u8]) -> Result<usize, UsbError> {
        let len = self.control_data.len().min(buffer.len());
        buffer[..len].copy_from_slice(&self.control_data[..len]);
        Ok(len)
    }

    fn control_status(&mut self, port: Port, _request: &Request) -> Result<(), UsbError> {
        self.calls.push(Call::ControlStatus(port));
        Ok(())
    }
}
