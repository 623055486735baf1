use usb_device::{
    control::{Recipient, Request, RequestType},
    endpoint::EndpointAddress,
    UsbError,
};

use crate::{
    control::{reply, targets_interface},
    descriptor::{self, EndpointPair, InterfaceDescriptor, TransferType},
    driver::{ClassDriver, ControlHandler},
    pool::{InstancePool, Slot},
    ControlStage, Error, Fault, OpenError, Port, Recovery, TransferResult, UsbStack,
};

use super::{
    message::{controls_message, rumble_capabilities},
    LedAnimation, OutMessage, X360Config, X360Controls, X360Handler, CLASS_SPECIFIC_LEN,
    CLASS_SPECIFIC_TYPE, HANDLE_CONTROL, HANDLE_RUMBLE, HANDLE_SERIAL, INTERFACE_CLASS,
    INTERFACE_PROTOCOL, INTERFACE_SUBCLASS, TRANSFER_IN_BUFFER_SIZE, TRANSFER_OUT_BUFFER_SIZE,
    VENDOR_REQUEST,
};

#[derive(Debug, Default)]
pub(super) struct X360Instance {
    pub port: Port,
    pub interface: u8,
    pub ep_in: Option<EndpointAddress>,
    pub ep_out: Option<EndpointAddress>,
    pub in_buffer: [u8; TRANSFER_IN_BUFFER_SIZE],
    pub out_buffer: [u8; TRANSFER_OUT_BUFFER_SIZE],
    pub led: LedAnimation,
}

impl Slot for X360Instance {
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

pub struct X360Class<H, const N: usize = 1> {
    pub(super) pool: InstancePool<X360Instance, N>,
    config: X360Config,
    handler: H,
}

impl<H: X360Handler, const N: usize> X360Class<H, N> {
    pub fn new(config: X360Config, handler: H) -> Self {
        X360Class {
            pool: InstancePool::new(),
            config,
            handler,
        }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn ready<S: UsbStack>(&self, stack: &S, interface: u8) -> bool {
        match self.pool.get_by_interface(interface) {
            Some(instance) => {
                stack.ready()
                    && instance
                        .ep_in
                        .map_or(false, |ep| !stack.endpoint_busy(instance.port, ep))
            }
            None => false,
        }
    }

    /// Sends `controls` as an input message.
    pub fn report<S: UsbStack>(
        &mut self,
        stack: &mut S,
        interface: u8,
        controls: &X360Controls,
    ) -> nb::Result<(), Error> {
        let instance = self
            .pool
            .find_by_interface(interface)
            .ok_or(Error::NoInstance { interface })?;
        let ep_in = instance.ep_in.ok_or(Error::NoEndpoint)?;
        if !stack.claim_endpoint(instance.port, ep_in) {
            return Err(nb::Error::WouldBlock);
        }
        let len = controls_message(&mut instance.in_buffer, &controls.to_bytes());
        match stack.write(instance.port, ep_in, &instance.in_buffer[..len]) {
            Ok(()) => Ok(()),
            Err(UsbError::WouldBlock) => Err(nb::Error::WouldBlock),
            Err(e) => Err(nb::Error::Other(e.into())),
        }
    }

    /// The LED animation last set by the host.
    pub fn led(&self, interface: u8) -> Option<LedAnimation> {
        self.pool
            .get_by_interface(interface)
            .map(|instance| instance.led)
    }

    fn receive<S: UsbStack>(
        &mut self,
        stack: &mut S,
        port: Port,
        address: EndpointAddress,
    ) -> Result<(), Fault> {
        let instance = match self.pool.find_by_endpoint(address) {
            Some(instance) => instance,
            None => return Ok(()),
        };
        match stack.read(port, address, &mut instance.out_buffer) {
            Ok(received) => match instance
                .out_buffer
                .get(..received)
                .and_then(OutMessage::parse)
            {
                Some(OutMessage::Rumble { left, right }) => {
                    self.handler.rumble_received(instance.interface, left, right);
                }
                Some(OutMessage::Led(led)) => {
                    if instance.led != led {
                        instance.led = led;
                        self.handler.led_received(instance.interface, led);
                    }
                }
                None => trace!("ignored OUT message of {} bytes", received),
            },
            Err(e) => warn!("reading OUT message failed: {}", e),
        }
        stack
            .prepare_read(port, address, TRANSFER_OUT_BUFFER_SIZE)
            .map_err(|e| {
                error!("re-arming OUT endpoint failed: {}", e);
                Fault::from(e)
            })
    }
}

impl<S: UsbStack, H: X360Handler, const N: usize> ControlHandler<S> for X360Class<H, N> {
    fn control_transfer(
        &mut self,
        stack: &mut S,
        port: Port,
        stage: ControlStage,
        request: &Request,
    ) -> bool {
        if request.request_type != RequestType::Vendor || request.request != VENDOR_REQUEST {
            return false;
        }
        let instance = match self.pool.find_by_interface(request.index as u8) {
            Some(instance) => instance,
            None => return false,
        };
        if instance.port != port {
            error!("X360 request on port {} instead of {}", port, instance.port);
            return false;
        }
        if !targets_interface(request, instance.interface) {
            return false;
        }

        let len = match (request.recipient, request.value) {
            (Recipient::Interface, HANDLE_RUMBLE) => match self.config.rumble {
                Some(rumble) if stage == ControlStage::Setup => {
                    rumble_capabilities(&mut instance.in_buffer, rumble)
                }
                Some(_) => return true,
                None => return false,
            },
            (Recipient::Interface, HANDLE_CONTROL) => match self.config.input {
                Some(input) if stage == ControlStage::Setup => {
                    controls_message(&mut instance.in_buffer, &input)
                }
                Some(_) => return true,
                None => return false,
            },
            (Recipient::Device, HANDLE_SERIAL) => match self.config.serial_number {
                Some(serial) if serial.len() > TRANSFER_IN_BUFFER_SIZE => {
                    debug!("serial number does not fit the transfer buffer");
                    return false;
                }
                Some(serial) if stage == ControlStage::Setup => {
                    instance.in_buffer[..serial.len()].copy_from_slice(serial.as_bytes());
                    serial.len()
                }
                Some(_) => return true,
                None => return false,
            },
            _ => return false,
        };
        reply(stack, port, request, &instance.in_buffer[..len])
    }
}

impl<'a, S: UsbStack, H: X360Handler, const N: usize> ClassDriver<'a, S> for X360Class<H, N> {
    fn name(&self) -> &'static str {
        "X360"
    }

    fn reset(&mut self, _port: Port) {
        self.pool.reset();
    }

    fn open(&mut self, stack: &mut S, port: Port, descriptors: &'a [u8]) -> Result<u16, OpenError> {
        let interface = InterfaceDescriptor::parse(descriptors)?;
        if !interface.matches(INTERFACE_CLASS, INTERFACE_SUBCLASS, INTERFACE_PROTOCOL) {
            return Err(OpenError::ClassMismatch);
        }

        let required = descriptor::INTERFACE_LEN
            + CLASS_SPECIFIC_LEN
            + usize::from(interface.bNumEndpoints) * descriptor::ENDPOINT_LEN;
        if descriptors.len() < required {
            error!("X360 interface needs {} bytes, got {}", required, descriptors.len());
            return Err(OpenError::Truncated {
                required,
                available: descriptors.len(),
            });
        }

        let rest = descriptor::next(descriptors)?;
        descriptor::expect(rest, CLASS_SPECIFIC_TYPE)?;
        let endpoints = EndpointPair::parse(
            descriptor::next(rest)?,
            interface.bNumEndpoints,
            TransferType::Interrupt,
        )?;
        if self
            .pool
            .is_bound(port, interface.bInterfaceNumber, endpoints.addresses())
        {
            error!("X360 interface {} is already bound", interface.bInterfaceNumber);
            return Err(OpenError::AlreadyBound {
                interface: interface.bInterfaceNumber,
            });
        }

        let instance = self.pool.acquire_free().ok_or_else(|| {
            error!("no free X360 instance");
            OpenError::PoolExhausted
        })?;
        endpoints.open(stack, port)?;

        *instance = X360Instance {
            port,
            interface: interface.bInterfaceNumber,
            ep_in: endpoints.ep_in,
            ep_out: endpoints.ep_out,
            ..X360Instance::default()
        };
        debug!("X360 bound to interface {}", interface.bInterfaceNumber);

        if let Some(ep_out) = instance.ep_out {
            if let Err(e) = stack.prepare_read(port, ep_out, TRANSFER_OUT_BUFFER_SIZE) {
                error!("arming OUT endpoint failed: {}", e);
            }
        }

        Ok(required as u16)
    }

    fn owns(&self, address: EndpointAddress) -> bool {
        self.pool.owns(address)
    }

    fn transfer_complete(
        &mut self,
        stack: &mut S,
        port: Port,
        address: EndpointAddress,
        result: TransferResult,
        len: usize,
    ) -> Result<(), Fault> {
        let instance = self.pool.find_by_endpoint(address).ok_or_else(|| {
            error!("X360 completion for unknown endpoint {}", u8::from(address));
            Fault::UnknownEndpoint {
                address: address.into(),
            }
        })?;
        if instance.port != port {
            error!("X360 completion on port {} instead of {}", port, instance.port);
            return Err(Fault::PortMismatch {
                expected: instance.port,
                found: port,
            });
        }

        if !result.is_success() {
            warn!("X360 transfer on {} failed: {}", u8::from(address), result);
            let recovery = self
                .handler
                .report_issue(instance.interface, address, result, len);
            if recovery == Recovery::Driver && instance.ep_out == Some(address) {
                stack.prepare_read(port, address, TRANSFER_OUT_BUFFER_SIZE)?;
            }
            return Ok(());
        }

        if instance.ep_in == Some(address) {
            let sent = len.min(TRANSFER_IN_BUFFER_SIZE);
            self.handler
                .report_complete(instance.interface, &instance.in_buffer[..sent], len);
            Ok(())
        } else if instance.ep_out == Some(address) {
            self.receive(stack, port, address)
        } else {
            Ok(())
        }
    }
}
