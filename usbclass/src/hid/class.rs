use usb_device::{endpoint::EndpointAddress, UsbError};

use crate::{
    descriptor::{self, EndpointPair, InterfaceDescriptor, TransferType},
    driver::ClassDriver,
    pool::InstancePool,
    Error, Fault, OpenError, Port, Recovery, TransferResult, UsbStack,
};

use super::{
    instance::HidInstance, HidHandler, Protocol, ReportType, INTERFACE_CLASS, UNKNOWN_REPORT_ID,
};

pub struct HidClass<'a, H, const N: usize = 1> {
    pub(super) pool: InstancePool<HidInstance<'a>, N>,
    pub(super) handler: H,
}

impl<'a, H: HidHandler<'a>, const N: usize> HidClass<'a, H, N> {
    pub fn new(handler: H) -> Self {
        HidClass {
            pool: InstancePool::new(),
            handler,
        }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Whether a report can be sent on `interface` right now.
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

    /// Starts an IN transfer of `report`. The report is handed back in
    /// [`HidHandler::report_sent`].
    pub fn send_report<S: UsbStack>(
        &mut self,
        stack: &mut S,
        interface: u8,
        report: &'a [u8],
    ) -> nb::Result<(), Error> {
        let instance = self
            .pool
            .find_by_interface(interface)
            .ok_or(Error::NoInstance { interface })?;
        let ep_in = instance.ep_in.ok_or(Error::NoEndpoint)?;
        if report.is_empty() {
            return Err(nb::Error::Other(Error::EmptyReport));
        }
        if !stack.claim_endpoint(instance.port, ep_in) {
            return Err(nb::Error::WouldBlock);
        }
        instance.in_report = Some(report);
        match stack.write(instance.port, ep_in, report) {
            Ok(()) => Ok(()),
            Err(UsbError::WouldBlock) => Err(nb::Error::WouldBlock),
            Err(e) => Err(nb::Error::Other(e.into())),
        }
    }

    /// Arms the OUT endpoint of `interface` with `buffer`. Has to be repeated after every
    /// received report.
    pub fn receive_report<S: UsbStack>(
        &mut self,
        stack: &mut S,
        interface: u8,
        buffer: &'a mut [u8],
    ) -> Result<(), Error> {
        let instance = self
            .pool
            .find_by_interface(interface)
            .ok_or(Error::NoInstance { interface })?;
        arm(stack, instance, buffer)
    }

    pub fn protocol(&self, interface: u8) -> Option<Protocol> {
        self.pool
            .get_by_interface(interface)
            .map(|instance| instance.protocol)
    }
}

fn arm<'a, S: UsbStack>(
    stack: &mut S,
    instance: &mut HidInstance<'a>,
    buffer: &'a mut [u8],
) -> Result<(), Error> {
    let ep_out = instance.ep_out.ok_or(Error::NoEndpoint)?;
    if buffer.is_empty() {
        return Err(Error::EmptyReport);
    }
    let len = buffer.len();
    instance.out_buffer = Some(buffer);
    stack.prepare_read(instance.port, ep_out, len)?;
    Ok(())
}

impl<'a, S: UsbStack, H: HidHandler<'a>, const N: usize> ClassDriver<'a, S> for HidClass<'a, H, N> {
    fn name(&self) -> &'static str {
        "HID"
    }

    fn reset(&mut self, _port: Port) {
        self.pool.reset();
    }

    fn open(&mut self, stack: &mut S, port: Port, descriptors: &'a [u8]) -> Result<u16, OpenError> {
        let interface = InterfaceDescriptor::parse(descriptors)?;
        if interface.bInterfaceClass != INTERFACE_CLASS {
            return Err(OpenError::ClassMismatch);
        }

        let required = descriptor::INTERFACE_LEN
            + descriptor::HID_LEN
            + usize::from(interface.bNumEndpoints) * descriptor::ENDPOINT_LEN;
        if descriptors.len() < required {
            error!("HID interface needs {} bytes, got {}", required, descriptors.len());
            return Err(OpenError::Truncated {
                required,
                available: descriptors.len(),
            });
        }

        let rest = descriptor::next(descriptors)?;
        let hid_descriptor = descriptor::expect(rest, descriptor::HID)?;
        let endpoints = EndpointPair::parse(
            descriptor::next(rest)?,
            interface.bNumEndpoints,
            TransferType::Interrupt,
        )?;
        if self
            .pool
            .is_bound(port, interface.bInterfaceNumber, endpoints.addresses())
        {
            error!("HID interface {} is already bound", interface.bInterfaceNumber);
            return Err(OpenError::AlreadyBound {
                interface: interface.bInterfaceNumber,
            });
        }

        let instance = self.pool.acquire_free().ok_or_else(|| {
            error!("no free HID instance");
            OpenError::PoolExhausted
        })?;
        endpoints.open(stack, port)?;

        *instance = HidInstance {
            port,
            interface: interface.bInterfaceNumber,
            ep_in: endpoints.ep_in,
            ep_out: endpoints.ep_out,
            hid_descriptor,
            protocol: Protocol::Report,
            ..HidInstance::default()
        };
        debug!("HID bound to interface {}", interface.bInterfaceNumber);

        if instance.ep_out.is_some() {
            if let Some(buffer) = self.handler.out_endpoint_opened(instance.interface) {
                if let Err(e) = arm(stack, instance, buffer) {
                    error!("arming OUT endpoint failed: {}", e);
                }
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
            error!("HID completion for unknown endpoint {}", u8::from(address));
            Fault::UnknownEndpoint {
                address: address.into(),
            }
        })?;
        if instance.port != port {
            error!("HID completion on port {} instead of {}", port, instance.port);
            return Err(Fault::PortMismatch {
                expected: instance.port,
                found: port,
            });
        }

        if !result.is_success() {
            warn!("HID transfer on {} failed: {}", u8::from(address), result);
            let recovery = self
                .handler
                .transfer_issue(instance.interface, address, result, len);
            if recovery == Recovery::Driver && instance.ep_out == Some(address) {
                match instance.out_buffer.as_deref() {
                    Some(buffer) => stack.prepare_read(port, address, buffer.len())?,
                    None => warn!("no OUT buffer to re-arm"),
                }
            }
            return Ok(());
        }

        if instance.ep_in == Some(address) {
            if let Some(report) = instance.in_report.take() {
                self.handler.report_sent(instance.interface, report, len);
            }
        } else if instance.ep_out == Some(address) {
            let buffer = match instance.out_buffer.take() {
                Some(buffer) => buffer,
                None => {
                    warn!("OUT report without armed buffer");
                    return Ok(());
                }
            };
            let received = match stack.read(port, address, buffer) {
                Ok(received) => received,
                Err(e) => {
                    error!("reading OUT report failed: {}", e);
                    instance.out_buffer = Some(buffer);
                    return Err(e.into());
                }
            };
            self.handler.report_received(
                instance.interface,
                UNKNOWN_REPORT_ID,
                ReportType::Output,
                buffer,
                received,
            );
        }
        Ok(())
    }
}
