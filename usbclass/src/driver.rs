//! Registry the stack walks to find the class driver responsible for an interface, a control
//! request or an endpoint.
use usb_device::{control::Request, endpoint::EndpointAddress};

use crate::{ControlStage, Fault, OpenError, Port, TransferResult, UsbStack};

/// A handler that only takes part in control transfers.
pub trait ControlHandler<S: UsbStack> {
    /// Returns false when the request is not for this handler or is refused. The stack stalls
    /// if no handler takes it.
    fn control_transfer(
        &mut self,
        stack: &mut S,
        port: Port,
        stage: ControlStage,
        request: &Request,
    ) -> bool;
}

/// A class driver owning a pool of interface instances.
///
/// `'a` is the lifetime of the configuration descriptor and of any buffer the application
/// hands to the driver.
pub trait ClassDriver<'a, S: UsbStack>: ControlHandler<S> {
    fn name(&self) -> &'static str;

    fn init(&mut self) {
        self.reset(0);
    }

    /// Releases every instance. Safe to call before anything was bound.
    fn reset(&mut self, port: Port);

    /// Binds the interface at the head of `descriptors` and returns the number of descriptor
    /// bytes consumed. `descriptors` reaches to the end of the configuration descriptor.
    fn open(&mut self, stack: &mut S, port: Port, descriptors: &'a [u8]) -> Result<u16, OpenError>;

    fn owns(&self, address: EndpointAddress) -> bool;

    fn transfer_complete(
        &mut self,
        stack: &mut S,
        port: Port,
        address: EndpointAddress,
        result: TransferResult,
        len: usize,
    ) -> Result<(), Fault>;
}

pub fn init<'a, S: UsbStack>(drivers: &mut [&mut dyn ClassDriver<'a, S>]) {
    for driver in drivers.iter_mut() {
        debug!("init {}", driver.name());
        driver.init();
    }
}

pub fn reset<'a, S: UsbStack>(drivers: &mut [&mut dyn ClassDriver<'a, S>], port: Port) {
    drivers.iter_mut().for_each(|driver| driver.reset(port));
}

/// Offers the interface to each driver in turn. The first one that does not decline decides.
pub fn open<'a, S: UsbStack>(
    drivers: &mut [&mut dyn ClassDriver<'a, S>],
    stack: &mut S,
    port: Port,
    descriptors: &'a [u8],
) -> Result<u16, OpenError> {
    for driver in drivers.iter_mut() {
        match driver.open(stack, port, descriptors) {
            Err(OpenError::ClassMismatch) => continue,
            Ok(len) => {
                info!("{} bound {} descriptor bytes", driver.name(), len);
                return Ok(len);
            }
            Err(e) => {
                error!("{} failed to bind: {}", driver.name(), e);
                return Err(e);
            }
        }
    }
    trace!("no driver for interface");
    Err(OpenError::ClassMismatch)
}

pub fn control<S: UsbStack>(
    handlers: &mut [&mut dyn ControlHandler<S>],
    stack: &mut S,
    port: Port,
    stage: ControlStage,
    request: &Request,
) -> bool {
    let handled = handlers
        .iter_mut()
        .any(|handler| handler.control_transfer(stack, port, stage, request));
    if !handled {
        debug!("stall request {} type {}", request.request, request.request_type);
    }
    handled
}

/// Routes a completion to the driver owning `address`.
pub fn transfer_complete<'a, S: UsbStack>(
    drivers: &mut [&mut dyn ClassDriver<'a, S>],
    stack: &mut S,
    port: Port,
    address: EndpointAddress,
    result: TransferResult,
    len: usize,
) -> Result<(), Fault> {
    match drivers.iter_mut().find(|driver| driver.owns(address)) {
        Some(driver) => driver.transfer_complete(stack, port, address, result, len),
        None => {
            error!("completion for unowned endpoint {}", u8::from(address));
            Err(Fault::UnknownEndpoint {
                address: address.into(),
            })
        }
    }
}
