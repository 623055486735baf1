use snafu::Snafu;
use usb_device::UsbError;

/// Why a driver did not bind to an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Snafu)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[snafu(visibility(pub(crate)))]
pub enum OpenError {
    #[snafu(display("Interface class does not belong to this driver"))]
    ClassMismatch,
    #[snafu(display("Descriptors need {required} bytes but only {available} are available"))]
    Truncated { required: usize, available: usize },
    #[snafu(display("Expected descriptor type {expected:#04x} but found {found:#04x}"))]
    UnexpectedDescriptor { expected: u8, found: u8 },
    #[snafu(display("Endpoint descriptor does not describe the required transfer type"))]
    EndpointMismatch,
    #[snafu(display("No free instance left"))]
    PoolExhausted,
    #[snafu(display("Interface declares {count} endpoints, one or two are supported"))]
    EndpointCount { count: u8 },
    #[snafu(display("Endpoint {address:#04x} repeats the direction of the previous one"))]
    DuplicateDirection { address: u8 },
    #[snafu(display("Interface {interface} or one of its endpoints is already bound"))]
    AlreadyBound { interface: u8 },
    #[snafu(display("Stack refused to open endpoint {address:#04x}"))]
    EndpointOpenFailed { address: u8 },
}

impl OpenError {
    /// A decline lets another driver probe the same interface. Everything else means the
    /// configuration descriptor does not fit the driver as built.
    pub fn is_decline(&self) -> bool {
        matches!(self, OpenError::ClassMismatch)
    }
}

/// Consistency violation reported by a transfer completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Snafu)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[snafu(visibility(pub(crate)))]
pub enum Fault {
    #[snafu(display("Completion for endpoint {address:#04x} which no instance owns"))]
    UnknownEndpoint { address: u8 },
    #[snafu(display("Completion on port {found} for an instance bound to port {expected}"))]
    PortMismatch { expected: u8, found: u8 },
    #[snafu(
        display("Stack refused to re-arm an endpoint: {error:?}"),
        context(suffix(FaultSnafu))
    )]
    Stack { error: UsbError },
}

impl From<UsbError> for Fault {
    fn from(error: UsbError) -> Self {
        Fault::Stack { error }
    }
}

/// Errors of the application-facing driver API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Snafu)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("No instance is bound to interface {interface}"))]
    NoInstance { interface: u8 },
    #[snafu(display("Report buffer is empty"))]
    EmptyReport,
    #[snafu(display("Interface has no endpoint for this direction"))]
    NoEndpoint,
    #[snafu(display("Descriptor of {required} bytes does not fit into {capacity}"))]
    DescriptorTooLong { required: usize, capacity: usize },
    #[snafu(display("Stack error: {error:?}"))]
    Stack { error: UsbError },
}

impl From<UsbError> for Error {
    fn from(error: UsbError) -> Self {
        Error::Stack { error }
    }
}
