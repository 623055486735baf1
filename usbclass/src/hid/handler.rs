use usb_device::endpoint::EndpointAddress;

use crate::{Recovery, TransferResult};

use super::{Protocol, ReportType};

/// Application side of a [`super::HidClass`].
///
/// Replies are copied by the stack when they are queued, so they only need to live as long as
/// the borrow of the handler. Buffers that receive data live for `'a` and travel between the
/// application and the driver: they move into the driver when armed and come back through
/// [`HidHandler::report_received`].
///
/// Every provided method stands for a capability the application may leave out. Left out,
/// the matching host request is stalled.
pub trait HidHandler<'a> {
    /// The report descriptor of `interface`. An empty descriptor stalls the request.
    fn report_descriptor(&self, interface: u8) -> &[u8];

    /// Reply to `GET_REPORT`. `None` or an empty report stalls.
    fn get_report(&mut self, interface: u8, report_id: u8, report_type: ReportType)
        -> Option<&[u8]>;

    /// An interrupt OUT endpoint was opened for `interface`. A returned buffer is armed right
    /// away, otherwise nothing is received until [`super::HidClass::receive_report`].
    fn out_endpoint_opened(&mut self, _interface: u8) -> Option<&'a mut [u8]> {
        None
    }

    /// Physical descriptor set `index`. Index 0 lists the number and sizes of the sets.
    fn physical_descriptor(&self, _interface: u8, _index: u8) -> Option<&[u8]> {
        None
    }

    /// Destination of a `SET_REPORT` data stage.
    fn set_report(
        &mut self,
        _interface: u8,
        _report_id: u8,
        _report_type: ReportType,
    ) -> Option<&'a mut [u8]> {
        None
    }

    /// Idle duration of a single report, in 4 ms units.
    fn get_idle(&mut self, _interface: u8, _report_id: u8) -> Option<u8> {
        None
    }

    fn set_idle(&mut self, _interface: u8, _report_id: u8, _duration: u8) -> bool {
        false
    }

    fn set_protocol(&mut self, _interface: u8, _protocol: Protocol) -> bool {
        false
    }

    fn report_sent(&mut self, _interface: u8, _report: &'a [u8], _len: usize) {}

    /// Data arrived in `report`. For the interrupt OUT endpoint `report_id` is
    /// [`super::UNKNOWN_REPORT_ID`] and the endpoint stays idle until the application arms it
    /// again.
    fn report_received(
        &mut self,
        _interface: u8,
        _report_id: u8,
        _report_type: ReportType,
        _report: &'a mut [u8],
        _len: usize,
    ) {
    }

    /// A transfer on `address` failed. Returning [`Recovery::Application`] leaves re-arming the
    /// endpoint to the application.
    fn transfer_issue(
        &mut self,
        _interface: u8,
        _address: EndpointAddress,
        _result: TransferResult,
        _len: usize,
    ) -> Recovery {
        Recovery::Driver
    }
}
