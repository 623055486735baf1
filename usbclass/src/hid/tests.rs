use std::vec::Vec;

use usb_device::endpoint::EndpointAddress;
use usbd_hid::descriptor::{KeyboardReport, SerializedDescriptor};

use super::*;
use crate::{
    control::{Request, SetupPacket},
    driver::{ClassDriver, ControlHandler},
    mock::{Call, MockStack},
    ControlStage, Error, Fault, OpenError, Recovery, TransferResult,
};

/// Interface 0, HID descriptor, interrupt IN 0x81 and interrupt OUT 0x01.
static KEYBOARD: [u8; 32] = [
    0x09, 0x04, 0x00, 0x00, 0x02, 0x03, 0x00, 0x00, 0x00, //
    0x09, 0x21, 0x11, 0x01, 0x00, 0x01, 0x22, 0x3f, 0x00, //
    0x07, 0x05, 0x81, 0x03, 0x08, 0x00, 0x0a, //
    0x07, 0x05, 0x01, 0x03, 0x08, 0x00, 0x0a,
];

/// Interface 1 with a single interrupt IN endpoint 0x82.
static IN_ONLY: [u8; 25] = [
    0x09, 0x04, 0x01, 0x00, 0x01, 0x03, 0x00, 0x00, 0x00, //
    0x09, 0x21, 0x11, 0x01, 0x00, 0x01, 0x22, 0x3f, 0x00, //
    0x07, 0x05, 0x82, 0x03, 0x40, 0x00, 0x01,
];

#[derive(Default)]
struct Recorder<'a> {
    input: Vec<u8>,
    arm_on_open: Option<&'a mut [u8]>,
    set_report_buffer: Option<&'a mut [u8]>,
    accept_protocol: bool,
    idle: Vec<(u8, u8)>,
    recovery: Option<Recovery>,
    sent: Vec<(u8, usize)>,
    received: Vec<(u8, u8, ReportType, Vec<u8>, usize)>,
    returned: Option<&'a mut [u8]>,
    issues: Vec<(u8, u8, TransferResult)>,
}

impl<'a> HidHandler<'a> for Recorder<'a> {
    fn report_descriptor(&self, _interface: u8) -> &[u8] {
        KeyboardReport::desc()
    }

    fn get_report(
        &mut self,
        _interface: u8,
        report_id: u8,
        report_type: ReportType,
    ) -> Option<&[u8]> {
        if report_id == 0 && report_type == ReportType::Input {
            Some(self.input.as_slice())
        } else {
            None
        }
    }

    fn out_endpoint_opened(&mut self, _interface: u8) -> Option<&'a mut [u8]> {
        self.arm_on_open.take()
    }

    fn set_report(
        &mut self,
        _interface: u8,
        _report_id: u8,
        _report_type: ReportType,
    ) -> Option<&'a mut [u8]> {
        self.set_report_buffer.take()
    }

    fn get_idle(&mut self, _interface: u8, report_id: u8) -> Option<u8> {
        self.idle
            .iter()
            .find(|(id, _)| *id == report_id)
            .map(|(_, duration)| *duration)
    }

    fn set_idle(&mut self, _interface: u8, report_id: u8, duration: u8) -> bool {
        self.idle.push((report_id, duration));
        true
    }

    fn set_protocol(&mut self, _interface: u8, _protocol: Protocol) -> bool {
        self.accept_protocol
    }

    fn report_sent(&mut self, interface: u8, _report: &'a [u8], len: usize) {
        self.sent.push((interface, len));
    }

    fn report_received(
        &mut self,
        interface: u8,
        report_id: u8,
        report_type: ReportType,
        report: &'a mut [u8],
        len: usize,
    ) {
        self.received
            .push((interface, report_id, report_type, report.to_vec(), len));
        self.returned = Some(report);
    }

    fn transfer_issue(
        &mut self,
        interface: u8,
        address: EndpointAddress,
        result: TransferResult,
        _len: usize,
    ) -> Recovery {
        self.issues.push((interface, address.into(), result));
        self.recovery.unwrap_or(Recovery::Driver)
    }
}

/// A handler that implements only what is mandatory.
struct Minimal;

impl<'a> HidHandler<'a> for Minimal {
    fn report_descriptor(&self, _interface: u8) -> &[u8] {
        &[]
    }

    fn get_report(
        &mut self,
        _interface: u8,
        _report_id: u8,
        _report_type: ReportType,
    ) -> Option<&[u8]> {
        None
    }
}

fn request(bytes: [u8; 8]) -> Request {
    SetupPacket::parse(&bytes).request()
}

fn ep(address: u8) -> EndpointAddress {
    EndpointAddress::from(address)
}

fn control<'a, H: HidHandler<'a>, const N: usize>(
    hid: &mut HidClass<'a, H, N>,
    stack: &mut MockStack,
    stage: ControlStage,
    bytes: [u8; 8],
) -> bool {
    hid.control_transfer(stack, 0, stage, &request(bytes))
}

#[test]
fn open_binds_interface_and_endpoints() {
    let mut stack = MockStack::new();
    let mut hid = HidClass::<_, 2>::new(Recorder::default());
    assert_eq!(hid.open(&mut stack, 0, &KEYBOARD), Ok(32));
    assert_eq!(
        stack.take_calls(),
        vec![Call::OpenEndpoint(0, 0x81), Call::OpenEndpoint(0, 0x01)]
    );
    assert!(hid.pool.owns(ep(0x81)));
    assert!(hid.pool.owns(ep(0x01)));
    assert!(!hid.pool.owns(ep(0x82)));
    assert_eq!(hid.protocol(0), Some(Protocol::Report));
    assert_eq!(hid.protocol(1), None);
}

#[test]
fn open_declines_other_classes() {
    let mut vendor = KEYBOARD;
    vendor[5] = 0xff;
    let mut stack = MockStack::new();
    let mut hid = HidClass::<_, 1>::new(Recorder::default());
    assert_eq!(
        hid.open(&mut stack, 0, &vendor),
        Err(OpenError::ClassMismatch)
    );
    assert!(stack.calls.is_empty());
}

#[test]
fn truncated_bind_leaves_pool_untouched() {
    let mut stack = MockStack::new();
    let mut hid = HidClass::<_, 1>::new(Recorder::default());
    assert_eq!(
        hid.open(&mut stack, 0, &KEYBOARD[..31]),
        Err(OpenError::Truncated {
            required: 32,
            available: 31
        })
    );
    assert!(stack.calls.is_empty());
    assert_eq!(hid.pool.occupied(), 0);
    assert_eq!(hid.open(&mut stack, 0, &KEYBOARD), Ok(32));
}

#[test]
fn missing_hid_descriptor_is_malformed() {
    let mut broken = KEYBOARD;
    broken[10] = 0x24;
    let mut stack = MockStack::new();
    let mut hid = HidClass::<_, 1>::new(Recorder::default());
    assert_eq!(
        hid.open(&mut stack, 0, &broken),
        Err(OpenError::UnexpectedDescriptor {
            expected: 0x21,
            found: 0x24
        })
    );
    assert_eq!(hid.pool.occupied(), 0);
}

#[test]
fn endpoint_count_is_checked() {
    let mut none = KEYBOARD;
    none[4] = 0x00;
    let mut three = [0u8; 39];
    three[..32].copy_from_slice(&KEYBOARD);
    three[4] = 0x03;
    three[32..].copy_from_slice(&[0x07, 0x05, 0x82, 0x03, 0x08, 0x00, 0x0a]);
    let mut stack = MockStack::new();
    let mut hid = HidClass::<_, 1>::new(Recorder::default());
    assert_eq!(
        hid.open(&mut stack, 0, &none),
        Err(OpenError::EndpointCount { count: 0 })
    );
    assert_eq!(
        hid.open(&mut stack, 0, &three),
        Err(OpenError::EndpointCount { count: 3 })
    );
    assert!(stack.calls.is_empty());
    assert_eq!(hid.pool.occupied(), 0);
}

#[test]
fn two_endpoints_of_one_direction_are_rejected() {
    let mut two_in = KEYBOARD;
    two_in[27] = 0x82;
    let mut stack = MockStack::new();
    let mut hid = HidClass::<_, 1>::new(Recorder::default());
    assert_eq!(
        hid.open(&mut stack, 0, &two_in),
        Err(OpenError::DuplicateDirection { address: 0x82 })
    );
    assert!(stack.calls.is_empty());
    assert!(!hid.pool.owns(ep(0x81)));
    assert!(!hid.pool.owns(ep(0x82)));
}

#[test]
fn interface_binds_once() {
    let mut renumbered = KEYBOARD;
    renumbered[2] = 0x01;
    let mut stack = MockStack::new();
    let mut hid = HidClass::<_, 2>::new(Recorder::default());
    assert_eq!(hid.open(&mut stack, 0, &KEYBOARD), Ok(32));
    stack.take_calls();
    assert_eq!(
        hid.open(&mut stack, 0, &KEYBOARD),
        Err(OpenError::AlreadyBound { interface: 0 })
    );
    assert_eq!(
        hid.open(&mut stack, 0, &renumbered),
        Err(OpenError::AlreadyBound { interface: 1 })
    );
    assert!(stack.take_calls().is_empty());
    assert_eq!(hid.pool.occupied(), 1);
    assert_eq!(hid.open(&mut stack, 0, &IN_ONLY), Ok(25));
}

#[test]
fn pool_exhaustion() {
    let mut stack = MockStack::new();
    let mut hid = HidClass::<_, 1>::new(Recorder::default());
    assert_eq!(hid.open(&mut stack, 0, &KEYBOARD), Ok(32));
    assert_eq!(
        hid.open(&mut stack, 0, &IN_ONLY),
        Err(OpenError::PoolExhausted)
    );
    ClassDriver::<'_, MockStack>::reset(&mut hid, 0);
    assert_eq!(hid.protocol(0), None);
    assert_eq!(hid.open(&mut stack, 0, &IN_ONLY), Ok(25));
}

#[test]
fn out_buffer_armed_on_open() {
    let mut buffer = [0u8; 8];
    let mut stack = MockStack::new();
    let mut hid = HidClass::<_, 1>::new(Recorder {
        arm_on_open: Some(&mut buffer),
        ..Recorder::default()
    });
    hid.open(&mut stack, 0, &KEYBOARD).unwrap();
    assert_eq!(stack.calls.last(), Some(&Call::PrepareRead(0, 0x01, 8)));
}

#[test]
fn get_report_replies_application_data() {
    let mut stack = MockStack::new();
    let mut hid = HidClass::<_, 1>::new(Recorder {
        input: vec![0xAA],
        ..Recorder::default()
    });
    hid.open(&mut stack, 0, &KEYBOARD).unwrap();
    stack.take_calls();

    // GET_REPORT(Input, id 0) on interface 0
    let get_report = [0xa1, 0x01, 0x00, 0x01, 0x00, 0x00, 0x01, 0x00];
    assert!(control(&mut hid, &mut stack, ControlStage::Setup, get_report));
    assert_eq!(stack.take_calls(), vec![Call::ControlIn(0, vec![0xAA])]);
    assert!(control(&mut hid, &mut stack, ControlStage::Ack, get_report));
    assert!(stack.calls.is_empty());

    // Feature report the application does not have
    let get_feature = [0xa1, 0x01, 0x02, 0x03, 0x00, 0x00, 0x01, 0x00];
    assert!(!control(&mut hid, &mut stack, ControlStage::Setup, get_feature));
}

#[test]
fn get_report_requires_device_to_host() {
    let mut stack = MockStack::new();
    let mut hid = HidClass::<_, 1>::new(Recorder {
        input: vec![0xAA],
        ..Recorder::default()
    });
    hid.open(&mut stack, 0, &KEYBOARD).unwrap();
    let wrong_direction = [0x21, 0x01, 0x00, 0x01, 0x00, 0x00, 0x01, 0x00];
    assert!(!control(&mut hid, &mut stack, ControlStage::Setup, wrong_direction));
}

#[test]
fn requests_for_other_interfaces_are_declined() {
    let mut stack = MockStack::new();
    let mut hid = HidClass::<_, 1>::new(Recorder {
        input: vec![0xAA],
        ..Recorder::default()
    });
    hid.open(&mut stack, 0, &KEYBOARD).unwrap();
    stack.take_calls();

    // interface 1 is not bound
    let other = [0xa1, 0x01, 0x00, 0x01, 0x01, 0x00, 0x01, 0x00];
    assert!(!control(&mut hid, &mut stack, ControlStage::Setup, other));
    // wIndex 0x0100 truncates to interface 0 but is not interface 0
    let high_index = [0xa1, 0x01, 0x00, 0x01, 0x00, 0x01, 0x01, 0x00];
    assert!(!control(&mut hid, &mut stack, ControlStage::Setup, high_index));
    // device recipient
    let device = [0xa0, 0x01, 0x00, 0x01, 0x00, 0x00, 0x01, 0x00];
    assert!(!control(&mut hid, &mut stack, ControlStage::Setup, device));
    // other port
    let get_report = request([0xa1, 0x01, 0x00, 0x01, 0x00, 0x00, 0x01, 0x00]);
    assert!(!hid.control_transfer(&mut stack, 1, ControlStage::Setup, &get_report));
    assert!(stack.calls.is_empty());
}

#[test]
fn descriptor_requests() {
    let mut stack = MockStack::new();
    let mut hid = HidClass::<_, 1>::new(Recorder::default());
    hid.open(&mut stack, 0, &KEYBOARD).unwrap();
    stack.take_calls();

    let get_hid = [0x81, 0x06, 0x00, 0x21, 0x00, 0x00, 0xff, 0x00];
    assert!(control(&mut hid, &mut stack, ControlStage::Setup, get_hid));
    assert_eq!(
        stack.take_calls(),
        vec![Call::ControlIn(0, KEYBOARD[9..18].to_vec())]
    );

    let get_report_descriptor = [0x81, 0x06, 0x00, 0x22, 0x00, 0x00, 0xff, 0x00];
    assert!(control(&mut hid, &mut stack, ControlStage::Setup, get_report_descriptor));
    assert_eq!(
        stack.take_calls(),
        vec![Call::ControlIn(0, KeyboardReport::desc().to_vec())]
    );

    // no physical descriptor provided
    let get_physical = [0x81, 0x06, 0x00, 0x23, 0x00, 0x00, 0xff, 0x00];
    assert!(!control(&mut hid, &mut stack, ControlStage::Setup, get_physical));
    // SET_DESCRIPTOR is not supported
    let set_descriptor = [0x01, 0x07, 0x00, 0x22, 0x00, 0x00, 0x10, 0x00];
    assert!(!control(&mut hid, &mut stack, ControlStage::Setup, set_descriptor));
}

#[test]
fn empty_report_descriptor_stalls() {
    let mut stack = MockStack::new();
    let mut hid = HidClass::<_, 1>::new(Minimal);
    hid.open(&mut stack, 0, &KEYBOARD).unwrap();
    let get_report_descriptor = [0x81, 0x06, 0x00, 0x22, 0x00, 0x00, 0xff, 0x00];
    assert!(!control(&mut hid, &mut stack, ControlStage::Setup, get_report_descriptor));
}

#[test]
fn idle_round_trip() {
    let mut stack = MockStack::new();
    let mut hid = HidClass::<_, 1>::new(Recorder::default());
    hid.open(&mut stack, 0, &KEYBOARD).unwrap();
    stack.take_calls();

    // SET_IDLE(duration 125 = 500 ms, id 0)
    let set_idle = [0x21, 0x0a, 0x00, 0x7d, 0x00, 0x00, 0x00, 0x00];
    assert!(control(&mut hid, &mut stack, ControlStage::Setup, set_idle));
    assert_eq!(stack.take_calls(), vec![Call::ControlStatus(0)]);
    assert!(hid.handler().idle.is_empty());

    let get_idle = [0xa1, 0x02, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00];
    assert!(control(&mut hid, &mut stack, ControlStage::Setup, get_idle));
    assert_eq!(stack.take_calls(), vec![Call::ControlIn(0, vec![125])]);
}

#[test]
fn idle_per_report_goes_to_application() {
    let mut stack = MockStack::new();
    let mut hid = HidClass::<_, 1>::new(Recorder::default());
    hid.open(&mut stack, 0, &KEYBOARD).unwrap();
    stack.take_calls();

    // SET_IDLE(duration 4, id 2)
    let set_idle = [0x21, 0x0a, 0x02, 0x04, 0x00, 0x00, 0x00, 0x00];
    assert!(control(&mut hid, &mut stack, ControlStage::Setup, set_idle));
    assert_eq!(hid.handler().idle, vec![(2, 4)]);

    let get_idle = [0xa1, 0x02, 0x02, 0x00, 0x00, 0x00, 0x01, 0x00];
    stack.take_calls();
    assert!(control(&mut hid, &mut stack, ControlStage::Setup, get_idle));
    assert_eq!(stack.take_calls(), vec![Call::ControlIn(0, vec![4])]);

    // the instance-wide rate is unchanged
    let get_all = [0xa1, 0x02, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00];
    assert!(control(&mut hid, &mut stack, ControlStage::Setup, get_all));
    assert_eq!(stack.take_calls(), vec![Call::ControlIn(0, vec![0])]);
}

#[test]
fn idle_per_report_without_handler_stalls() {
    let mut stack = MockStack::new();
    let mut hid = HidClass::<_, 1>::new(Minimal);
    hid.open(&mut stack, 0, &KEYBOARD).unwrap();
    stack.take_calls();

    let set_idle = [0x21, 0x0a, 0x02, 0x04, 0x00, 0x00, 0x00, 0x00];
    assert!(!control(&mut hid, &mut stack, ControlStage::Setup, set_idle));
    let get_idle = [0xa1, 0x02, 0x02, 0x00, 0x00, 0x00, 0x01, 0x00];
    assert!(!control(&mut hid, &mut stack, ControlStage::Setup, get_idle));
    assert!(stack.calls.is_empty());
}

#[test]
fn protocol_round_trip() {
    let mut stack = MockStack::new();
    let mut hid = HidClass::<_, 1>::new(Recorder {
        accept_protocol: true,
        ..Recorder::default()
    });
    hid.open(&mut stack, 0, &KEYBOARD).unwrap();
    stack.take_calls();

    let get_protocol = [0xa1, 0x03, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00];
    assert!(control(&mut hid, &mut stack, ControlStage::Setup, get_protocol));
    assert_eq!(stack.take_calls(), vec![Call::ControlIn(0, vec![1])]);

    let set_boot = [0x21, 0x0b, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
    assert!(control(&mut hid, &mut stack, ControlStage::Setup, set_boot));
    assert_eq!(stack.take_calls(), vec![Call::ControlStatus(0)]);
    assert_eq!(hid.protocol(0), Some(Protocol::Boot));

    let set_report = [0x21, 0x0b, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00];
    assert!(control(&mut hid, &mut stack, ControlStage::Setup, set_report));
    stack.take_calls();
    assert!(control(&mut hid, &mut stack, ControlStage::Setup, get_protocol));
    assert_eq!(stack.take_calls(), vec![Call::ControlIn(0, vec![1])]);
}

#[test]
fn rejected_protocol_stalls() {
    let mut stack = MockStack::new();
    let mut hid = HidClass::<_, 1>::new(Recorder::default());
    hid.open(&mut stack, 0, &KEYBOARD).unwrap();
    stack.take_calls();

    let set_boot = [0x21, 0x0b, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
    assert!(!control(&mut hid, &mut stack, ControlStage::Setup, set_boot));
    assert!(stack.calls.is_empty());

    let set_invalid = [0x21, 0x0b, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00];
    assert!(!control(&mut hid, &mut stack, ControlStage::Setup, set_invalid));
}

#[test]
fn set_report_without_destination_stalls() {
    let mut stack = MockStack::new();
    let mut hid = HidClass::<_, 1>::new(Recorder::default());
    hid.open(&mut stack, 0, &KEYBOARD).unwrap();
    stack.take_calls();

    let set_report = [0x21, 0x09, 0x00, 0x02, 0x00, 0x00, 0x01, 0x00];
    assert!(!control(&mut hid, &mut stack, ControlStage::Setup, set_report));
    assert!(stack.calls.is_empty());
    let instance = hid.pool.get_by_interface(0).unwrap();
    assert!(instance.control_buffer.is_none());
    assert!(instance.out_buffer.is_none());
    assert_eq!(instance.protocol, Protocol::Report);
    assert_eq!(instance.idle, 0);
}

#[test]
fn set_report_delivers_data_at_ack() {
    let mut leds = [0u8; 1];
    let mut stack = MockStack::new();
    let mut hid = HidClass::<_, 1>::new(Recorder {
        set_report_buffer: Some(&mut leds),
        ..Recorder::default()
    });
    hid.open(&mut stack, 0, &KEYBOARD).unwrap();
    stack.take_calls();

    // SET_REPORT(Output, id 0), one byte of LED state
    let set_report = [0x21, 0x09, 0x00, 0x02, 0x00, 0x00, 0x01, 0x00];
    assert!(control(&mut hid, &mut stack, ControlStage::Setup, set_report));
    assert_eq!(stack.take_calls(), vec![Call::ControlOut(0, 1)]);
    assert!(hid.handler().received.is_empty());

    stack.host_control_out(&[0x02]);
    assert!(control(&mut hid, &mut stack, ControlStage::Ack, set_report));
    assert_eq!(
        hid.handler().received,
        vec![(0, 0, ReportType::Output, vec![0x02], 1)]
    );
    assert!(hid.handler().returned.is_some());
}

#[test]
fn set_report_ack_without_pending_buffer_is_acknowledged() {
    let mut stack = MockStack::new();
    let mut hid = HidClass::<_, 1>::new(Minimal);
    hid.open(&mut stack, 0, &KEYBOARD).unwrap();
    let set_report = [0x21, 0x09, 0x00, 0x02, 0x00, 0x00, 0x01, 0x00];
    assert!(control(&mut hid, &mut stack, ControlStage::Ack, set_report));
}

#[test]
fn send_report_and_completion() {
    let report = [0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00];
    let mut stack = MockStack::new();
    let mut hid = HidClass::<_, 1>::new(Recorder::default());
    hid.open(&mut stack, 0, &KEYBOARD).unwrap();
    stack.take_calls();

    assert!(hid.ready(&stack, 0));
    assert_eq!(hid.send_report(&mut stack, 0, &report), Ok(()));
    assert_eq!(
        stack.take_calls(),
        vec![Call::Claim(0, 0x81), Call::Write(0, 0x81, report.to_vec())]
    );

    stack.busy.push(0x81);
    assert!(!hid.ready(&stack, 0));
    assert_eq!(
        hid.send_report(&mut stack, 0, &report),
        Err(nb::Error::WouldBlock)
    );
    stack.busy.clear();

    hid.transfer_complete(&mut stack, 0, ep(0x81), TransferResult::Success, 8)
        .unwrap();
    assert_eq!(hid.handler().sent, vec![(0, 8)]);
    assert!(stack.calls.is_empty());
}

#[test]
fn send_report_errors() {
    let mut stack = MockStack::new();
    let mut hid = HidClass::<_, 1>::new(Recorder::default());
    assert_eq!(
        hid.send_report(&mut stack, 0, &[0x01]),
        Err(nb::Error::Other(Error::NoInstance { interface: 0 }))
    );
    hid.open(&mut stack, 0, &KEYBOARD).unwrap();
    stack.take_calls();
    assert_eq!(
        hid.send_report(&mut stack, 0, &[]),
        Err(nb::Error::Other(Error::EmptyReport))
    );
    assert!(stack.calls.is_empty());

    stack.state = usb_device::device::UsbDeviceState::Suspend;
    assert!(!hid.ready(&stack, 0));
}

#[test]
fn received_report_needs_new_buffer() {
    let mut first = [0u8; 8];
    let mut second = [0u8; 8];
    let mut stack = MockStack::new();
    let mut hid = HidClass::<_, 1>::new(Recorder {
        arm_on_open: Some(&mut first),
        ..Recorder::default()
    });
    hid.open(&mut stack, 0, &KEYBOARD).unwrap();
    stack.take_calls();

    stack.host_out(0x01, &[0x01, 0x02, 0x03]);
    hid.transfer_complete(&mut stack, 0, ep(0x01), TransferResult::Success, 3)
        .unwrap();
    assert_eq!(
        hid.handler().received,
        vec![(0, UNKNOWN_REPORT_ID, ReportType::Output, vec![1, 2, 3, 0, 0, 0, 0, 0], 3)]
    );
    assert!(stack.calls.is_empty());
    assert!(hid.pool.get_by_interface(0).unwrap().out_buffer.is_none());

    // a failure now has no buffer to re-arm
    hid.transfer_complete(&mut stack, 0, ep(0x01), TransferResult::Failed, 0)
        .unwrap();
    assert!(stack.calls.is_empty());

    hid.receive_report(&mut stack, 0, &mut second).unwrap();
    assert_eq!(stack.take_calls(), vec![Call::PrepareRead(0, 0x01, 8)]);
}

#[test]
fn receive_report_needs_out_endpoint() {
    let mut buffer = [0u8; 8];
    let mut stack = MockStack::new();
    let mut hid = HidClass::<_, 1>::new(Recorder::default());
    hid.open(&mut stack, 0, &IN_ONLY).unwrap();
    assert_eq!(
        hid.receive_report(&mut stack, 1, &mut buffer),
        Err(Error::NoEndpoint)
    );
}

#[test]
fn out_failure_rearms_same_buffer() {
    let mut buffer = [0u8; 6];
    let mut stack = MockStack::new();
    let mut hid = HidClass::<_, 1>::new(Recorder {
        arm_on_open: Some(&mut buffer),
        ..Recorder::default()
    });
    hid.open(&mut stack, 0, &KEYBOARD).unwrap();
    let armed = stack.take_calls().pop();
    assert_eq!(armed, Some(Call::PrepareRead(0, 0x01, 6)));

    hid.transfer_complete(&mut stack, 0, ep(0x01), TransferResult::Stalled, 0)
        .unwrap();
    assert_eq!(stack.take_calls().pop(), armed);
    assert_eq!(hid.handler().issues, vec![(0, 0x01, TransferResult::Stalled)]);
}

#[test]
fn in_failure_is_not_rearmed() {
    let mut stack = MockStack::new();
    let mut hid = HidClass::<_, 1>::new(Recorder::default());
    hid.open(&mut stack, 0, &KEYBOARD).unwrap();
    hid.send_report(&mut stack, 0, &[0x01]).unwrap();
    stack.take_calls();

    hid.transfer_complete(&mut stack, 0, ep(0x81), TransferResult::Timeout, 0)
        .unwrap();
    assert!(stack.calls.is_empty());
    assert!(hid.handler().sent.is_empty());
}

#[test]
fn application_recovery_leaves_endpoint_alone() {
    let mut buffer = [0u8; 6];
    let mut stack = MockStack::new();
    let mut hid = HidClass::<_, 1>::new(Recorder {
        arm_on_open: Some(&mut buffer),
        recovery: Some(Recovery::Application),
        ..Recorder::default()
    });
    hid.open(&mut stack, 0, &KEYBOARD).unwrap();
    stack.take_calls();

    hid.transfer_complete(&mut stack, 0, ep(0x01), TransferResult::Failed, 0)
        .unwrap();
    assert!(stack.calls.is_empty());
    assert_eq!(hid.handler().issues, vec![(0, 0x01, TransferResult::Failed)]);
}

#[test]
fn completion_consistency_faults() {
    let mut stack = MockStack::new();
    let mut hid = HidClass::<_, 1>::new(Recorder::default());
    hid.open(&mut stack, 0, &KEYBOARD).unwrap();
    assert_eq!(
        hid.transfer_complete(&mut stack, 0, ep(0x83), TransferResult::Success, 0),
        Err(Fault::UnknownEndpoint { address: 0x83 })
    );
    assert_eq!(
        hid.transfer_complete(&mut stack, 1, ep(0x81), TransferResult::Success, 0),
        Err(Fault::PortMismatch {
            expected: 0,
            found: 1
        })
    );
}

#[test]
fn generated_report_descriptor() {
    use usbd_hid::descriptor::generator_prelude::*;

    #[gen_hid_descriptor(
        (collection = APPLICATION, usage_page = VENDOR_DEFINED_START, usage = 0x01) = {
            (usage = 0x02,) = {
                #[item_settings data,variable,absolute] input_buffer=input;
            };
            (usage = 0x03,) = {
                #[item_settings data,variable,absolute] output_buffer=output;
            };
        }
    )]
    struct ConfigReport {
        input_buffer: [u8; 32],
        output_buffer: [u8; 32],
    }

    struct Config;

    impl<'a> HidHandler<'a> for Config {
        fn report_descriptor(&self, _interface: u8) -> &[u8] {
            ConfigReport::desc()
        }

        fn get_report(
        &mut self,
        _interface: u8,
        _report_id: u8,
        _report_type: ReportType,
    ) -> Option<&[u8]> {
            None
        }
    }

    let mut stack = MockStack::new();
    let mut hid = HidClass::<_, 2>::new(Config);
    hid.open(&mut stack, 0, &IN_ONLY).unwrap();
    stack.take_calls();

    let get_report_descriptor = [0x81, 0x06, 0x00, 0x22, 0x01, 0x00, 0xff, 0x00];
    assert!(control(&mut hid, &mut stack, ControlStage::Setup, get_report_descriptor));
    assert_eq!(
        stack.take_calls(),
        vec![Call::ControlIn(0, ConfigReport::desc().to_vec())]
    );
}
