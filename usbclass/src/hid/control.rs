use usb_device::{
    control::{Recipient, Request, RequestType},
    UsbDirection,
};

use crate::{
    control::{accept, reply, targets_interface, value_bytes},
    descriptor,
    driver::ControlHandler,
    ControlStage, Port, UsbStack,
};

use super::{
    instance::HidInstance, HidClass, HidHandler, Protocol, ReportType, GET_IDLE, GET_PROTOCOL,
    GET_REPORT, SET_IDLE, SET_PROTOCOL, SET_REPORT,
};

impl<'a, S: UsbStack, H: HidHandler<'a>, const N: usize> ControlHandler<S> for HidClass<'a, H, N> {
    fn control_transfer(
        &mut self,
        stack: &mut S,
        port: Port,
        stage: ControlStage,
        request: &Request,
    ) -> bool {
        if request.recipient != Recipient::Interface {
            return false;
        }
        let instance = match self.pool.find_by_interface(request.index as u8) {
            Some(instance) => instance,
            None => return false,
        };
        if instance.port != port {
            error!("HID request on port {} instead of {}", port, instance.port);
            return false;
        }
        if !targets_interface(request, instance.interface) {
            return false;
        }

        match request.request_type {
            RequestType::Standard => {
                standard_request(stack, &mut self.handler, instance, stage, request)
            }
            RequestType::Class => class_request(stack, &mut self.handler, instance, stage, request),
            _ => false,
        }
    }
}

/// Descriptor requests. `SET_DESCRIPTOR` is not supported.
fn standard_request<'a, S: UsbStack, H: HidHandler<'a>>(
    stack: &mut S,
    handler: &mut H,
    instance: &HidInstance<'a>,
    stage: ControlStage,
    request: &Request,
) -> bool {
    if request.request != Request::GET_DESCRIPTOR {
        return false;
    }
    let (descriptor_type, index) = value_bytes(request);
    match descriptor_type {
        descriptor::HID => {
            if stage != ControlStage::Setup {
                return true;
            }
            if instance.hid_descriptor.is_empty() {
                return false;
            }
            reply(stack, instance.port, request, instance.hid_descriptor)
        }
        descriptor::REPORT => {
            if stage != ControlStage::Setup {
                return true;
            }
            let report = handler.report_descriptor(instance.interface);
            if report.is_empty() {
                debug!("empty report descriptor for interface {}", instance.interface);
                return false;
            }
            reply(stack, instance.port, request, report)
        }
        descriptor::PHYSICAL => {
            if stage != ControlStage::Setup {
                return true;
            }
            match handler.physical_descriptor(instance.interface, index) {
                Some(physical) if !physical.is_empty() => {
                    reply(stack, instance.port, request, physical)
                }
                _ => false,
            }
        }
        _ => false,
    }
}

fn class_request<'a, S: UsbStack, H: HidHandler<'a>>(
    stack: &mut S,
    handler: &mut H,
    instance: &mut HidInstance<'a>,
    stage: ControlStage,
    request: &Request,
) -> bool {
    let (high, report_id) = value_bytes(request);
    let port = instance.port;
    let interface = instance.interface;
    match request.request {
        GET_REPORT => {
            if request.direction != UsbDirection::In {
                return false;
            }
            if stage != ControlStage::Setup {
                return true;
            }
            match handler.get_report(interface, report_id, ReportType::from(high)) {
                Some(report) if !report.is_empty() => reply(stack, port, request, report),
                _ => {
                    debug!("no report {} for interface {}", report_id, interface);
                    false
                }
            }
        }
        SET_REPORT => {
            if request.direction != UsbDirection::Out {
                return false;
            }
            match stage {
                ControlStage::Setup => {
                    let report_type = ReportType::from(high);
                    let buffer = match handler.set_report(interface, report_id, report_type) {
                        Some(buffer) if !buffer.is_empty() => buffer,
                        _ => return false,
                    };
                    let len = buffer.len();
                    instance.control_buffer = Some(buffer);
                    if let Err(e) = stack.control_out(port, request, len) {
                        warn!("control OUT refused: {}", e);
                        instance.control_buffer = None;
                        return false;
                    }
                    true
                }
                ControlStage::Data => true,
                ControlStage::Ack => {
                    if let Some(buffer) = instance.control_buffer.take() {
                        if let Err(e) = stack.control_read(port, buffer) {
                            warn!("reading SET_REPORT data failed: {}", e);
                        }
                        handler.report_received(
                            interface,
                            report_id,
                            ReportType::from(high),
                            buffer,
                            usize::from(request.length),
                        );
                    }
                    true
                }
            }
        }
        GET_IDLE => {
            if request.direction != UsbDirection::In {
                return false;
            }
            if stage != ControlStage::Setup {
                return true;
            }
            let duration = if report_id == 0 {
                Some(instance.idle)
            } else {
                handler.get_idle(interface, report_id)
            };
            match duration {
                Some(duration) => reply(stack, port, request, &[duration]),
                None => false,
            }
        }
        SET_IDLE => {
            if request.direction != UsbDirection::Out {
                return false;
            }
            if stage != ControlStage::Setup {
                return true;
            }
            let accepted = if report_id == 0 {
                instance.idle = high;
                true
            } else {
                handler.set_idle(interface, report_id, high)
            };
            accepted && accept(stack, port, request)
        }
        GET_PROTOCOL => {
            if request.direction != UsbDirection::In {
                return false;
            }
            if stage != ControlStage::Setup {
                return true;
            }
            reply(stack, port, request, &[instance.protocol as u8])
        }
        SET_PROTOCOL => {
            if request.direction != UsbDirection::Out {
                return false;
            }
            if stage != ControlStage::Setup {
                return true;
            }
            let protocol = match Protocol::try_from(report_id) {
                Ok(protocol) => protocol,
                Err(value) => {
                    debug!("invalid protocol {}", value);
                    return false;
                }
            };
            instance.protocol = protocol;
            handler.set_protocol(interface, protocol) && accept(stack, port, request)
        }
        _ => false,
    }
}
