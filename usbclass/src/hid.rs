//! Multi-instance HID class whose reports live in buffers the application owns.
pub use class::HidClass;
pub use handler::HidHandler;

mod class;
mod control;
mod handler;
mod instance;
#[cfg(test)]
mod tests;

pub const INTERFACE_CLASS: u8 = 0x03;

/// Report id passed to [`HidHandler::report_received`] for the interrupt OUT endpoint, where no
/// report id is known.
pub const UNKNOWN_REPORT_ID: u8 = 0xFF;

pub const GET_REPORT: u8 = 0x01;
pub const GET_IDLE: u8 = 0x02;
pub const GET_PROTOCOL: u8 = 0x03;
pub const SET_REPORT: u8 = 0x09;
pub const SET_IDLE: u8 = 0x0A;
pub const SET_PROTOCOL: u8 = 0x0B;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ReportType {
    Invalid = 0,
    Input = 1,
    Output = 2,
    Feature = 3,
}

impl From<u8> for ReportType {
    fn from(value: u8) -> Self {
        match value {
            1 => ReportType::Input,
            2 => ReportType::Output,
            3 => ReportType::Feature,
            _ => ReportType::Invalid,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Protocol {
    #[default]
    Boot = 0,
    Report = 1,
}

impl TryFrom<u8> for Protocol {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Protocol::Boot),
            1 => Ok(Protocol::Report),
            _ => Err(value),
        }
    }
}
