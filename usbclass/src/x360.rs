//! Vendor-specific Xbox 360 wired controller interface.
//!
//! Unlike [`crate::hid`], each instance owns its small transfer buffers and keeps the OUT
//! endpoint armed on its own.
pub use class::X360Class;
pub use config::X360Config;
pub use controls::{Buttons, X360Controls};
pub use handler::X360Handler;
pub use message::{LedAnimation, MessageType, OutMessage};

mod class;
mod config;
mod controls;
mod handler;
mod message;

pub const INTERFACE_CLASS: u8 = 0xFF;
pub const INTERFACE_SUBCLASS: u8 = 0x5D;
pub const INTERFACE_PROTOCOL: u8 = 0x01;
/// Type of the class-specific descriptor following the interface descriptor.
pub const CLASS_SPECIFIC_TYPE: u8 = 0x21;
pub const CLASS_SPECIFIC_LEN: usize = 17;

pub const ENDPOINT_IN_SIZE: u16 = 32;
pub const ENDPOINT_OUT_SIZE: u16 = 32;
pub const TRANSFER_IN_BUFFER_SIZE: usize = 0x14;
pub const TRANSFER_OUT_BUFFER_SIZE: usize = 0x08;

/// `bRequest` of every vendor request the interface answers.
pub const VENDOR_REQUEST: u8 = 0x01;
/// `wValue` of the rumble capability request, interface recipient.
pub const HANDLE_RUMBLE: u16 = 0x0000;
/// `wValue` of the input capability request, interface recipient.
pub const HANDLE_CONTROL: u16 = 0x0100;
/// `wValue` of the serial number request, device recipient.
pub const HANDLE_SERIAL: u16 = 0x0000;
