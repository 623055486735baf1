#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod control;
pub mod descriptor;
pub mod driver;
mod error;
pub mod hid;
pub mod ms_os;
pub mod pool;
pub mod stack;
pub mod x360;

#[cfg(test)]
mod mock;

pub use error::{Error, Fault, OpenError};
pub use stack::{ControlStage, Port, Recovery, TransferResult, UsbStack};
