//! Fixed-capacity storage for the instances of one class driver.
use usb_device::endpoint::EndpointAddress;

use crate::Port;

/// A pool entry. A slot is free exactly when it has neither endpoint, interface number 0 is a
/// valid binding.
pub trait Slot: Default {
    fn port(&self) -> Port;
    fn interface(&self) -> u8;
    fn ep_in(&self) -> Option<EndpointAddress>;
    fn ep_out(&self) -> Option<EndpointAddress>;

    fn is_free(&self) -> bool {
        self.ep_in().is_none() && self.ep_out().is_none()
    }

    fn owns(&self, address: EndpointAddress) -> bool {
        self.ep_in() == Some(address) || self.ep_out() == Some(address)
    }
}

#[derive(Debug)]
pub struct InstancePool<T, const N: usize> {
    slots: [T; N],
}

impl<T: Slot, const N: usize> InstancePool<T, N> {
    pub fn new() -> Self {
        InstancePool {
            slots: core::array::from_fn(|_| T::default()),
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Clears every slot. This is the only way an instance is released.
    pub fn reset(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = T::default());
    }

    /// First free slot. It stays free until the caller records an endpoint in it.
    pub fn acquire_free(&mut self) -> Option<&mut T> {
        self.slots.iter_mut().find(|slot| slot.is_free())
    }

    pub fn find_by_endpoint(&mut self, address: EndpointAddress) -> Option<&mut T> {
        self.slots.iter_mut().find(|slot| slot.owns(address))
    }

    pub fn find_by_interface(&mut self, interface: u8) -> Option<&mut T> {
        self.slots
            .iter_mut()
            .find(|slot| !slot.is_free() && slot.interface() == interface)
    }

    pub fn get_by_interface(&self, interface: u8) -> Option<&T> {
        self.slots
            .iter()
            .find(|slot| !slot.is_free() && slot.interface() == interface)
    }

    pub fn owns(&self, address: EndpointAddress) -> bool {
        self.slots.iter().any(|slot| slot.owns(address))
    }

    /// Whether `interface` on `port`, or any of `addresses`, already belongs to a bound slot.
    pub fn is_bound(
        &self,
        port: Port,
        interface: u8,
        mut addresses: impl Iterator<Item = EndpointAddress>,
    ) -> bool {
        self.slots
            .iter()
            .any(|slot| !slot.is_free() && slot.port() == port && slot.interface() == interface)
            || addresses.any(|address| self.owns(address))
    }

    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.is_free()).count()
    }
}

impl<T: Slot, const N: usize> Default for InstancePool<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
