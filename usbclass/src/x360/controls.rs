use core::ops::{BitOr, BitOrAssign};

/// Button bits in the order they appear on the wire, bit 0 first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Buttons(pub u16);

impl Buttons {
    pub const NONE: Buttons = Buttons(0);
    pub const UP: Buttons = Buttons(1 << 0);
    pub const DOWN: Buttons = Buttons(1 << 1);
    pub const LEFT: Buttons = Buttons(1 << 2);
    pub const RIGHT: Buttons = Buttons(1 << 3);
    pub const START: Buttons = Buttons(1 << 4);
    pub const BACK: Buttons = Buttons(1 << 5);
    pub const L3: Buttons = Buttons(1 << 6);
    pub const R3: Buttons = Buttons(1 << 7);
    pub const LB: Buttons = Buttons(1 << 8);
    pub const RB: Buttons = Buttons(1 << 9);
    pub const HOME: Buttons = Buttons(1 << 10);
    // bit 11 is reserved
    pub const A: Buttons = Buttons(1 << 12);
    pub const B: Buttons = Buttons(1 << 13);
    pub const X: Buttons = Buttons(1 << 14);
    pub const Y: Buttons = Buttons(1 << 15);

    pub const fn contains(self, other: Buttons) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Buttons {
    type Output = Buttons;

    fn bitor(self, rhs: Self) -> Self::Output {
        Buttons(self.0 | rhs.0)
    }
}

impl BitOrAssign for Buttons {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// State of the controller as carried by an input message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct X360Controls {
    pub buttons: Buttons,
    pub left_trigger: u8,
    pub right_trigger: u8,
    pub left_x: i16,
    pub left_y: i16,
    pub right_x: i16,
    pub right_y: i16,
}

impl X360Controls {
    /// Payload length, without the message header. The last 6 bytes are reserved.
    pub const LEN: usize = 18;

    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut buf = [0u8; Self::LEN];
        buf[0..2].copy_from_slice(&self.buttons.0.to_le_bytes());
        buf[2] = self.left_trigger;
        buf[3] = self.right_trigger;
        buf[4..6].copy_from_slice(&self.left_x.to_le_bytes());
        buf[6..8].copy_from_slice(&self.left_y.to_le_bytes());
        buf[8..10].copy_from_slice(&self.right_x.to_le_bytes());
        buf[10..12].copy_from_slice(&self.right_y.to_le_bytes());
        buf
    }
}
