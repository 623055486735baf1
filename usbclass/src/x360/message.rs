use super::{controls::X360Controls, TRANSFER_IN_BUFFER_SIZE};

/// First header byte of a message. OUT and IN messages have separate type spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageType {
    OutRumble,
    OutLed,
    InInput,
    InLed,
}

impl MessageType {
    pub const fn code(self) -> u8 {
        match self {
            MessageType::OutRumble | MessageType::InInput => 0x00,
            MessageType::OutLed | MessageType::InLed => 0x01,
        }
    }
}

pub const RUMBLE_LEN: usize = 8;
pub const LED_LEN: usize = 3;
pub const CONTROLS_LEN: usize = 2 + X360Controls::LEN;

const OUT_RUMBLE: u8 = MessageType::OutRumble.code();
const OUT_LED: u8 = MessageType::OutLed.code();

/// Animation of the ring around the home button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedAnimation {
    #[default]
    AllOff,
    AllBlinking,
    Slot1Flash,
    Slot2Flash,
    Slot3Flash,
    Slot4Flash,
    Slot1On,
    Slot2On,
    Slot3On,
    Slot4On,
    Rotating,
    BlinkingFast,
    BlinkingSlow,
    Alternating,
    Init,
    BlinkOnce,
    Unknown(u8),
}

impl From<u8> for LedAnimation {
    fn from(code: u8) -> Self {
        match code {
            0x00 => LedAnimation::AllOff,
            0x01 => LedAnimation::AllBlinking,
            0x02 => LedAnimation::Slot1Flash,
            0x03 => LedAnimation::Slot2Flash,
            0x04 => LedAnimation::Slot3Flash,
            0x05 => LedAnimation::Slot4Flash,
            0x06 => LedAnimation::Slot1On,
            0x07 => LedAnimation::Slot2On,
            0x08 => LedAnimation::Slot3On,
            0x09 => LedAnimation::Slot4On,
            0x0a => LedAnimation::Rotating,
            0x0b => LedAnimation::BlinkingFast,
            0x0c => LedAnimation::BlinkingSlow,
            0x0d => LedAnimation::Alternating,
            0x0e => LedAnimation::Init,
            0x0f => LedAnimation::BlinkOnce,
            code => LedAnimation::Unknown(code),
        }
    }
}

impl From<LedAnimation> for u8 {
    fn from(led: LedAnimation) -> Self {
        match led {
            LedAnimation::AllOff => 0x00,
            LedAnimation::AllBlinking => 0x01,
            LedAnimation::Slot1Flash => 0x02,
            LedAnimation::Slot2Flash => 0x03,
            LedAnimation::Slot3Flash => 0x04,
            LedAnimation::Slot4Flash => 0x05,
            LedAnimation::Slot1On => 0x06,
            LedAnimation::Slot2On => 0x07,
            LedAnimation::Slot3On => 0x08,
            LedAnimation::Slot4On => 0x09,
            LedAnimation::Rotating => 0x0a,
            LedAnimation::BlinkingFast => 0x0b,
            LedAnimation::BlinkingSlow => 0x0c,
            LedAnimation::Alternating => 0x0d,
            LedAnimation::Init => 0x0e,
            LedAnimation::BlinkOnce => 0x0f,
            LedAnimation::Unknown(code) => code,
        }
    }
}

/// A message received on the OUT endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutMessage {
    Rumble { left: u8, right: u8 },
    Led(LedAnimation),
}

impl OutMessage {
    /// Parses a complete transfer. The transfer length, the header type and the header length
    /// all have to agree.
    pub fn parse(data: &[u8]) -> Option<Self> {
        match *data {
            [OUT_RUMBLE, length, _, left, right, _, _, _] if usize::from(length) == RUMBLE_LEN => {
                Some(OutMessage::Rumble { left, right })
            }
            [OUT_LED, length, led] if usize::from(length) == LED_LEN => {
                Some(OutMessage::Led(LedAnimation::from(led)))
            }
            _ => None,
        }
    }
}

/// Reply to the rumble capability request: a rumble message carrying the supported motors.
pub fn rumble_capabilities(buffer: &mut [u8; TRANSFER_IN_BUFFER_SIZE], rumble: [u8; 2]) -> usize {
    buffer[..RUMBLE_LEN].copy_from_slice(&[
        OUT_RUMBLE,
        RUMBLE_LEN as u8,
        0x00,
        rumble[0],
        rumble[1],
        0x00,
        0x00,
        0x00,
    ]);
    RUMBLE_LEN
}

/// Frames a controls payload as an input message.
pub fn controls_message(
    buffer: &mut [u8; TRANSFER_IN_BUFFER_SIZE],
    payload: &[u8; X360Controls::LEN],
) -> usize {
    buffer[0] = MessageType::InInput.code();
    buffer[1] = CONTROLS_LEN as u8;
    buffer[2..CONTROLS_LEN].copy_from_slice(payload);
    CONTROLS_LEN
}
