/// Optional features of an [`super::X360Class`]. A feature left at `None` stalls the request
/// asking for it.
#[derive(Debug, Clone, Default)]
pub struct X360Config {
    /// Rumble motors reported to the rumble capability request.
    pub rumble: Option<[u8; 2]>,
    /// Controls payload reported to the input capability request.
    pub input: Option<[u8; 18]>,
    /// At most [`super::TRANSFER_IN_BUFFER_SIZE`] bytes.
    pub serial_number: Option<&'static str>,
}
