//! UART serial communication abstractions
//!
//! Serial VFDs take their command stream over RS-232, and the USB Bit
//! Whacker enumerates as a CDC serial device, so both ride on these traits.

/// UART transmitter
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Write data to the UART
    ///
    /// Blocks until all data has been written or an error occurs.
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// UART receiver
pub trait UartRx {
    /// Error type for receive operations
    type Error;

    /// Read data from the UART
    ///
    /// Blocks until at least one byte is available, the read timeout
    /// expires, or an error occurs. Returns the number of bytes read.
    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Discard any bytes already received
    fn clear_input(&mut self) -> Result<(), Self::Error>;

    /// Read a single byte from the UART
    ///
    /// Returns `Ok(None)` when the read timed out.
    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        let mut buf = [0u8; 1];
        let n = self.read_blocking(&mut buf)?;
        Ok(if n == 0 { None } else { Some(buf[0]) })
    }

    /// Read one line, terminated by `\n`, into `buf`
    ///
    /// Returns the line length with the terminator and any trailing `\r`
    /// stripped. Bytes past the end of `buf` are dropped. Stops early when
    /// a read times out.
    fn read_line(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut len = 0;
        while let Some(byte) = self.read_byte()? {
            if byte == b'\n' {
                break;
            }
            if len < buf.len() {
                buf[len] = byte;
                len += 1;
            }
        }
        while len > 0 && buf[len - 1] == b'\r' {
            len -= 1;
        }
        Ok(len)
    }
}

/// Combined UART interface
///
/// For UARTs that provide both TX and RX on a single device.
pub trait Uart: UartTx + UartRx {}

// Blanket implementation
impl<T: UartTx + UartRx> Uart for T {}

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
    /// Hardware handshake
    pub handshake: Handshake,
    /// Write timeout in milliseconds
    pub write_timeout_ms: u32,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baudrate: 38400,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            handshake: Handshake::None,
            write_timeout_ms: 1000,
        }
    }
}

impl UartConfig {
    /// Configuration with a given baud rate and otherwise default framing
    pub const fn with_baudrate(baudrate: u32) -> Self {
        Self {
            baudrate,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            handshake: Handshake::None,
            write_timeout_ms: 1000,
        }
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}

/// Hardware handshake mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Handshake {
    None,
    /// DTR/DSR handshake (GU3900 serial boards)
    DtrDsr,
    /// RTS/CTS handshake
    RtsCts,
}
