//! Parallel port abstractions
//!
//! A PC parallel port has eight data outputs, four control outputs and five
//! status inputs. Display modules are wired to it directly: the data pins
//! carry the command or pixel byte and the control pins become the chip's
//! write strobe, register select or chip enables.
//!
//! All levels in this module are logical pin levels (`true` = pin high).
//! The port hardware inverts Strobe, AutoFeed, Select and Busy; hiding that
//! is the implementation's job.

/// Control output lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ControlLine {
    /// /STROBE, DB-25 pin 1
    Strobe,
    /// /AUTOFD, DB-25 pin 14
    AutoFeed,
    /// /INIT, DB-25 pin 16
    InitOut,
    /// /SELECTIN, DB-25 pin 17
    Select,
}

impl ControlLine {
    /// All control lines in pin order
    pub const ALL: [ControlLine; 4] = [
        ControlLine::Strobe,
        ControlLine::AutoFeed,
        ControlLine::InitOut,
        ControlLine::Select,
    ];

    /// DB-25 connector pin number
    pub const fn pin(self) -> u8 {
        match self {
            ControlLine::Strobe => 1,
            ControlLine::AutoFeed => 14,
            ControlLine::InitOut => 16,
            ControlLine::Select => 17,
        }
    }

    /// Whether the port hardware inverts this line
    pub const fn hardware_inverted(self) -> bool {
        !matches!(self, ControlLine::InitOut)
    }
}

/// Status input lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StatusLine {
    /// BUSY, DB-25 pin 11
    Busy,
    /// /ACK, DB-25 pin 10
    Ack,
    /// PAPER OUT, DB-25 pin 12
    PaperOut,
    /// SELECT, DB-25 pin 13
    SelectIn,
    /// /ERROR, DB-25 pin 15
    Error,
}

impl StatusLine {
    /// DB-25 connector pin number
    pub const fn pin(self) -> u8 {
        match self {
            StatusLine::Busy => 11,
            StatusLine::Ack => 10,
            StatusLine::PaperOut => 12,
            StatusLine::SelectIn => 13,
            StatusLine::Error => 15,
        }
    }

    /// Whether the port hardware inverts this line
    pub const fn hardware_inverted(self) -> bool {
        matches!(self, StatusLine::Busy)
    }
}

/// PC parallel port
///
/// Implementations own the port exclusively for their lifetime.
pub trait ParallelPort {
    /// Error type for port operations
    type Error;

    /// Drive the eight data pins (2-9)
    fn write_data(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Drive one control pin to a logical level
    fn set_control(&mut self, line: ControlLine, high: bool) -> Result<(), Self::Error>;

    /// Read one status pin as a logical level
    fn status(&mut self, line: StatusLine) -> Result<bool, Self::Error>;

    /// Write a byte stream using the port driver's own handshake
    ///
    /// Each byte is latched with /STROBE and paced by BUSY, as a printer
    /// would be driven. Blocks until all bytes were accepted.
    fn write_stream(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Drive a control pin high
    fn set_high(&mut self, line: ControlLine) -> Result<(), Self::Error> {
        self.set_control(line, true)
    }

    /// Drive a control pin low
    fn set_low(&mut self, line: ControlLine) -> Result<(), Self::Error> {
        self.set_control(line, false)
    }
}

impl<T: ParallelPort + ?Sized> ParallelPort for &mut T {
    type Error = T::Error;

    fn write_data(&mut self, byte: u8) -> Result<(), Self::Error> {
        T::write_data(self, byte)
    }

    fn set_control(&mut self, line: ControlLine, high: bool) -> Result<(), Self::Error> {
        T::set_control(self, line, high)
    }

    fn status(&mut self, line: StatusLine) -> Result<bool, Self::Error> {
        T::status(self, line)
    }

    fn write_stream(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        T::write_stream(self, data)
    }
}
