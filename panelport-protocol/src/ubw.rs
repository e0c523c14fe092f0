//! USB Bit Whacker ASCII command set
//!
//! Every command is one text line of comma separated decimal arguments.
//! The line terminator and the acknowledgement behaviour depend on the
//! firmware revision, so encoding always takes a [`FirmwareVersion`].
//!
//! # Usage
//!
//! ```ignore
//! let version = FirmwareVersion::from_reply("UBW FW D Version 1.4.0");
//! let line = Command::Output { a: 0x0C, b: 0x3F, c: 0 }.encode(version)?;
//! serial.write_blocking(&line)?;
//! if version.acknowledges() { /* read "OK" */ }
//! ```

use core::fmt::Write;

use heapless::{String, Vec};

/// Longest command line this crate produces, terminator included
pub const MAX_LINE_LEN: usize = 128;

/// Data bytes carried by the first `BO` line of a bulk write (48 hex digits)
pub const FIRST_BULK_BYTES: usize = 24;

/// Data bytes carried by each following `BO` line (56 hex digits)
pub const BULK_BYTES: usize = 28;

/// Maximum analog channels reported by `A`
pub const MAX_ANALOG_CHANNELS: usize = 16;

/// Reply prefix of the version query
const VERSION_PREFIX: &str = "UBW FW D Version ";

/// Errors from encoding commands or decoding replies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UbwError {
    /// Command not implemented by this firmware revision
    Unsupported,
    /// Encoded line does not fit in [`MAX_LINE_LEN`]
    LineTooLong,
    /// Reply line could not be parsed
    InvalidReply,
}

/// Known firmware revisions ("D" series)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FirmwareVersion {
    D1_1,
    D1_2,
    D1_3,
    D1_4,
}

impl FirmwareVersion {
    /// Newest revision, assumed for unrecognised version strings
    pub const LATEST: FirmwareVersion = FirmwareVersion::D1_4;

    /// Identify the firmware from the reply to `V`
    pub fn from_reply(reply: &str) -> Self {
        match reply.trim().strip_prefix(VERSION_PREFIX) {
            Some("1.1.0") => FirmwareVersion::D1_1,
            Some("1.2.0") => FirmwareVersion::D1_2,
            Some("1.3.0") => FirmwareVersion::D1_3,
            _ => Self::LATEST,
        }
    }

    /// Line terminator the firmware expects
    pub const fn terminator(self) -> char {
        match self {
            FirmwareVersion::D1_2 => '\r',
            _ => '\n',
        }
    }

    /// Whether each command is answered with an `OK` line
    pub const fn acknowledges(self) -> bool {
        matches!(self, FirmwareVersion::D1_3 | FirmwareVersion::D1_4)
    }

    /// Whether `command` exists on this revision
    pub fn supports(self, command: &Command<'_>) -> bool {
        self >= command.min_version()
    }

    /// Version string as reported by the board
    pub const fn as_str(self) -> &'static str {
        match self {
            FirmwareVersion::D1_1 => "1.1.0",
            FirmwareVersion::D1_2 => "1.2.0",
            FirmwareVersion::D1_3 => "1.3.0",
            FirmwareVersion::D1_4 => "1.4.0",
        }
    }
}

/// Commands understood by the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// `R` - all pins to inputs, outputs cleared
    Reset,
    /// `V` - report firmware version
    Version,
    /// `C` - port directions (bit set = input) and analog channel count
    Configure {
        dir_a: u8,
        dir_b: u8,
        dir_c: u8,
        analog_inputs: u8,
    },
    /// `O` - write all three ports
    Output { a: u8, b: u8, c: u8 },
    /// `I` - read all three ports
    Input,
    /// `A` - sample the enabled analog inputs
    SampleAnalog,
    /// `MR` - read a PIC register
    MemoryRead { address: u16 },
    /// `MW` - write a PIC register
    MemoryWrite { address: u16, value: u8 },
    /// `PD` - single pin direction
    PinDirection { port: u8, pin: u8, input: bool },
    /// `PI` - read a single pin
    PinInput { port: u8, pin: u8 },
    /// `PO` - write a single pin
    PinOutput { port: u8, pin: u8, high: bool },
    /// `BC` - set up the bulk output strobe on port A
    BulkConfigure {
        init: u8,
        wait_mask: u8,
        wait_delay: u8,
        strobe_mask: u8,
        strobe_delay: u8,
    },
    /// `BO` - clock bytes out of port B, hex encoded on the wire
    BulkOutput(&'a [u8]),
}

impl Command<'_> {
    /// Oldest firmware revision implementing this command
    pub const fn min_version(&self) -> FirmwareVersion {
        match self {
            Command::Reset
            | Command::Version
            | Command::Configure { .. }
            | Command::Output { .. }
            | Command::Input => FirmwareVersion::D1_1,
            Command::SampleAnalog
            | Command::MemoryRead { .. }
            | Command::MemoryWrite { .. }
            | Command::PinDirection { .. }
            | Command::PinInput { .. }
            | Command::PinOutput { .. } => FirmwareVersion::D1_2,
            Command::BulkConfigure { .. } | Command::BulkOutput(_) => FirmwareVersion::D1_4,
        }
    }

    /// Whether an `OK` line follows on acknowledging firmware
    ///
    /// Query commands answer with their data line instead. `BO` is never
    /// acknowledged.
    pub const fn expects_ok(&self) -> bool {
        !matches!(
            self,
            Command::Version
                | Command::Input
                | Command::SampleAnalog
                | Command::MemoryRead { .. }
                | Command::PinInput { .. }
                | Command::BulkOutput(_)
        )
    }

    /// Encode for `version`, terminator included
    pub fn encode(&self, version: FirmwareVersion) -> Result<Vec<u8, MAX_LINE_LEN>, UbwError> {
        let mut line: String<MAX_LINE_LEN> = String::new();
        self.encode_into(version, &mut line)?;
        Vec::from_slice(line.as_bytes()).map_err(|_| UbwError::LineTooLong)
    }

    /// Append the encoded command to `line`
    pub fn encode_into<const N: usize>(
        &self,
        version: FirmwareVersion,
        line: &mut String<N>,
    ) -> Result<(), UbwError> {
        if !version.supports(self) {
            return Err(UbwError::Unsupported);
        }
        self.write_body(version, line)
            .and_then(|_| line.write_char(version.terminator()))
            .map_err(|_| UbwError::LineTooLong)
    }

    fn write_body<W: Write>(&self, version: FirmwareVersion, w: &mut W) -> core::fmt::Result {
        match *self {
            Command::Reset => w.write_str("R"),
            Command::Version => w.write_str("V"),
            Command::Configure {
                dir_a,
                dir_b,
                dir_c,
                analog_inputs,
            } => {
                // 1.1 has no analog inputs but insists on the field
                let analog = if version == FirmwareVersion::D1_1 {
                    0
                } else {
                    analog_inputs
                };
                write!(w, "C,{},{},{},{}", dir_a, dir_b, dir_c, analog)
            }
            Command::Output { a, b, c } => write!(w, "O,{},{},{}", a, b, c),
            Command::Input => w.write_str("I"),
            Command::SampleAnalog => w.write_str("A"),
            Command::MemoryRead { address } => write!(w, "MR,{}", address),
            Command::MemoryWrite { address, value } => write!(w, "MW,{},{}", address, value),
            Command::PinDirection { port, pin, input } => {
                write!(w, "PD,{},{},{}", port, pin, input as u8)
            }
            Command::PinInput { port, pin } => write!(w, "PI,{},{}", port, pin),
            Command::PinOutput { port, pin, high } => {
                write!(w, "PO,{},{},{}", port, pin, high as u8)
            }
            Command::BulkConfigure {
                init,
                wait_mask,
                wait_delay,
                strobe_mask,
                strobe_delay,
            } => write!(
                w,
                "BC,{},{},{},{},{}",
                init, wait_mask, wait_delay, strobe_mask, strobe_delay
            ),
            Command::BulkOutput(data) => {
                w.write_str("BO,")?;
                for byte in data {
                    write!(w, "{:02X}", byte)?;
                }
                Ok(())
            }
        }
    }
}

/// Split bulk data into the acknowledged first `BO` payload and the rest
///
/// The remainder is yielded in [`BULK_BYTES`] chunks.
pub fn split_bulk(data: &[u8]) -> (&[u8], core::slice::Chunks<'_, u8>) {
    let (first, rest) = data.split_at(data.len().min(FIRST_BULK_BYTES));
    (first, rest.chunks(BULK_BYTES))
}

/// Whether a reply line is the `OK` acknowledgement
pub fn is_ack(line: &str) -> bool {
    line.trim() == "OK"
}

/// Fields after the reply's leading tag
fn fields<'a>(line: &'a str, tag: &str) -> Result<core::str::Split<'a, char>, UbwError> {
    let mut parts = line.trim().split(',');
    match parts.next() {
        Some(t) if t == tag => Ok(parts),
        _ => Err(UbwError::InvalidReply),
    }
}

fn number<T: core::str::FromStr>(field: Option<&str>) -> Result<T, UbwError> {
    field
        .ok_or(UbwError::InvalidReply)?
        .trim()
        .parse()
        .map_err(|_| UbwError::InvalidReply)
}

/// Parse `I,a,b,c` into the three port values
pub fn parse_input(line: &str) -> Result<[u8; 3], UbwError> {
    let mut f = fields(line, "I")?;
    Ok([number(f.next())?, number(f.next())?, number(f.next())?])
}

/// Parse `A,v0,v1,...` into the analog readings
pub fn parse_analog(line: &str) -> Result<Vec<u16, MAX_ANALOG_CHANNELS>, UbwError> {
    let mut out = Vec::new();
    for field in fields(line, "A")?.filter(|f| !f.is_empty()) {
        out.push(number(Some(field))?)
            .map_err(|_| UbwError::InvalidReply)?;
    }
    Ok(out)
}

/// Parse `MR,addr,value` into `(address, value)`
pub fn parse_memory(line: &str) -> Result<(u16, u8), UbwError> {
    let mut f = fields(line, "MR")?;
    Ok((number(f.next())?, number(f.next())?))
}

/// Parse a `PI` reply; anything but `PI,1` reads as low
pub fn parse_pin(line: &str) -> bool {
    line.trim() == "PI,1"
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    fn text(v: &Vec<u8, MAX_LINE_LEN>) -> &str {
        core::str::from_utf8(v).unwrap()
    }

    #[test]
    fn test_version_detection() {
        assert_eq!(
            FirmwareVersion::from_reply("UBW FW D Version 1.1.0\r\n"),
            FirmwareVersion::D1_1
        );
        assert_eq!(
            FirmwareVersion::from_reply("UBW FW D Version 1.2.0"),
            FirmwareVersion::D1_2
        );
        assert_eq!(
            FirmwareVersion::from_reply("UBW FW D Version 1.3.0"),
            FirmwareVersion::D1_3
        );
        // Unknown strings assume the best case
        assert_eq!(
            FirmwareVersion::from_reply("UBW FW D Version 1.4.3"),
            FirmwareVersion::D1_4
        );
        assert_eq!(FirmwareVersion::from_reply(""), FirmwareVersion::D1_4);
    }

    #[test]
    fn test_terminators() {
        let reset = Command::Reset;
        assert_eq!(text(&reset.encode(FirmwareVersion::D1_1).unwrap()), "R\n");
        assert_eq!(text(&reset.encode(FirmwareVersion::D1_2).unwrap()), "R\r");
        assert_eq!(text(&reset.encode(FirmwareVersion::D1_3).unwrap()), "R\n");
        assert_eq!(text(&reset.encode(FirmwareVersion::D1_4).unwrap()), "R\n");
    }

    #[test]
    fn test_configure_analog_field() {
        let cmd = Command::Configure {
            dir_a: 0,
            dir_b: 255,
            dir_c: 3,
            analog_inputs: 2,
        };
        assert_eq!(
            text(&cmd.encode(FirmwareVersion::D1_1).unwrap()),
            "C,0,255,3,0\n"
        );
        assert_eq!(
            text(&cmd.encode(FirmwareVersion::D1_4).unwrap()),
            "C,0,255,3,2\n"
        );
    }

    #[test]
    fn test_command_availability() {
        let pin = Command::PinOutput {
            port: 0,
            pin: 3,
            high: true,
        };
        assert_eq!(
            pin.encode(FirmwareVersion::D1_1),
            Err(UbwError::Unsupported)
        );
        assert_eq!(text(&pin.encode(FirmwareVersion::D1_2).unwrap()), "PO,0,3,1\r");

        let bulk = Command::BulkOutput(&[0x12]);
        assert_eq!(
            bulk.encode(FirmwareVersion::D1_3),
            Err(UbwError::Unsupported)
        );
        assert!(FirmwareVersion::D1_4.supports(&bulk));
    }

    #[test]
    fn test_bulk_encoding() {
        let cfg = Command::BulkConfigure {
            init: 2,
            wait_mask: 0,
            wait_delay: 0,
            strobe_mask: 1,
            strobe_delay: 1,
        };
        assert_eq!(
            text(&cfg.encode(FirmwareVersion::D1_4).unwrap()),
            "BC,2,0,0,1,1\n"
        );
        let out = Command::BulkOutput(&[0x00, 0x0A, 0xFF]);
        assert_eq!(text(&out.encode(FirmwareVersion::D1_4).unwrap()), "BO,000AFF\n");
    }

    #[test]
    fn test_bulk_line_too_long() {
        let data = [0u8; 64];
        assert_eq!(
            Command::BulkOutput(&data).encode(FirmwareVersion::D1_4),
            Err(UbwError::LineTooLong)
        );
    }

    #[test]
    fn test_split_bulk() {
        let data: [u8; 100] = core::array::from_fn(|i| i as u8);
        let (first, rest) = split_bulk(&data);
        assert_eq!(first.len(), FIRST_BULK_BYTES);
        let lens: [usize; 3] = {
            let mut it = rest.map(|c| c.len());
            [it.next().unwrap(), it.next().unwrap(), it.next().unwrap()]
        };
        assert_eq!(lens, [28, 28, 20]);

        let (first, mut rest) = split_bulk(&data[..5]);
        assert_eq!(first, &data[..5]);
        assert!(rest.next().is_none());
    }

    #[test]
    fn test_expects_ok() {
        assert!(Command::Reset.expects_ok());
        assert!(Command::Output { a: 0, b: 0, c: 0 }.expects_ok());
        assert!(!Command::Version.expects_ok());
        assert!(!Command::Input.expects_ok());
        assert!(!Command::BulkOutput(&[]).expects_ok());
    }

    #[test]
    fn test_parse_replies() {
        assert_eq!(parse_input("I,12,0,255\r\n"), Ok([12, 0, 255]));
        assert_eq!(parse_input("I,12"), Err(UbwError::InvalidReply));
        assert_eq!(parse_input("OK"), Err(UbwError::InvalidReply));

        let analog = parse_analog("A,1023,0,512").unwrap();
        assert_eq!(analog.as_slice(), &[1023, 0, 512]);
        assert!(parse_analog("A").unwrap().is_empty());

        assert_eq!(parse_memory("MR,3968,170"), Ok((3968, 170)));

        assert!(parse_pin("PI,1"));
        assert!(!parse_pin("PI,0"));
        assert!(is_ack("OK\r"));
        assert!(!is_ack("!8 Err"));
    }

    proptest::proptest! {
        #[test]
        fn prop_bulk_chunks_cover_data(data in proptest::collection::vec(proptest::num::u8::ANY, 0..300)) {
            let (first, rest) = split_bulk(&data);
            let mut joined = std::vec::Vec::from(first);
            for chunk in rest {
                proptest::prop_assert!(chunk.len() <= BULK_BYTES);
                joined.extend_from_slice(chunk);
            }
            proptest::prop_assert_eq!(joined, data);
        }
    }
}
