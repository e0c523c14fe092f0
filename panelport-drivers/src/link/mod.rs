//! Byte links
//!
//! A [`ByteLink`](panelport_core::ByteLink) carries the command stream of a
//! panel that parses its own escape sequences. Which link a panel uses
//! depends only on how it is cabled:
//!
//! | Link              | Transport                                     |
//! |-------------------|-----------------------------------------------|
//! | [`HandshakeLink`] | parallel port, software strobe + BUSY polling |
//! | [`StreamLink`]    | parallel port, kernel compatibility mode      |
//! | [`SerialByteLink`]| RS-232 tty                                    |
//! | [`FtdiLink`]      | FT232R in asynchronous bit-bang mode          |

pub mod ftdi;
pub mod handshake;
pub mod serial;
pub mod stream;

pub use ftdi::FtdiLink;
pub use handshake::{HandshakeConfig, HandshakeLink};
pub use serial::SerialByteLink;
pub use stream::StreamLink;
