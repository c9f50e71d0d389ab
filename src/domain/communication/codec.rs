use bytes::BytesMut;
use std::io;
use tokio_util::codec::{Decoder, Encoder, LinesCodec, LinesCodecError};

use crate::config::MAX_LINE;
use crate::error::Error;

/// One decoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A line with its `\n` (or `\r\n`) stripped.
    Line(String),
    /// A line that is not UTF-8 or is longer than [`MAX_LINE`]. It has been skipped up to and
    /// including its newline, so the next frame starts on the following line.
    Unreadable,
}

/// Newline framing shared by clients, the controller and airport nodes.
///
/// Lines are encoded from `String`s and terminated by `\n`.
pub struct LineCodec {
    codec: LinesCodec,
}

impl LineCodec {
    pub fn new() -> Self {
        Self { codec: LinesCodec::new_with_max_length(MAX_LINE) }
    }

    fn frame(result: Result<Option<String>, LinesCodecError>) -> Result<Option<Frame>, Error> {
        match result {
            Ok(line) => Ok(line.map(Frame::Line)),
            Err(LinesCodecError::MaxLineLengthExceeded) => {
                log::debug!("Skipping line longer than {} bytes.", MAX_LINE);
                Ok(Some(Frame::Unreadable))
            }
            Err(LinesCodecError::Io(e)) if e.kind() == io::ErrorKind::InvalidData => {
                log::debug!("Skipping line that is not UTF-8.");
                Ok(Some(Frame::Unreadable))
            }
            Err(e) => Err(Error::from(e)),
        }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder<String> for LineCodec {
    type Error = Error;

    fn encode(&mut self, item: String, dst: &mut BytesMut) -> Result<(), Self::Error> {
        self.codec.encode(item, dst).map_err(Error::from)
    }
}

impl Decoder for LineCodec {
    type Item = Frame;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        Self::frame(self.codec.decode(src))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        Self::frame(self.codec.decode_eof(src))
    }
}
