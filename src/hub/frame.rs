//! Relay frames: the unit the dealer sends and every client receives.

use axum::body::Bytes;
use axum::extract::ws::{Message, Utf8Bytes};

/// One data frame relayed from the dealer to the table clients.
///
/// The payload is opaque to the hub and is forwarded byte-for-byte with
/// its original type. Both variants are reference-counted, so cloning a
/// frame for each recipient never copies the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// UTF-8 text frame.
    Text(Utf8Bytes),
    /// Binary frame.
    Binary(Bytes),
}

/// Wire type of a [`Frame`], used in log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Text frame.
    Text,
    /// Binary frame.
    Binary,
}

impl FrameKind {
    /// Lowercase name of the frame type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Binary => "binary",
        }
    }
}

impl Frame {
    /// Extracts a relayable frame from an inbound message.
    ///
    /// Control messages (ping, pong, close) carry no game state and
    /// yield `None`.
    #[must_use]
    pub fn from_message(message: Message) -> Option<Self> {
        match message {
            Message::Text(text) => Some(Self::Text(text)),
            Message::Binary(data) => Some(Self::Binary(data)),
            Message::Ping(_) | Message::Pong(_) | Message::Close(_) => None,
        }
    }

    /// Returns the wire type of this frame.
    #[must_use]
    pub const fn kind(&self) -> FrameKind {
        match self {
            Self::Text(_) => FrameKind::Text,
            Self::Binary(_) => FrameKind::Binary,
        }
    }

    /// Payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Text(text) => text.as_str().len(),
            Self::Binary(data) => data.len(),
        }
    }

    /// Returns `true` if the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Frame> for Message {
    fn from(frame: Frame) -> Self {
        match frame {
            Frame::Text(text) => Self::Text(text),
            Frame::Binary(data) => Self::Binary(data),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn text_message_becomes_text_frame() {
        let Some(frame) = Frame::from_message(Message::text("state:X")) else {
            panic!("text should be relayable");
        };
        assert_eq!(frame.kind(), FrameKind::Text);
        assert_eq!(frame.len(), 7);
        assert_eq!(Message::from(frame), Message::text("state:X"));
    }

    #[test]
    fn binary_payload_is_kept_verbatim() {
        let Some(frame) = Frame::from_message(Message::binary(vec![0x01, 0x02])) else {
            panic!("binary should be relayable");
        };
        assert_eq!(frame.kind().as_str(), "binary");
        assert_eq!(frame, Frame::Binary(Bytes::from_static(&[0x01, 0x02])));
    }

    #[test]
    fn control_messages_are_not_relayed() {
        assert!(Frame::from_message(Message::Ping(Bytes::new())).is_none());
        assert!(Frame::from_message(Message::Pong(Bytes::new())).is_none());
        assert!(Frame::from_message(Message::Close(None)).is_none());
    }

    #[test]
    fn empty_binary_frame() {
        let frame = Frame::Binary(Bytes::new());
        assert!(frame.is_empty());
    }
}
