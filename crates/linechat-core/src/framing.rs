//! Streaming line framing decoder
//!
//! The underlying transport has no message boundaries; the application-level
//! unit is a run of raw bytes terminated by an ASCII line feed (0x0A) or
//! carriage return (0x0D). [`FrameDecoder`] accumulates bytes across
//! arbitrarily split reads and emits one frame per delimiter, with the
//! delimiter byte included in the frame. This delimiter contract is fixed for
//! interoperability.

use crate::error::FramingError;

/// ASCII line feed
const LF: u8 = 0x0A;
/// ASCII carriage return
const CR: u8 = 0x0D;

// ----------------------------------------------------------------------------
// Frame Decoder
// ----------------------------------------------------------------------------

/// Stateful byte accumulator turning raw reads into delimited messages.
///
/// Owned exclusively by one session read loop; needs no locking of its own.
#[derive(Debug)]
pub struct FrameDecoder {
    buf: Vec<u8>,
    capacity: usize,
}

impl FrameDecoder {
    /// Create a decoder that accumulates at most `capacity` bytes per frame
    pub fn new(capacity: usize) -> Self {
        FrameDecoder {
            buf: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Consume one chunk of raw bytes, returning every frame it completes.
    ///
    /// A frame contains every byte accumulated since the previous frame,
    /// terminating delimiter included. Bytes after a delimiter within the
    /// same chunk begin the next frame, so splitting the input differently
    /// never changes the decoded result.
    ///
    /// # Errors
    /// [`FramingError::Overflow`] once a delimiter-free run exceeds the
    /// configured capacity. The accumulator is cleared; the caller is
    /// expected to tear the session down.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<Vec<u8>>, FramingError> {
        let mut frames = Vec::new();
        for &byte in chunk {
            self.buf.push(byte);
            if byte == LF || byte == CR {
                frames.push(std::mem::take(&mut self.buf));
            } else if self.buf.len() >= self.capacity {
                self.buf.clear();
                return Err(FramingError::Overflow {
                    capacity: self.capacity,
                });
            }
        }
        Ok(frames)
    }

    /// Number of bytes accumulated toward the next frame
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_frames_single_chunk() {
        let mut decoder = FrameDecoder::new(1024);
        let frames = decoder.feed(b"AB\nCDE\r").unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0], b"AB\n");
        assert_eq!(frames[1], b"CDE\r");
        assert_eq!(frames[0].len(), 3);
        assert_eq!(frames[1].len(), 4);
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn test_split_reads_do_not_change_result() {
        // Same input fed one byte at a time must yield the same two frames
        let mut decoder = FrameDecoder::new(1024);
        let mut frames = Vec::new();
        for &byte in b"AB\nCDE\r" {
            frames.extend(decoder.feed(&[byte]).unwrap());
        }
        assert_eq!(frames, vec![b"AB\n".to_vec(), b"CDE\r".to_vec()]);
    }

    #[test]
    fn test_partial_frame_stays_pending() {
        let mut decoder = FrameDecoder::new(1024);
        assert!(decoder.feed(b"hel").unwrap().is_empty());
        assert_eq!(decoder.pending(), 3);
        let frames = decoder.feed(b"lo\n").unwrap();
        assert_eq!(frames, vec![b"hello\n".to_vec()]);
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn test_delimiter_only_input() {
        let mut decoder = FrameDecoder::new(1024);
        let frames = decoder.feed(b"\n\r").unwrap();
        assert_eq!(frames, vec![b"\n".to_vec(), b"\r".to_vec()]);
    }

    #[test]
    fn test_overflow_is_an_error() {
        let mut decoder = FrameDecoder::new(8);
        let err = decoder.feed(b"way too long for eight").unwrap_err();
        assert_eq!(err, FramingError::Overflow { capacity: 8 });
        // Accumulator was cleared; the decoder is usable again
        assert_eq!(decoder.pending(), 0);
        assert_eq!(decoder.feed(b"ok\n").unwrap(), vec![b"ok\n".to_vec()]);
    }

    #[test]
    fn test_delimiter_at_capacity_is_not_overflow() {
        let mut decoder = FrameDecoder::new(4);
        let frames = decoder.feed(b"abc\n").unwrap();
        assert_eq!(frames, vec![b"abc\n".to_vec()]);
    }
}
