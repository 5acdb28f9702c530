// TabRescue - core/reader.rs
//
// Forward-only cursor over an in-memory byte buffer, providing the primitive
// reads shared by the session decoders: little-endian integers and
// length-prefixed strings/bytes padded to a 4-byte boundary.
//
// Every read that would run past the end of the buffer fails with a
// `ShortRead` carrying the offset and byte counts; there is no silent
// truncation. Decoders wrap these with file-level context.

use crate::util::error::ShortRead;

/// Cursor over one record's payload (or a whole file for header fields).
#[derive(Debug)]
pub struct PayloadCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> PayloadCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current offset from the start of the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Consume exactly `n` bytes, or fail without advancing.
    fn take(&mut self, n: usize) -> Result<&'a [u8], ShortRead> {
        if self.remaining() < n {
            return Err(ShortRead {
                offset: self.pos,
                needed: n,
                available: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Consume exactly `n` raw bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], ShortRead> {
        self.take(n)
    }

    pub fn read_u8(&mut self) -> Result<u8, ShortRead> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, ShortRead> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32, ShortRead> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_u64(&mut self) -> Result<u64, ShortRead> {
        let bytes = self.take(8)?;
        let mut arr = [0u8; 8];
        arr.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(arr))
    }

    /// Length-prefixed raw bytes: u32 length, then that many bytes, then
    /// zero-padding up to the next 4-byte boundary.
    pub fn read_length_prefixed_bytes(&mut self) -> Result<&'a [u8], ShortRead> {
        let len = self.read_u32()? as usize;
        let bytes = self.take(len)?;
        self.skip_padding(len)?;
        Ok(bytes)
    }

    /// Length-prefixed UTF-8 string with the same framing as
    /// [`read_length_prefixed_bytes`]. Invalid sequences are replaced, never
    /// rejected.
    ///
    /// [`read_length_prefixed_bytes`]: Self::read_length_prefixed_bytes
    pub fn read_length_prefixed_utf8(&mut self) -> Result<String, ShortRead> {
        let bytes = self.read_length_prefixed_bytes()?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Length-prefixed UTF-16LE string. The prefix counts *characters*, so
    /// twice that many bytes are consumed, and the padding is computed from
    /// the byte length. Invalid code units are replaced, never rejected.
    pub fn read_length_prefixed_utf16(&mut self) -> Result<String, ShortRead> {
        let chars = self.read_u32()? as usize;
        let byte_len = chars.saturating_mul(2);
        let bytes = self.take(byte_len)?;
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        self.skip_padding(byte_len)?;
        Ok(String::from_utf16_lossy(&units))
    }

    /// Skip the zero-padding that follows a field of `len` bytes.
    fn skip_padding(&mut self, len: usize) -> Result<(), ShortRead> {
        let pad = (4 - len % 4) % 4;
        self.take(pad)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a length-prefixed field: u32 length, content, zero padding.
    fn framed(content: &[u8]) -> Vec<u8> {
        let mut out = (content.len() as u32).to_le_bytes().to_vec();
        out.extend_from_slice(content);
        out.resize(out.len() + (4 - content.len() % 4) % 4, 0);
        out
    }

    #[test]
    fn reads_little_endian_integers() {
        let buf = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        let mut cur = PayloadCursor::new(&buf);
        assert_eq!(cur.read_u8().unwrap(), 0x01);
        assert_eq!(cur.read_u16().unwrap(), 0x0302);
        assert_eq!(cur.read_u32().unwrap(), 0x07060504);
        assert_eq!(cur.remaining(), 1);
    }

    #[test]
    fn read_past_end_reports_offsets() {
        let buf = [0xAA, 0xBB];
        let mut cur = PayloadCursor::new(&buf);
        cur.read_u8().unwrap();
        let err = cur.read_u32().unwrap_err();
        assert_eq!(
            err,
            ShortRead {
                offset: 1,
                needed: 4,
                available: 1,
            }
        );
        // A failed read does not advance the cursor.
        assert_eq!(cur.position(), 1);
    }

    #[test]
    fn three_byte_string_has_one_padding_byte() {
        let mut buf = framed(b"abc");
        assert_eq!(buf.len(), 4 + 3 + 1);
        buf.extend_from_slice(&[0xFF]); // sentinel after the field
        let mut cur = PayloadCursor::new(&buf);
        assert_eq!(cur.read_length_prefixed_utf8().unwrap(), "abc");
        assert_eq!(cur.read_u8().unwrap(), 0xFF);
    }

    #[test]
    fn four_byte_string_has_no_padding() {
        let buf = framed(b"abcd");
        assert_eq!(buf.len(), 4 + 4);
        let mut cur = PayloadCursor::new(&buf);
        assert_eq!(cur.read_length_prefixed_utf8().unwrap(), "abcd");
        assert_eq!(cur.remaining(), 0);
    }

    #[test]
    fn five_byte_string_has_three_padding_bytes() {
        let buf = framed(b"abcde");
        assert_eq!(buf.len(), 4 + 5 + 3);
        let mut cur = PayloadCursor::new(&buf);
        assert_eq!(cur.read_length_prefixed_utf8().unwrap(), "abcde");
        assert_eq!(cur.remaining(), 0);
    }

    #[test]
    fn missing_padding_is_an_error() {
        let mut buf = (3u32).to_le_bytes().to_vec();
        buf.extend_from_slice(b"abc"); // no padding byte present
        let mut cur = PayloadCursor::new(&buf);
        assert!(cur.read_length_prefixed_utf8().is_err());
    }

    #[test]
    fn utf8_invalid_sequences_are_replaced() {
        let buf = framed(&[0x61, 0xFF, 0x62]);
        let mut cur = PayloadCursor::new(&buf);
        let s = cur.read_length_prefixed_utf8().unwrap();
        assert_eq!(s, "a\u{FFFD}b");
    }

    #[test]
    fn utf16_prefix_counts_characters_not_bytes() {
        // "héllo" = 5 characters, 10 bytes, followed by 2 padding bytes.
        let text: Vec<u8> = "héllo".encode_utf16().flat_map(u16::to_le_bytes).collect();
        let mut buf = (5u32).to_le_bytes().to_vec();
        buf.extend_from_slice(&text);
        buf.extend_from_slice(&[0, 0]); // (4 - 10 % 4) % 4 == 2
        buf.extend_from_slice(&[0x2A]); // sentinel
        let mut cur = PayloadCursor::new(&buf);
        assert_eq!(cur.read_length_prefixed_utf16().unwrap(), "héllo");
        assert_eq!(cur.read_u8().unwrap(), 0x2A);
    }

    #[test]
    fn utf16_two_characters_need_no_padding() {
        let text: Vec<u8> = "ab".encode_utf16().flat_map(u16::to_le_bytes).collect();
        let mut buf = (2u32).to_le_bytes().to_vec();
        buf.extend_from_slice(&text);
        let mut cur = PayloadCursor::new(&buf);
        assert_eq!(cur.read_length_prefixed_utf16().unwrap(), "ab");
        assert_eq!(cur.remaining(), 0);
    }

    #[test]
    fn bytes_field_roundtrip() {
        let buf = framed(&[1, 2, 3, 4, 5, 6]);
        let mut cur = PayloadCursor::new(&buf);
        assert_eq!(cur.read_length_prefixed_bytes().unwrap(), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(cur.remaining(), 0);
    }
}
