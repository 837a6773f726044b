//! IRC line framing.
//!
//! Bytes are accumulated as they are read from a connection, and complete lines are taken out
//! one by one.  Both "\r\n" and "\n" end a line.

/// Accumulation buffer of a connection's inbound bytes.
#[derive(Debug, Default)]
pub struct LineReader {
    buf: Vec<u8>,
}

impl LineReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends bytes read from the connection.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// The number of bytes waiting for the end of their line.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Takes the next complete, non-empty line out of the buffer, without its terminator.
    ///
    /// Returns `None` when no complete line is left.  Invalid UTF-8 sequences are replaced by
    /// U+FFFD.
    pub fn next_line(&mut self) -> Option<String> {
        loop {
            let end = memchr::memchr(b'\n', &self.buf)?;
            let line = trim_line(&self.buf[..end]);
            let line = if line.is_empty() {
                None
            } else {
                Some(String::from_utf8_lossy(line).into_owned())
            };
            self.buf.drain(..=end);
            if line.is_some() {
                return line;
            }
        }
    }
}

/// Removes the "\r" of "\r\n", then one stray "\r" left before it.
fn trim_line(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
