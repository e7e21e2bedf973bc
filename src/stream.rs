//! Line framing for the raw sample byte stream.

use std::io::{BufRead, BufReader, Read};

/// Re-frames a raw byte stream into line-delimited records.
///
/// Yields one record per line with the terminator stripped (`\n`, plus a
/// trailing `\r` if the device sends CRLF). The sequence is lazy, ordered and
/// non-restartable; it ends on end-of-stream or on the first I/O error.
/// Errors never surface mid-iteration: after the iterator returns `None`,
/// [`RecordStream::take_error`] tells a clean end from a failed one.
pub struct RecordStream<R: Read> {
    reader: BufReader<R>,
    error: Option<std::io::Error>,
    done: bool,
}

impl<R: Read> RecordStream<R> {
    pub fn new(inner: R) -> Self {
        Self {
            reader: BufReader::new(inner),
            error: None,
            done: false,
        }
    }

    /// Error that ended the stream, if any. Meaningful once the iterator has
    /// returned `None`; a clean end-of-stream leaves this empty.
    pub fn take_error(&mut self) -> Option<std::io::Error> {
        self.error.take()
    }

    fn next_record(&mut self) -> Option<String> {
        if self.done {
            return None;
        }

        let mut buf = Vec::new();
        loop {
            match self.reader.read_until(b'\n', &mut buf) {
                Ok(_) if buf.last() == Some(&b'\n') => {
                    buf.pop();
                    if buf.last() == Some(&b'\r') {
                        buf.pop();
                    }
                    return Some(String::from_utf8_lossy(&buf).into_owned());
                }
                Ok(0) => {
                    // End-of-stream. A leftover partial line without its
                    // delimiter is not a complete record.
                    self.done = true;
                    if !buf.is_empty() {
                        log::debug!("Discarding {} unterminated trailing bytes", buf.len());
                    }
                    return None;
                }
                // Partial line within the port timeout; keep waiting for the
                // delimiter. `read_until` retains what it already read.
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {}
                Err(e) => {
                    self.done = true;
                    self.error = Some(e);
                    return None;
                }
            }
        }
    }
}

impl<R: Read> Iterator for RecordStream<R> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.next_record()
    }
}
