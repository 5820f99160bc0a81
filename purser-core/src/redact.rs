use std::io::{self, Read, Write};

use crate::types::SecretEntry;

/// Longest line the streaming redactor will buffer; past this the input is
/// treated as malformed (binary blobs, minified bundles).
pub const MAX_LINE_BYTES: usize = 10 * 1024 * 1024;

const COPY_CHUNK: usize = 64 * 1024;

/// Rewrites text so that no known secret value survives in it.
///
/// Construction takes a defensive copy of the entry list, drops entries
/// that were never found (their empty values are not redaction targets)
/// and sorts the rest by descending value length. Replacing longest-first
/// guarantees that when one secret's value is a strict substring of
/// another's, every full occurrence of the longer value is consumed before
/// the shorter one is matched, so no partial secret is left in clear text.
#[derive(Debug, Clone)]
pub struct Redactor {
    entries: Vec<SecretEntry>,
}

impl Redactor {
    pub fn new(entries: &[SecretEntry]) -> Self {
        let mut entries: Vec<SecretEntry> = entries
            .iter()
            .filter(|e| e.found && !e.value.is_empty())
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.value.len().cmp(&a.value.len()));
        Redactor { entries }
    }

    /// Replaces every occurrence of every secret value with its marker.
    pub fn redact(&self, text: &str) -> String {
        let mut out = text.to_string();
        for entry in &self.entries {
            out = out.replace(&entry.value, &entry.redact_with);
        }
        out
    }

    fn redact_bytes(&self, line: &[u8]) -> Vec<u8> {
        let mut out = line.to_vec();
        for entry in &self.entries {
            out = replace_all(&out, entry.value.as_bytes(), entry.redact_with.as_bytes());
        }
        out
    }

    /// Wraps `out` in a line-buffered redacting writer.
    pub fn writer<W: Write>(&self, out: W) -> RedactWriter<W> {
        RedactWriter {
            redactor: self.clone(),
            out,
            buf: Vec::new(),
            closed: false,
        }
    }

    /// Drives `reader` to end-of-stream through a redacting writer,
    /// closing it when the input is exhausted.
    pub fn redact_stream<R: Read, W: Write>(&self, reader: &mut R, out: W) -> io::Result<()> {
        let mut writer = self.writer(out);
        let mut chunk = [0u8; COPY_CHUNK];
        loop {
            let n = reader.read(&mut chunk)?;
            if n == 0 {
                break;
            }
            writer.write_all(&chunk[..n])?;
        }
        writer.close()
    }
}

fn replace_all(haystack: &[u8], needle: &[u8], replacement: &[u8]) -> Vec<u8> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return haystack.to_vec();
    }
    let mut out = Vec::with_capacity(haystack.len());
    let mut i = 0;
    while i < haystack.len() {
        if haystack[i..].starts_with(needle) {
            out.extend_from_slice(replacement);
            i += needle.len();
        } else {
            out.push(haystack[i]);
            i += 1;
        }
    }
    out
}

/// `Write` adapter that redacts line by line. A line is only emitted once
/// its delimiter arrives, so a secret split across `write` calls is still
/// caught. The final, possibly undelimited line is emitted by `close`,
/// which is idempotent; dropping the writer closes it best-effort.
pub struct RedactWriter<W: Write> {
    redactor: Redactor,
    out: W,
    buf: Vec<u8>,
    closed: bool,
}

impl<W: Write> RedactWriter<W> {
    pub fn close(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if !self.buf.is_empty() {
            let line = std::mem::take(&mut self.buf);
            let redacted = self.redactor.redact_bytes(&line);
            self.out.write_all(&redacted)?;
        }
        self.out.flush()
    }

    fn drain_complete_lines(&mut self) -> io::Result<()> {
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let rest = self.buf.split_off(pos + 1);
            let line = std::mem::replace(&mut self.buf, rest);
            let redacted = self.redactor.redact_bytes(&line);
            self.out.write_all(&redacted)?;
        }
        Ok(())
    }
}

impl<W: Write> Write for RedactWriter<W> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if self.closed {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "redacting writer is closed",
            ));
        }
        self.buf.extend_from_slice(data);
        self.drain_complete_lines()?;
        if self.buf.len() > MAX_LINE_BYTES {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "line exceeds maximum redactable length",
            ));
        }
        Ok(data.len())
    }

    // Complete lines are already flushed through; the partial tail stays
    // buffered until close so a split secret cannot leak.
    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

impl<W: Write> Drop for RedactWriter<W> {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
