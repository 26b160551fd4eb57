//! Byte accumulation
//!
//! Drains a resource stream into one contiguous buffer.

use std::io::{self, ErrorKind, Read};

/// Read size used by [`drain`]
pub const CHUNK_SIZE: usize = 1024;

/// Read `stream` to exhaustion and return its full contents.
///
/// The stream is consumed and dropped on every path. An I/O error mid-read
/// discards everything read so far.
pub fn drain<R: Read>(stream: R) -> io::Result<Vec<u8>> {
    drain_with_chunk_size(stream, CHUNK_SIZE)
}

/// [`drain`] with an explicit chunk size (clamped to at least 1 byte).
pub fn drain_with_chunk_size<R: Read>(mut stream: R, chunk_size: usize) -> io::Result<Vec<u8>> {
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut out = Vec::new();

    loop {
        match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => out.extend_from_slice(&buf[..n]),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(out)
}
