//! Per-connection request handling.
//!
//! A connection carries exactly one request/reply exchange: read one full
//! frame, compute, write one full reply, done. The stream is closed by the
//! caller dropping it, whether or not a reply was sent.

use crate::calc::calculate;
use crate::codec::{Frame, FRAME_LEN, STATUS_ERR, STATUS_OK};
use std::io::{self, ErrorKind, Read, Write};
use tracing::debug;

/// Read until `buf` is full. Retries on interruption; a clean peer close
/// ends the read early and the number of bytes actually read is returned.
pub fn read_full<R: Read>(stream: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match stream.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Write all of `buf`. Retries on interruption.
pub fn write_full<W: Write>(stream: &mut W, buf: &[u8]) -> io::Result<()> {
    let mut written = 0;
    while written < buf.len() {
        match stream.write(&buf[written..]) {
            Ok(0) => {
                return Err(io::Error::new(
                    ErrorKind::WriteZero,
                    "failed to write whole frame",
                ));
            }
            Ok(n) => written += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Serve one accepted connection.
///
/// A truncated request (fewer than [`FRAME_LEN`] bytes, including an
/// immediate close) is dropped without a reply. A peer that disappears
/// before the reply lands surfaces as a broken pipe and is tolerated.
pub fn handle<S: Read + Write>(stream: &mut S) -> io::Result<()> {
    let mut raw = [0u8; FRAME_LEN];
    let n = read_full(stream, &mut raw)?;
    if n < FRAME_LEN {
        debug!(bytes = n, "Short request, dropping");
        return Ok(());
    }

    let mut frame = Frame::decode(&raw);
    match calculate(frame.operand_a, frame.operand_b, frame.operator()) {
        Some(result) => {
            frame.result = result;
            frame.status = STATUS_OK;
        }
        None => frame.status = STATUS_ERR,
    }

    match write_full(stream, &frame.encode()) {
        Err(e) if e.kind() == ErrorKind::BrokenPipe => {
            debug!("Peer closed before reply could be written");
            Ok(())
        }
        other => other,
    }
}
