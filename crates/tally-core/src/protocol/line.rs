//! Newline-delimited JSON framing for `MetricDelta`.
//!
//! Encoding rules:
//! - exactly one record per line, terminated by `\n`;
//! - missing numeric fields decode as zero, a missing `endpoint` as the
//!   global scope; unknown fields are ignored.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{MetricsError, Result};
use crate::model::MetricDelta;

/// Line terminator.
pub const DELIMITER: u8 = b'\n';

/// Serialize `delta` into a single framed line (trailing `\n` included).
pub fn encode_line(delta: &MetricDelta) -> Result<Bytes> {
    let mut w = BytesMut::with_capacity(160).writer();
    serde_json::to_writer(&mut w, delta)
        .map_err(|e| MetricsError::Encode(format!("delta json: {e}")))?;
    let mut buf = w.into_inner();
    buf.put_u8(DELIMITER);
    Ok(buf.freeze())
}

/// Decode one line. Trailing `\n` / `\r\n` is tolerated.
pub fn decode_line(line: &[u8]) -> Result<MetricDelta> {
    let line = trim_line(line);
    if line.is_empty() {
        return Err(MetricsError::Decode("empty line".into()));
    }
    let delta: MetricDelta = serde_json::from_slice(line)
        .map_err(|e| MetricsError::Decode(format!("invalid delta json: {e}")))?;
    delta.validate()?;
    Ok(delta)
}

/// Strip the line terminator (`\n` or `\r\n`).
pub fn trim_line(mut line: &[u8]) -> &[u8] {
    if let [rest @ .., b'\n'] = line {
        line = rest;
    }
    if let [rest @ .., b'\r'] = line {
        line = rest;
    }
    line
}
