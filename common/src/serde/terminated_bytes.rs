//! Order-preserving encoding for variable-length byte strings.
//!
//! Each byte string is escaped and terminated with `0x00`:
//!
//! - `0x00` → `0x01 0x01`
//! - `0x01` → `0x01 0x02`
//! - All other bytes unchanged
//!
//! Since the terminator is the smallest possible byte, a string sorts before
//! every string it is a proper prefix of, so concatenating several terminated
//! components yields a key whose byte order equals the tuple order of the
//! components. Every key under a component prefix `p` falls in the half-open
//! range `[p 0x00, p 0x01)`.

use bytes::{BufMut, Bytes, BytesMut};

use crate::serde::DeserializeError;

const TERMINATOR: u8 = 0x00;
const ESCAPE: u8 = 0x01;

/// Appends the escaped, terminated form of `data` to `buf`.
pub fn serialize(data: &[u8], buf: &mut BytesMut) {
    buf.reserve(data.len() + 1);
    for &b in data {
        match b {
            0x00 => buf.put_slice(&[ESCAPE, 0x01]),
            0x01 => buf.put_slice(&[ESCAPE, 0x02]),
            other => buf.put_u8(other),
        }
    }
    buf.put_u8(TERMINATOR);
}

/// Reads one terminated byte string from the front of `buf`, advancing past
/// the terminator.
///
/// # Errors
///
/// Returns an error if the terminator is missing or an escape sequence is
/// truncated or unknown.
pub fn deserialize(buf: &mut &[u8]) -> Result<Bytes, DeserializeError> {
    let mut out = BytesMut::new();
    let mut i = 0;
    while i < buf.len() {
        match buf[i] {
            TERMINATOR => {
                *buf = &buf[i + 1..];
                return Ok(out.freeze());
            }
            ESCAPE => {
                let Some(&code) = buf.get(i + 1) else {
                    return Err(DeserializeError {
                        message: "truncated escape sequence".to_string(),
                    });
                };
                let decoded = match code {
                    0x01 => 0x00,
                    0x02 => 0x01,
                    other => {
                        return Err(DeserializeError {
                            message: format!("invalid escape code: 0x{:02x}", other),
                        });
                    }
                };
                out.put_u8(decoded);
                i += 2;
            }
            b => {
                out.put_u8(b);
                i += 1;
            }
        }
    }
    Err(DeserializeError {
        message: "missing terminator".to_string(),
    })
}
