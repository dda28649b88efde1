//! The percent-encoding dialect used by the delta and patch text formats.
//!
//! Payloads are encoded over their UTF-8 bytes with lower-case hex escapes,
//! then a fixed set of reserved characters is restored to literal form so
//! the output matches what other Diff/Match/Patch ports emit.  Decoding
//! reverses this; a literal `+` is re-escaped to `%2b` first so it survives
//! generic URL decoding rules.

use crate::errors::Error;

/// Characters emitted literally by [`encode`].
///
/// Alphanumerics plus the unreserved marks, plus the reserved set that is
/// unescaped after encoding (`! ~ ' ( ) ; / ? : @ & = + $ , #`).
fn is_literal(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
        || matches!(
            byte,
            b'-' | b'_'
                | b'.'
                | b'*'
                | b'!'
                | b'~'
                | b'\''
                | b'('
                | b')'
                | b';'
                | b'/'
                | b'?'
                | b':'
                | b'@'
                | b'&'
                | b'='
                | b'+'
                | b'$'
                | b','
                | b'#'
        )
}

/// Encodes a payload for inclusion in a delta or patch body.
pub fn encode(text: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(text.len());
    for byte in text.bytes() {
        if is_literal(byte) {
            out.push(byte as char);
        } else {
            out.push('%');
            out.push(HEX[(byte >> 4) as usize] as char);
            out.push(HEX[(byte & 0xf) as usize] as char);
        }
    }
    out
}

/// Decodes a delta or patch payload.
///
/// Accepts both hex cases in escapes.  Fails with
/// [`Error::InvalidInput`] on a truncated or non-hex escape, or when the
/// decoded bytes are not valid UTF-8.
pub fn decode(text: &str) -> Result<String, Error> {
    // A literal plus would fall prey to application/x-www-form-urlencoded
    // style decoders; canonicalize it to an escape before decoding.
    let text = text.replace('+', "%2b");
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes
                .get(i + 1..i + 3)
                .ok_or_else(|| Error::InvalidInput(format!("truncated escape in {text:?}")))?;
            let high = (hex[0] as char)
                .to_digit(16)
                .ok_or_else(|| Error::InvalidInput(format!("bad escape in {text:?}")))?;
            let low = (hex[1] as char)
                .to_digit(16)
                .ok_or_else(|| Error::InvalidInput(format!("bad escape in {text:?}")))?;
            out.push((high * 16 + low) as u8);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).map_err(|_| Error::InvalidInput(format!("non-utf8 payload in {text:?}")))
}

#[test]
fn test_encode() {
    assert_eq!(encode(" jumped over "), "%20jumped%20over%20");
    assert_eq!(encode("a/b?c=d&e#f"), "a/b?c=d&e#f");
    assert_eq!(encode("x\ny"), "x%0ay");
    assert_eq!(encode("\u{0680}"), "%da%80");
}

#[test]
fn test_decode() {
    assert_eq!(decode("%20jumped%20over%20").unwrap(), " jumped over ");
    assert_eq!(decode("a%2bb").unwrap(), "a+b");
    assert_eq!(decode("a+b").unwrap(), "a+b");
    assert_eq!(decode("%DA%80").unwrap(), "\u{0680}");
    assert!(decode("%zz").is_err());
    assert!(decode("tail%2").is_err());
    assert!(decode("%da").is_err());
}
