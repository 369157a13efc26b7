//! # Serialized-map decoder
//!
//! Decodes the tagged, length-prefixed serialization emitted by the lookup
//! endpoint's `php` output format:
//!
//! ```text
//! N;                      null
//! b:1;                    bool
//! i:-42;                  integer
//! d:37.4;                 float (also INF, -INF, NAN)
//! s:5:"hello";            string, length counted in bytes
//! a:2:{s:1:"k";i:1;i:0;N;} map of key/value pairs, arbitrarily nested
//! ```
//!
//! Strings are decoded to UTF-8 while parsing, so callers never see raw bytes.

use crate::error::DecodeError;

/// Deepest map nesting accepted; lookup payloads are one or two levels deep.
pub const MAX_DEPTH: usize = 32;

/// Map key. The format only allows integer or string keys.
#[derive(Debug, Clone, PartialEq)]
pub enum PhpKey {
    Int(i64),
    Str(String),
}

impl PhpKey {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PhpKey::Str(s) => Some(s.as_str()),
            PhpKey::Int(_) => None,
        }
    }
}

/// A decoded value. Map entries keep their wire order.
#[derive(Debug, Clone, PartialEq)]
pub enum PhpValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Map(Vec<(PhpKey, PhpValue)>),
}

impl PhpValue {
    /// Look up a string key in a map value.
    pub fn get(&self, key: &str) -> Option<&PhpValue> {
        match self {
            PhpValue::Map(entries) => entries
                .iter()
                .find(|(k, _)| k.as_str() == Some(key))
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// Textual view of scalar values; integers and floats are rendered.
    pub fn as_text(&self) -> Option<String> {
        match self {
            PhpValue::Str(s) => Some(s.clone()),
            PhpValue::Int(i) => Some(i.to_string()),
            PhpValue::Float(f) => Some(f.to_string()),
            _ => None,
        }
    }

    /// Numeric view; numeric strings are accepted.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PhpValue::Float(f) => Some(*f),
            PhpValue::Int(i) => Some(*i as f64),
            PhpValue::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Decode a complete payload. Only trailing ASCII whitespace may follow the root value.
pub fn from_bytes(input: &[u8]) -> Result<PhpValue, DecodeError> {
    let mut parser = Parser {
        input,
        pos: 0,
        depth: 0,
    };
    let value = parser.value()?;
    while parser.pos < input.len() && input[parser.pos].is_ascii_whitespace() {
        parser.pos += 1;
    }
    if parser.pos != input.len() {
        return Err(DecodeError::TrailingData { offset: parser.pos });
    }
    Ok(value)
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Result<u8, DecodeError> {
        self.input
            .get(self.pos)
            .copied()
            .ok_or(DecodeError::UnexpectedEnd { offset: self.pos })
    }

    fn bump(&mut self) -> Result<u8, DecodeError> {
        let b = self.peek()?;
        self.pos += 1;
        Ok(b)
    }

    fn expect(&mut self, byte: u8, expected: &'static str) -> Result<(), DecodeError> {
        let offset = self.pos;
        let found = self.bump()?;
        if found != byte {
            return Err(DecodeError::UnexpectedByte {
                offset,
                found: found as char,
                expected,
            });
        }
        Ok(())
    }

    /// Raw token up to (not including) `end`, which is consumed.
    fn until(&mut self, end: u8) -> Result<(usize, &'a str), DecodeError> {
        let input = self.input;
        let start = self.pos;
        let rel = input[start..]
            .iter()
            .position(|&b| b == end)
            .ok_or(DecodeError::UnexpectedEnd {
                offset: input.len(),
            })?;
        self.pos = start + rel + 1;
        let text = std::str::from_utf8(&input[start..start + rel])
            .map_err(|_| DecodeError::InvalidUtf8 { offset: start })?;
        Ok((start, text))
    }

    fn integer(&mut self, end: u8) -> Result<i64, DecodeError> {
        let (offset, text) = self.until(end)?;
        text.parse::<i64>().map_err(|_| DecodeError::InvalidNumber {
            offset,
            text: text.to_string(),
        })
    }

    fn length(&mut self) -> Result<usize, DecodeError> {
        let (offset, text) = self.until(b':')?;
        text.parse::<usize>().map_err(|_| DecodeError::InvalidNumber {
            offset,
            text: text.to_string(),
        })
    }

    fn value(&mut self) -> Result<PhpValue, DecodeError> {
        let offset = self.pos;
        let tag = self.bump()?;
        if tag == b'N' {
            self.expect(b';', "';' after null")?;
            return Ok(PhpValue::Null);
        }
        if !matches!(tag, b'b' | b'i' | b'd' | b's' | b'a') {
            return Err(DecodeError::UnsupportedTag {
                offset,
                tag: tag as char,
            });
        }
        self.expect(b':', "':' after type tag")?;
        match tag {
            b'b' => match self.integer(b';')? {
                0 => Ok(PhpValue::Bool(false)),
                1 => Ok(PhpValue::Bool(true)),
                other => Err(DecodeError::InvalidNumber {
                    offset: offset + 2,
                    text: other.to_string(),
                }),
            },
            b'i' => Ok(PhpValue::Int(self.integer(b';')?)),
            b'd' => self.float(),
            b's' => Ok(PhpValue::Str(self.string_body()?)),
            _ => self.map(),
        }
    }

    fn float(&mut self) -> Result<PhpValue, DecodeError> {
        let (offset, text) = self.until(b';')?;
        let parsed = match text {
            "INF" => Some(f64::INFINITY),
            "-INF" => Some(f64::NEG_INFINITY),
            "NAN" => Some(f64::NAN),
            other => other.parse::<f64>().ok(),
        };
        parsed
            .map(PhpValue::Float)
            .ok_or_else(|| DecodeError::InvalidNumber {
                offset,
                text: text.to_string(),
            })
    }

    /// `<len>:"<bytes>";` with the `s:` prefix already consumed.
    fn string_body(&mut self) -> Result<String, DecodeError> {
        let len = self.length()?;
        self.expect(b'"', "opening quote")?;
        let start = self.pos;
        let end = start
            .checked_add(len)
            .filter(|&end| end <= self.input.len())
            .ok_or(DecodeError::UnexpectedEnd {
                offset: self.input.len(),
            })?;
        let text = std::str::from_utf8(&self.input[start..end])
            .map_err(|_| DecodeError::InvalidUtf8 { offset: start })?
            .to_string();
        self.pos = end;
        self.expect(b'"', "closing quote")?;
        self.expect(b';', "';' after string")?;
        Ok(text)
    }

    /// `<count>:{...}` with the `a:` prefix already consumed.
    fn map(&mut self) -> Result<PhpValue, DecodeError> {
        if self.depth >= MAX_DEPTH {
            return Err(DecodeError::TooDeep { offset: self.pos });
        }
        self.depth += 1;
        let entries = self.map_entries();
        self.depth -= 1;
        entries.map(PhpValue::Map)
    }

    fn map_entries(&mut self) -> Result<Vec<(PhpKey, PhpValue)>, DecodeError> {
        let count = self.length()?;
        self.expect(b'{', "'{' opening map")?;
        // count comes from the wire; cap the preallocation
        let mut entries = Vec::with_capacity(count.min(64));
        for _ in 0..count {
            let key_offset = self.pos;
            let key = match self.value()? {
                PhpValue::Int(i) => PhpKey::Int(i),
                PhpValue::Str(s) => PhpKey::Str(s),
                _ => return Err(DecodeError::InvalidKey { offset: key_offset }),
            };
            let value = self.value()?;
            entries.push((key, value));
        }
        self.expect(b'}', "'}' closing map")?;
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_scalars() {
        assert_eq!(from_bytes(b"N;").unwrap(), PhpValue::Null);
        assert_eq!(from_bytes(b"b:1;").unwrap(), PhpValue::Bool(true));
        assert_eq!(from_bytes(b"i:-42;").unwrap(), PhpValue::Int(-42));
        assert_eq!(from_bytes(b"d:37.4056;").unwrap(), PhpValue::Float(37.4056));
        assert_eq!(
            from_bytes(b"s:5:\"hello\";").unwrap(),
            PhpValue::Str("hello".into())
        );
    }

    #[test]
    fn string_length_counts_bytes() {
        // "Zürich" is 7 bytes in UTF-8
        let v = from_bytes("s:7:\"Zürich\";".as_bytes()).unwrap();
        assert_eq!(v, PhpValue::Str("Zürich".into()));
    }

    #[test]
    fn string_may_contain_delimiters() {
        let v = from_bytes(b"s:7:\"a\";b:{c\";").unwrap();
        assert_eq!(v, PhpValue::Str("a\";b:{c".into()));
    }

    #[test]
    fn decodes_nested_maps() {
        let raw = b"a:2:{s:6:\"status\";s:7:\"success\";s:4:\"tags\";a:2:{i:0;s:1:\"x\";i:1;d:1.5;}}";
        let v = from_bytes(raw).unwrap();
        assert_eq!(v.get("status"), Some(&PhpValue::Str("success".into())));
        let tags = v.get("tags").unwrap();
        match tags {
            PhpValue::Map(entries) => {
                assert_eq!(entries.len(), 2);
                assert_eq!(entries[0].0, PhpKey::Int(0));
                assert_eq!(entries[1].1, PhpValue::Float(1.5));
            }
            other => panic!("expected map, got {other:?}"),
        }
    }

    #[test]
    fn rejects_truncated_string() {
        let err = from_bytes(b"s:10:\"short\";").unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedEnd { .. }));
    }

    #[test]
    fn rejects_invalid_utf8() {
        let err = from_bytes(b"s:2:\"\xff\xfe\";").unwrap_err();
        assert_eq!(err, DecodeError::InvalidUtf8 { offset: 5 });
    }

    #[test]
    fn rejects_trailing_garbage_and_json() {
        assert!(matches!(
            from_bytes(b"i:1;i:2;").unwrap_err(),
            DecodeError::TrailingData { offset: 4 }
        ));
        assert!(matches!(
            from_bytes(br#"{"status":"success"}"#).unwrap_err(),
            DecodeError::UnsupportedTag { offset: 0, tag: '{' }
        ));
    }

    #[test]
    fn rejects_map_count_mismatch() {
        let err = from_bytes(b"a:2:{i:0;N;}").unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedTag { tag: '}', .. }));
    }

    #[test]
    fn rejects_non_scalar_keys() {
        let err = from_bytes(b"a:1:{N;i:1;}").unwrap_err();
        assert_eq!(err, DecodeError::InvalidKey { offset: 5 });
    }

    fn nested(levels: usize) -> Vec<u8> {
        let mut raw = "a:1:{i:0;".repeat(levels);
        raw.push_str("N;");
        raw.push_str(&"}".repeat(levels));
        raw.into_bytes()
    }

    #[test]
    fn accepts_nesting_up_to_the_limit() {
        assert!(from_bytes(&nested(MAX_DEPTH)).is_ok());
    }

    #[test]
    fn rejects_runaway_nesting_without_overflowing() {
        let err = from_bytes(&nested(MAX_DEPTH + 1)).unwrap_err();
        assert_eq!(
            err,
            DecodeError::TooDeep {
                offset: MAX_DEPTH * 9 + 2
            }
        );
        assert!(matches!(
            from_bytes(&nested(500_000)).unwrap_err(),
            DecodeError::TooDeep { .. }
        ));
    }

    #[test]
    fn numeric_views() {
        assert_eq!(PhpValue::Int(3).as_f64(), Some(3.0));
        assert_eq!(PhpValue::Str(" -122.08 ".into()).as_f64(), Some(-122.08));
        assert_eq!(PhpValue::Null.as_f64(), None);
        assert_eq!(PhpValue::Int(15169).as_text().as_deref(), Some("15169"));
    }
}
