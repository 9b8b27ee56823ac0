/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use super::RtspLineParseError;

pub struct RtspHeaderLine<'a> {
    pub name: &'a str,
    pub value: &'a str,
}

impl<'a> RtspHeaderLine<'a> {
    pub fn parse(buf: &'a [u8]) -> Result<RtspHeaderLine<'a>, RtspLineParseError> {
        let line = std::str::from_utf8(buf)?;
        let Some(p) = memchr::memchr(b':', line.as_bytes()) else {
            return Err(RtspLineParseError::NoDelimiterFound(':'));
        };

        let name = line[0..p].trim();
        if name.is_empty() {
            return Err(RtspLineParseError::InvalidHeaderName);
        }
        let value = line[p + 1..].trim();

        Ok(RtspHeaderLine { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal() {
        let h = RtspHeaderLine::parse(b"WWW-Authenticate: Digest realm=\"x\", nonce=\"y\"\r\n")
            .unwrap();
        assert_eq!(h.name, "WWW-Authenticate");
        assert_eq!(h.value, "Digest realm=\"x\", nonce=\"y\"");
    }

    #[test]
    fn no_name() {
        let e = RtspHeaderLine::parse(b": value\r\n").err().unwrap();
        assert!(matches!(e, RtspLineParseError::InvalidHeaderName));
    }
}
