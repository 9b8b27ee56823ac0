/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

const CHANNEL_KEYWORDS: &[&str] = &[
    "channel_id",
    "channelid",
    "channelno",
    "channel",
    "channelname",
];

const KEYWORD_SEPARATORS: &[u8] = b"=_-:/";

/// A numeric token inside a route which may be incremented to get
/// neighbour routes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncrementalRoute {
    pub prefix: String,
    pub suffix: String,
    pub number: u64,
    /// Zero padding width, 0 if the token has no leading zero.
    pub width: usize,
    /// Found after a channel keyword.
    pub is_channel: bool,
}

impl IncrementalRoute {
    pub fn detect(route: &str) -> Option<Self> {
        if route.trim().is_empty() {
            return None;
        }
        if let Some(m) = detect_channel(route) {
            return Some(m);
        }
        detect_last_number(route)
    }

    pub fn build(&self, number: u64) -> String {
        format!(
            "{}{number:0width$}{}",
            self.prefix,
            self.suffix,
            width = self.width
        )
    }

    fn new(route: &str, start: usize, end: usize, number: u64, is_channel: bool) -> Self {
        let token = &route[start..end];
        let width = if token.len() > 1 && token.starts_with('0') {
            token.len()
        } else {
            0
        };
        IncrementalRoute {
            prefix: route[..start].to_string(),
            suffix: route[end..].to_string(),
            number,
            width,
            is_channel,
        }
    }
}

fn detect_channel(route: &str) -> Option<IncrementalRoute> {
    // ascii lowercase keeps the byte offsets
    let lower = route.to_ascii_lowercase();
    let bytes = route.as_bytes();

    for keyword in CHANNEL_KEYWORDS {
        let mut found = None;
        for (pos, _) in lower.match_indices(keyword) {
            // letters are skipped too, for plural forms like `Channels/101`
            let mut start = pos + keyword.len();
            while start < bytes.len() && skip_after_keyword(bytes[start]) {
                start += 1;
            }
            let end = digit_run_end(bytes, start);
            if end == start {
                continue;
            }
            if let Ok(number) = route[start..end].parse::<u64>() {
                found = Some((start, end, number));
            }
        }
        if let Some((start, end, number)) = found {
            return Some(IncrementalRoute::new(route, start, end, number, true));
        }
    }
    None
}

fn detect_last_number(route: &str) -> Option<IncrementalRoute> {
    let bytes = route.as_bytes();
    let mut end = bytes.len();
    while end > 0 {
        if !bytes[end - 1].is_ascii_digit() {
            end -= 1;
            continue;
        }
        let mut start = end;
        while start > 0 && bytes[start - 1].is_ascii_digit() {
            start -= 1;
        }
        if let Ok(number) = route[start..end].parse::<u64>() {
            return Some(IncrementalRoute::new(route, start, end, number, false));
        }
        end = start;
    }
    None
}

/// Any other byte, like the `&` or `;` parameter boundaries, ends the search.
fn skip_after_keyword(b: u8) -> bool {
    b.is_ascii_alphabetic() || KEYWORD_SEPARATORS.contains(&b)
}

fn digit_run_end(bytes: &[u8], start: usize) -> usize {
    let mut end = start;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    end
}
