/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

pub struct MediaDescription {
    media: String,
    control: Option<String>,
}

impl MediaDescription {
    /// The media type, like video or audio.
    pub fn media(&self) -> &str {
        &self.media
    }

    pub fn control(&self) -> Option<&str> {
        self.control.as_deref()
    }
}

/// The parts of a session description needed to set up a stream.
#[derive(Default)]
pub struct SessionDescription {
    control: Option<String>,
    medias: Vec<MediaDescription>,
}

impl SessionDescription {
    pub fn parse(body: &[u8]) -> Self {
        let mut sd = SessionDescription::default();
        let content = String::from_utf8_lossy(body);
        for line in content.lines() {
            let line = line.trim();
            if let Some(m) = line.strip_prefix("m=") {
                let media = m.split_ascii_whitespace().next().unwrap_or_default();
                sd.medias.push(MediaDescription {
                    media: media.to_string(),
                    control: None,
                });
            } else if let Some(control) = line.strip_prefix("a=control:") {
                let control = Some(control.trim().to_string());
                match sd.medias.last_mut() {
                    Some(media) => media.control = control,
                    None => sd.control = control,
                }
            }
        }
        sd
    }

    pub fn control(&self) -> Option<&str> {
        self.control.as_deref()
    }

    pub fn medias(&self) -> &[MediaDescription] {
        &self.medias
    }
}
