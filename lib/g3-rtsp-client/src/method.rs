/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtspMethod(&'static str);

impl RtspMethod {
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for RtspMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

macro_rules! rtsp_methods {
    (
        $(
            $(#[$docs:meta])*
            ($konst:ident, $phrase:expr);
        )+
    ) => {
        impl RtspMethod {
        $(
            $(#[$docs])*
            pub const $konst: RtspMethod = RtspMethod($phrase);
        )+
        }
    };
}

rtsp_methods! {
    (OPTIONS, "OPTIONS");
    /// get the media description of the resource
    (DESCRIBE, "DESCRIBE");
    /// create a media session for a described stream
    (SETUP, "SETUP");
    (TEARDOWN, "TEARDOWN");
}
