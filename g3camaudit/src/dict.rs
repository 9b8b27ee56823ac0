/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::path::Path;

use anyhow::{Context, anyhow};
use serde::Deserialize;

const DEFAULT_CREDENTIALS: &str = include_str!("../dictionaries/credentials.json");
const DEFAULT_ROUTES: &str = include_str!("../dictionaries/routes");

/// Read-only word lists used by the attack.
pub trait Dictionary: Send + Sync {
    fn routes(&self) -> &[String];
    fn usernames(&self) -> &[String];
    fn passwords(&self) -> &[String];
}

#[derive(Deserialize)]
struct Credentials {
    #[serde(default)]
    usernames: Vec<String>,
    #[serde(default)]
    passwords: Vec<String>,
}

#[derive(Clone, Debug, Default)]
pub struct WordDictionary {
    routes: Vec<String>,
    usernames: Vec<String>,
    passwords: Vec<String>,
}

impl WordDictionary {
    pub fn new(routes: Vec<String>, usernames: Vec<String>, passwords: Vec<String>) -> Self {
        WordDictionary {
            routes,
            usernames,
            passwords,
        }
    }

    /// Load the dictionaries from the given files, or use the embedded ones.
    pub fn load(credentials: Option<&Path>, routes: Option<&Path>) -> anyhow::Result<Self> {
        let credentials = match credentials {
            Some(path) => {
                let content = std::fs::read_to_string(path).context(format!(
                    "failed to read credentials dictionary {}",
                    path.display()
                ))?;
                parse_credentials(&content)
                    .context(format!("invalid credentials dictionary {}", path.display()))?
            }
            None => parse_credentials(DEFAULT_CREDENTIALS)?,
        };
        let routes = match routes {
            Some(path) => {
                let content = std::fs::read_to_string(path).context(format!(
                    "failed to read routes dictionary {}",
                    path.display()
                ))?;
                parse_routes(&content)
            }
            None => parse_routes(DEFAULT_ROUTES),
        };

        Ok(WordDictionary {
            routes,
            usernames: credentials.usernames,
            passwords: credentials.passwords,
        })
    }
}

impl Dictionary for WordDictionary {
    fn routes(&self) -> &[String] {
        &self.routes
    }

    fn usernames(&self) -> &[String] {
        &self.usernames
    }

    fn passwords(&self) -> &[String] {
        &self.passwords
    }
}

fn parse_credentials(content: &str) -> anyhow::Result<Credentials> {
    if content.trim().is_empty() {
        return Err(anyhow!("credentials dictionary is empty"));
    }
    serde_json::from_str(content).map_err(|e| anyhow!("invalid json content: {e}"))
}

fn parse_routes(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.to_string())
        .collect()
}
