use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::warn;

/// Human-readable language names accepted from the conversation, mapped to the
/// codes the translation backend understands. Keys are stored lowercase.
#[derive(Debug, Clone)]
pub struct LanguageMapping {
    codes: HashMap<String, String>,
}

impl LanguageMapping {
    pub fn load() -> Result<Self> {
        let raw = include_str!("names.json");
        let parsed: NameData =
            serde_json::from_str(raw).with_context(|| "failed to parse language name data")?;
        let codes = parsed
            .names
            .into_iter()
            .map(|(name, code)| (normalize_name(&name), code))
            .collect();
        Ok(LanguageMapping { codes })
    }

    /// Appends extra names. Built-in names are never replaced.
    pub fn with_aliases(mut self, aliases: &HashMap<String, String>) -> Self {
        for (name, code) in aliases {
            let name = normalize_name(name);
            let code = code.trim();
            if name.is_empty() || code.is_empty() {
                continue;
            }
            if let Some(existing) = self.codes.get(&name) {
                if existing != code {
                    warn!(
                        "ignoring language alias '{}' = '{}' (already mapped to '{}')",
                        name, code, existing
                    );
                }
                continue;
            }
            self.codes.insert(name, code.to_string());
        }
        self
    }

    pub fn code_for(&self, name: &str) -> Option<&str> {
        self.codes.get(&normalize_name(name)).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.codes.contains_key(&normalize_name(name))
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// All `(name, code)` pairs sorted by name.
    pub fn entries(&self) -> Vec<(&str, &str)> {
        let mut entries = self
            .codes
            .iter()
            .map(|(name, code)| (name.as_str(), code.as_str()))
            .collect::<Vec<_>>();
        entries.sort();
        entries
    }
}

pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(Debug, Deserialize)]
struct NameData {
    names: HashMap<String, String>,
}
