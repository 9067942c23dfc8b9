use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Context that carries the translation slots from one turn to the next.
pub const TRANSLATE_CONTEXT: &str = "translate-text";
/// Number of turns the translation context survives without being rewritten.
pub const TRANSLATE_CONTEXT_LIFESPAN: u32 = 2;

pub type ContextParameters = Map<String, Value>;

/// Named, expiring conversation state. Owned by the surrounding session; the
/// handlers only read it and overwrite it.
pub trait ContextStore {
    fn get(&self, name: &str) -> Option<ContextParameters>;
    fn set(&mut self, name: &str, lifespan: u32, parameters: ContextParameters);
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContextEntry {
    pub lifespan: u32,
    pub parameters: ContextParameters,
}

/// Contexts of a single conversation.
///
/// Loaded from an inbound request (or kept across turns by a local session),
/// and remembers which contexts were written during the current turn so they
/// can be sent back to the caller.
#[derive(Debug, Clone, Default)]
pub struct SessionContexts {
    entries: BTreeMap<String, ContextEntry>,
    written: Vec<String>,
}

impl SessionContexts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a context that was active before this turn. Unlike
    /// [`ContextStore::set`] it is not reported as written.
    pub fn insert(&mut self, name: &str, lifespan: u32, parameters: ContextParameters) {
        self.entries.insert(
            context_short_name(name),
            ContextEntry {
                lifespan,
                parameters,
            },
        );
    }

    /// Starts a new turn: contexts whose lifespan ran out are dropped and the
    /// remaining ones lose one turn.
    pub fn begin_turn(&mut self) {
        self.written.clear();
        self.entries.retain(|_, entry| entry.lifespan > 0);
        for entry in self.entries.values_mut() {
            entry.lifespan -= 1;
        }
    }

    pub fn entry(&self, name: &str) -> Option<&ContextEntry> {
        self.entries.get(&context_short_name(name))
    }

    /// Contexts written during the current turn, in write order.
    pub fn written(&self) -> impl Iterator<Item = (&str, &ContextEntry)> {
        self.written.iter().filter_map(|name| {
            self.entries
                .get(name)
                .map(|entry| (name.as_str(), entry))
        })
    }
}

impl ContextStore for SessionContexts {
    fn get(&self, name: &str) -> Option<ContextParameters> {
        self.entry(name).map(|entry| entry.parameters.clone())
    }

    fn set(&mut self, name: &str, lifespan: u32, parameters: ContextParameters) {
        let name = context_short_name(name);
        if !self.written.contains(&name) {
            self.written.push(name.clone());
        }
        self.entries.insert(
            name,
            ContextEntry {
                lifespan,
                parameters,
            },
        );
    }
}

/// `projects/p/agent/sessions/s/contexts/Translate-Text` -> `translate-text`
pub fn context_short_name(name: &str) -> String {
    name.trim()
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_lowercase()
}
