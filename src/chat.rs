//! Local multi-turn conversation against the translate action, with contexts
//! kept in memory and expired by turn count.

use anyhow::{Result, anyhow};

use crate::backend::TranslationBackend;
use crate::context::SessionContexts;
use crate::fulfillment::{Fulfillment, TRANSLATE_TEXT_ACTION};
use crate::resolver::TurnParameters;

const FIELD_KEYS: &[&str] = &["text", "lang-to", "lang-from"];

pub struct ChatSession<B: TranslationBackend> {
    fulfillment: Fulfillment<B>,
    contexts: SessionContexts,
    turns: usize,
}

impl<B: TranslationBackend> ChatSession<B> {
    pub fn new(fulfillment: Fulfillment<B>) -> Self {
        Self {
            fulfillment,
            contexts: SessionContexts::new(),
            turns: 0,
        }
    }

    pub fn fulfillment(&self) -> &Fulfillment<B> {
        &self.fulfillment
    }

    pub fn contexts(&self) -> &SessionContexts {
        &self.contexts
    }

    pub async fn turn(&mut self, line: &str) -> Result<Vec<String>> {
        let parameters = parse_turn(line)?;
        if self.turns > 0 {
            self.contexts.begin_turn();
        }
        self.turns += 1;
        let replies = self
            .fulfillment
            .handle(TRANSLATE_TEXT_ACTION, &parameters, &mut self.contexts)
            .await?;
        Ok(replies)
    }
}

/// Parses `text=good morning lang-to=dutch` style input. Words before the
/// first `key=` belong to `text`; a value runs until the next known key.
pub fn parse_turn(line: &str) -> Result<TurnParameters> {
    let mut parameters = TurnParameters::default();
    let mut current = "text";
    let mut words: Vec<&str> = Vec::new();

    for word in line.split_whitespace() {
        if let Some((key, value)) = word.split_once('=') {
            if let Some(field) = FIELD_KEYS.iter().find(|candidate| **candidate == key) {
                assign(&mut parameters, current, &words)?;
                current = *field;
                words.clear();
                if !value.is_empty() {
                    words.push(value);
                }
                continue;
            }
        }
        words.push(word);
    }
    assign(&mut parameters, current, &words)?;
    Ok(parameters)
}

fn assign(parameters: &mut TurnParameters, key: &str, words: &[&str]) -> Result<()> {
    if words.is_empty() {
        return Ok(());
    }
    let value = Some(words.join(" "));
    let slot = match key {
        "text" => &mut parameters.text,
        "lang-to" => &mut parameters.destination_language,
        "lang-from" => &mut parameters.source_language,
        _ => return Err(anyhow!("unknown field: {}", key)),
    };
    if slot.is_some() {
        return Err(anyhow!("{} given more than once", key));
    }
    *slot = value;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ContextStore, TRANSLATE_CONTEXT};
    use crate::languages::LanguageMapping;
    use crate::translator::tests::TestBackend;

    #[test]
    fn parses_keyed_fields_with_spaces() {
        let parsed = parse_turn("text=good morning lang-to=dutch lang-from=english").unwrap();
        assert_eq!(parsed.text.as_deref(), Some("good morning"));
        assert_eq!(parsed.destination_language.as_deref(), Some("dutch"));
        assert_eq!(parsed.source_language.as_deref(), Some("english"));
    }

    #[test]
    fn leading_words_are_text() {
        let parsed = parse_turn("x=1 is not a key lang-to=french").unwrap();
        assert_eq!(parsed.text.as_deref(), Some("x=1 is not a key"));
        assert_eq!(parsed.destination_language.as_deref(), Some("french"));
    }

    #[test]
    fn repeated_field_is_rejected() {
        assert!(parse_turn("hello text=again").is_err());
        assert_eq!(parse_turn("").unwrap(), TurnParameters::default());
    }

    #[tokio::test]
    async fn session_carries_slots_between_turns() {
        let backend = TestBackend::replying("hallo");
        let fulfillment = Fulfillment::new(LanguageMapping::load().unwrap(), backend.clone());
        let mut session = ChatSession::new(fulfillment);

        let first = session.turn("lang-to=dutch").await.unwrap();
        assert_eq!(
            first,
            vec!["What text would you like to translate, @{nickname}?".to_string()]
        );
        let second = session.turn("hello").await.unwrap();
        assert_eq!(second, vec!["hallo, @{nickname}".to_string()]);
        assert_eq!(backend.calls().len(), 1);
        assert!(session.contexts().get(TRANSLATE_CONTEXT).is_some());
    }
}
