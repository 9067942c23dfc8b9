//! Replies sent back to the conversation.
//!
//! `{nickname}` is left in place; the chat bridge on the other side of the
//! webhook replaces it with the addressee's display name.

pub const NICKNAME_PLACEHOLDER: &str = "{nickname}";

pub fn ask_for_text() -> String {
    "What text would you like to translate, @{nickname}?".to_string()
}

pub fn ask_for_destination() -> String {
    "To what language would you like that translated, @{nickname}?".to_string()
}

pub fn unknown_language(name: &str) -> String {
    format!("Sorry, I don't know what language {} is, @{{nickname}}.", name)
}

pub fn translated(translation: &str) -> String {
    format!("{}, @{{nickname}}", translation)
}

pub fn untranslatable() -> String {
    "Sorry {nickname}, I don't know how to translate that yet.".to_string()
}

pub fn service_unavailable() -> String {
    "Sorry {nickname}, the translation service is currently unavailable.".to_string()
}

/// Fills in the placeholder for front-ends that talk to us directly.
pub fn address(message: &str, nickname: &str) -> String {
    message.replace(NICKNAME_PLACEHOLDER, nickname)
}
