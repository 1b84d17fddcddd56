use super::ChatError;

pub const MAX_MESSAGE_CHARS: usize = 100_000;

/// Checks a user message before it is forwarded anywhere. The content itself is
/// never rewritten; trimming only decides emptiness.
pub fn validate_message(message: &str) -> Result<(), ChatError> {
    if message.trim().is_empty() {
        return Err(ChatError::Validation("Message cannot be empty".to_string()));
    }

    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ChatError::Validation(
            "Message is too long (max 100,000 characters)".to_string(),
        ));
    }

    Ok(())
}
