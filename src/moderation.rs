//! Chirp Moderation
//! Mission: Enforce the length limit and mask profanity before a chirp is stored

/// Maximum chirp length in characters
pub const MAX_CHIRP_LEN: usize = 140;

const MASK: &str = "****";

const PROFANE_WORDS: [&str; 6] = [
    "Kerfuffle", "kerfuffle", "Sharbert", "sharbert", "Fornax", "fornax",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModerationError {
    TooLong { len: usize },
}

impl std::fmt::Display for ModerationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModerationError::TooLong { .. } => write!(f, "Chirp is too long"),
        }
    }
}

impl std::error::Error for ModerationError {}

/// Validate a chirp body and return the masked text
pub fn validate_chirp(body: &str) -> Result<String, ModerationError> {
    let len = body.chars().count();
    if len > MAX_CHIRP_LEN {
        return Err(ModerationError::TooLong { len });
    }

    Ok(mask_profanity(body))
}

fn mask_profanity(body: &str) -> String {
    PROFANE_WORDS
        .iter()
        .fold(body.to_string(), |text, word| text.replace(word, MASK))
}
