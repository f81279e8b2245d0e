use std::env;

use crate::core::errors::ApiError;

pub const DEFAULT_CHUNK_SIZE: usize = 300;
pub const DEFAULT_CHUNK_OVERLAP: usize = 100;

const DEFAULT_API_BASE: &str = "https://api.openai.com";
const DEFAULT_EMBED_MODEL: &str = "text-embedding-3-small";
const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

/// Process-wide configuration, resolved once at startup and passed into
/// each component explicitly. Components never read the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub api_base: String,
    pub embed_model: String,
    pub chat_model: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Settings {
    /// Loads settings from the environment.
    ///
    /// A missing API key is fatal here, before any query can be attempted.
    pub fn from_env() -> Result<Self, ApiError> {
        let api_key = env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ApiError::Config("OPENAI_API_KEY environment variable is not set".to_string())
            })?;

        let api_base = env::var("DOCQA_API_BASE")
            .unwrap_or_else(|_| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        let embed_model =
            env::var("DOCQA_EMBED_MODEL").unwrap_or_else(|_| DEFAULT_EMBED_MODEL.to_string());
        let chat_model =
            env::var("DOCQA_CHAT_MODEL").unwrap_or_else(|_| DEFAULT_CHAT_MODEL.to_string());

        let chunk_size = parse_env_usize("DOCQA_CHUNK_SIZE", DEFAULT_CHUNK_SIZE)?;
        let chunk_overlap = parse_env_usize("DOCQA_CHUNK_OVERLAP", DEFAULT_CHUNK_OVERLAP)?;

        let settings = Settings {
            api_key,
            api_base,
            embed_model,
            chat_model,
            chunk_size,
            chunk_overlap,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.chunk_size == 0 {
            return Err(ApiError::Config(
                "DOCQA_CHUNK_SIZE must be greater than zero".to_string(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(ApiError::Config(format!(
                "DOCQA_CHUNK_OVERLAP ({}) must be smaller than DOCQA_CHUNK_SIZE ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

fn parse_env_usize(name: &str, default: usize) -> Result<usize, ApiError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<usize>()
            .map_err(|_| ApiError::Config(format!("{name} must be a positive integer, got {raw:?}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_settings() -> Settings {
        Settings {
            api_key: "test-key".to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            embed_model: DEFAULT_EMBED_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }

    #[test]
    fn default_chunking_is_valid() {
        assert!(base_settings().validate().is_ok());
    }

    #[test]
    fn overlap_must_stay_below_chunk_size() {
        let mut settings = base_settings();
        settings.chunk_overlap = settings.chunk_size;
        assert!(matches!(settings.validate(), Err(ApiError::Config(_))));

        settings.chunk_overlap = settings.chunk_size + 1;
        assert!(matches!(settings.validate(), Err(ApiError::Config(_))));
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let mut settings = base_settings();
        settings.chunk_size = 0;
        settings.chunk_overlap = 0;
        assert!(matches!(settings.validate(), Err(ApiError::Config(_))));
    }
}
