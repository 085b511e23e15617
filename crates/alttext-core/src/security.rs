use secrecy::SecretString;

/// Wraps an API key with secrecy protection (zeroized on drop, redacted in Debug).
#[derive(Clone)]
pub struct ApiKey(pub SecretString);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(SecretString::from(key.into()))
    }

    /// Read a key from the environment. Blank values count as absent.
    pub fn from_env(var: &str) -> Option<Self> {
        std::env::var(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(Self::new)
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}

/// Environment variable names.
pub mod env_vars {
    /// Default source of the bearer token.
    pub const GROQ_API_KEY: &str = "GROQ_API_KEY";
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn api_key_debug_redacted() {
        let key = ApiKey::new("gsk_12345");
        let debug = format!("{:?}", key);
        assert!(!debug.contains("gsk_"), "key leaked in debug: {debug}");
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn api_key_expose_secret() {
        let key = ApiKey::new("gsk_12345");
        assert_eq!(key.0.expose_secret(), "gsk_12345");
    }

    #[test]
    fn missing_env_var_is_none() {
        assert!(ApiKey::from_env("ALTTEXT_TEST_SURELY_UNSET_KEY").is_none());
    }
}
