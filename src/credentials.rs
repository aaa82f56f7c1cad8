//! Credential resolution for the enrichment endpoint.
//!
//! Providers are injected rather than hardwired, and nothing is written
//! back into the process environment.

use anyhow::{anyhow, Context, Result};
use std::env;
use std::io::{self, BufRead, Write};

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

pub trait CredentialProvider {
    /// Produce an API key, or `None` when this provider has nothing to offer.
    fn api_key(&self) -> Result<Option<String>>;
}

/// Reads the key from a process environment variable.
pub struct EnvCredentials {
    var: String,
}

impl EnvCredentials {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new(API_KEY_VAR)
    }
}

impl CredentialProvider for EnvCredentials {
    fn api_key(&self) -> Result<Option<String>> {
        match env::var(&self.var) {
            Ok(value) if !value.trim().is_empty() => Ok(Some(value.trim().to_string())),
            _ => Ok(None),
        }
    }
}

/// Asks on the terminal when no other provider has the key.
pub struct PromptCredentials;

impl CredentialProvider for PromptCredentials {
    fn api_key(&self) -> Result<Option<String>> {
        eprint!("API key not found in the environment. Enter your API key: ");
        io::stderr().flush().context("flush credential prompt")?;
        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .context("read API key from stdin")?;
        let key = line.trim();
        if key.is_empty() {
            return Ok(None);
        }
        Ok(Some(key.to_string()))
    }
}

/// First provider with a key wins; all misses is fatal.
pub fn resolve_api_key(providers: &[&dyn CredentialProvider]) -> Result<String> {
    for provider in providers {
        if let Some(key) = provider.api_key()? {
            return Ok(key);
        }
    }
    Err(anyhow!("no credential provider produced an API key"))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Option<&'static str>);

    impl CredentialProvider for Fixed {
        fn api_key(&self) -> Result<Option<String>> {
            Ok(self.0.map(str::to_string))
        }
    }

    struct Failing;

    impl CredentialProvider for Failing {
        fn api_key(&self) -> Result<Option<String>> {
            Err(anyhow!("provider exploded"))
        }
    }

    #[test]
    fn first_provider_with_a_key_wins() {
        let key = resolve_api_key(&[&Fixed(None), &Fixed(Some("sk-test")), &Fixed(Some("later"))])
            .unwrap();
        assert_eq!(key, "sk-test");
    }

    #[test]
    fn exhausted_chain_is_an_error() {
        assert!(resolve_api_key(&[&Fixed(None), &Fixed(None)]).is_err());
    }

    #[test]
    fn provider_errors_propagate() {
        assert!(resolve_api_key(&[&Failing, &Fixed(Some("sk-test"))]).is_err());
    }
}
