//! `solaris providers` and `solaris models` commands.

use anyhow::{Context, Result};
use solaris::config::Config;
use solaris::providers::{models_for, ProviderRegistry};

/// Print providers that have credentials.
pub fn cmd_providers(config: &Config) -> Result<()> {
    let registry = ProviderRegistry::from_config(&config.providers)
        .context("Failed to build provider registry")?;
    let configured = registry.configured();
    if configured.is_empty() {
        println!("No providers configured. Set OPENAI_API_KEY or GEMINI_API_KEY.");
        return Ok(());
    }
    for provider in configured {
        println!("{provider}");
    }
    Ok(())
}

/// Print the static model list for a provider.
pub fn cmd_models(provider: &str) -> Result<()> {
    let models = models_for(provider);
    if models.is_empty() {
        println!("No models known for provider '{provider}'.");
    }
    for model in models {
        println!("{model}");
    }
    Ok(())
}
