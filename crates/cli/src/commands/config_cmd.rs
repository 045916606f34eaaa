//! `synapse config` — Configuration management commands.

use synapse_config::AppConfig;

const REDACTED: &str = "[REDACTED]";

pub async fn validate() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration...");

    match AppConfig::load() {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");

            let warnings = warnings(&config);
            if warnings.is_empty() {
                println!("   ✅ All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   ⚠️  {w}");
                }
            }

            println!();
            println!("   Provider:   {}", config.default_provider);
            println!("   Model:      {}", config.default_model);
            println!("   Max steps:  {}", config.runner.max_steps);
            println!("   Backoff:    {}ms", config.runner.step_backoff_ms);
            println!("   Retries:    {}", config.runner.max_retries);
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

/// Settings that load fine but are probably not what the user wants.
fn warnings(config: &AppConfig) -> Vec<&'static str> {
    let mut warnings = Vec::new();

    if !config.has_api_key()
        && !config.providers.values().any(|p| p.api_key.is_some())
    {
        warnings.push("No API key set (set SYNAPSE_API_KEY or GEMINI_API_KEY env var)");
    }

    if config.runner.generation_timeout_secs == 0 {
        warnings.push("Generation timeout disabled; a stalled backend will hang the run");
    }

    if config.policy.high_risk_tools.is_empty() {
        warnings.push("No high-risk tools configured; refunds and exonerations are judged like any other tool");
    }

    warnings
}

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    println!("{}", toml::to_string_pretty(&redacted(config))?);
    Ok(())
}

fn redacted(mut config: AppConfig) -> AppConfig {
    if config.api_key.is_some() {
        config.api_key = Some(REDACTED.into());
    }
    for provider in config.providers.values_mut() {
        if provider.api_key.is_some() {
            provider.api_key = Some(REDACTED.into());
        }
    }
    config
}

pub async fn path() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", AppConfig::config_path().display());
    Ok(())
}
