//! `synapse run` — Run one scenario through the orchestration loop.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use synapse_agent::{RunOptions, RunResult, ScenarioRunner};
use synapse_config::AppConfig;
use synapse_core::provider::Provider;
use synapse_policy::{HeuristicEvaluator, PolicyAdapter};
use synapse_providers::ReplayProvider;

pub struct RunArgs {
    pub scenario: Option<String>,
    pub file: Option<PathBuf>,
    pub max_steps: Option<usize>,
    pub model: Option<String>,
    pub replay: Option<PathBuf>,
    pub json: bool,
}

pub async fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.max_steps == Some(0) {
        return Err("--max-steps must be at least 1".into());
    }

    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let scenario = resolve_scenario(args.scenario, args.file.as_deref())?;
    let provider = build_provider(&config, args.replay.as_deref())?;

    let tools = Arc::new(synapse_tools::catalog_registry());
    let policy = PolicyAdapter::from_config(
        Arc::new(HeuristicEvaluator::new(config.policy.clone())),
        &config.policy,
    );
    let runner = ScenarioRunner::from_config(provider, tools, policy, &config);

    let options = RunOptions {
        max_steps: args.max_steps,
        model: args.model,
    };

    match runner.run_with(&scenario, options).await {
        Ok(result) => {
            print_result(&result, args.json)?;
            Ok(())
        }
        Err(e) => {
            print_result(e.partial(), args.json)?;
            Err(e.into())
        }
    }
}

/// The scenario text from the positional argument or `--file`.
pub fn resolve_scenario(
    scenario: Option<String>,
    file: Option<&Path>,
) -> Result<String, Box<dyn std::error::Error>> {
    let text = match (scenario, file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read scenario file {}: {e}", path.display()))?,
        (None, None) => return Err("No scenario given. Pass it as an argument or with --file.".into()),
    };

    let text = text.trim().to_string();
    if text.is_empty() {
        return Err("Scenario is empty".into());
    }
    Ok(text)
}

/// The replay provider when `--replay` is given, else the configured backend.
pub fn build_provider(
    config: &AppConfig,
    replay: Option<&Path>,
) -> Result<Arc<dyn Provider>, Box<dyn std::error::Error>> {
    if let Some(path) = replay {
        let provider = ReplayProvider::from_file(path)?;
        if provider.is_empty() {
            return Err(format!("Replay file {} has no blocks", path.display()).into());
        }
        tracing::info!(path = %path.display(), blocks = provider.len(), "Replaying scripted model outputs");
        return Ok(Arc::new(provider));
    }

    // Fail early with setup instructions when no key is available
    let local = matches!(config.default_provider.as_str(), "ollama" | "vllm" | "llamacpp" | "llama.cpp");
    let provider_key = config
        .providers
        .get(&config.default_provider)
        .is_some_and(|p| p.api_key.is_some());
    if !local && !config.has_api_key() && !provider_key {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    SYNAPSE_API_KEY      (generic)");
        eprintln!("    GEMINI_API_KEY       (for Gemini, the default backend)");
        eprintln!("    OPENAI_API_KEY");
        eprintln!("    OPENROUTER_API_KEY");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_path().display());
        eprintln!();
        eprintln!("  To run offline, pass --replay <file> with scripted model outputs.");
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let router = synapse_providers::router::build_from_config(config);
    Ok(router.default().ok_or("No default provider configured")?)
}

fn print_result(result: &RunResult, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        println!("{}", render_text(result));
    }
    Ok(())
}

/// The human-readable report: transcript, then the plan.
pub fn render_text(result: &RunResult) -> String {
    let mut out = String::from(result.transcript_text());
    out.push_str("\n=== FINAL PLAN ===\n");
    if result.has_final_plan() {
        out.push_str(&result.final_plan);
    } else {
        out.push_str(&format!("(none: {} after {} steps)", result.stop_reason, result.steps()));
    }
    out
}
