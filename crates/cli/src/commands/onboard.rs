//! `synapse onboard` — First-time setup.

use std::path::Path;
use synapse_config::AppConfig;

const SAMPLE_SCENARIO: &str = "Order #4521 from Spice Route is running 40 minutes late. \
The merchant says the kitchen is backed up and the customer has messaged twice asking for an update.\n";

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🧠 Synapse — First-Time Setup");
    println!("=============================\n");

    let config_dir = AppConfig::config_dir();
    for line in initialize(&config_dir)? {
        println!("{line}");
    }

    let config_path = config_dir.join("config.toml");
    println!("\n📝 Next steps:");
    println!("   1. Set GEMINI_API_KEY (or add api_key to {})", config_path.display());
    println!(
        "   2. Run: synapse run --file {}",
        config_dir.join("scenario.txt").display()
    );
    println!("\n🎉 Setup complete!\n");

    Ok(())
}

/// Create the config directory, a default config and a sample scenario.
/// Existing files are left alone. Returns one status line per item.
pub fn initialize(config_dir: &Path) -> std::io::Result<Vec<String>> {
    let mut report = Vec::new();

    if config_dir.exists() {
        report.push(format!("  Config directory exists: {}", config_dir.display()));
    } else {
        std::fs::create_dir_all(config_dir)?;
        report.push(format!("✅ Created config directory: {}", config_dir.display()));
    }

    let config_path = config_dir.join("config.toml");
    if config_path.exists() {
        report.push(format!("⚠️  Config already exists at: {}", config_path.display()));
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        report.push(format!("✅ Created config.toml at: {}", config_path.display()));
    }

    let scenario_path = config_dir.join("scenario.txt");
    if !scenario_path.exists() {
        std::fs::write(&scenario_path, SAMPLE_SCENARIO)?;
        report.push("✅ Created sample scenario.txt".into());
    }

    Ok(report)
}
