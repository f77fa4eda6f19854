use minirag_core::RagConfig;
use std::path::Path;

pub fn run(path: Option<&Path>, config: &RagConfig) -> anyhow::Result<()> {
    match path {
        Some(path) => println!("# Loaded from {}", path.display()),
        None => println!("# Defaults (no config file found)"),
    }
    println!("{}", config.to_toml_redacted()?);

    let errors = config.validate();
    if !errors.is_empty() {
        println!("Validation errors:");
        for error in &errors {
            println!("  - {}", error);
        }
        anyhow::bail!("{} invalid setting(s)", errors.len());
    }

    if config.api_key().is_err() {
        println!("Note: no API key configured; set OPENAI_API_KEY or [openai] api_key.");
    }

    Ok(())
}
