use std::fs;
use std::path::PathBuf;

const SAMPLE_CONFIG: &str = include_str!("../../samples/sample-config.yml");

/// Write a starter config to the user config path, or to stdout.
pub fn init(stdout: bool) -> Result<(), Box<dyn std::error::Error>> {
    if stdout {
        print!("{}", SAMPLE_CONFIG);
        return Ok(());
    }

    let target = default_config_path().ok_or("could not determine home directory")?;
    if target.exists() {
        return Err(format!(
            "config already exists at {}; remove it first or use --stdout",
            target.display()
        )
        .into());
    }

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&target, SAMPLE_CONFIG)?;
    println!("Wrote starter config to {}", target.display());
    println!("Edit it, then run 'bucketlog run'.");

    Ok(())
}

fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config/bucketlog/config.yml"))
}
