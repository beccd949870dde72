use std::path::Path;

use tether_core::TetherConfig;

pub fn init(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }
    let config = TetherConfig::scaffold();
    std::fs::write(path, config.to_toml_string()?)?;
    println!("✓ Generated {}", path.display());
    Ok(())
}

pub fn check(path: &Path) -> anyhow::Result<()> {
    let config = TetherConfig::from_file(path)?;
    let keys = config.topology_keys();
    println!("host:   {}", keys.host);
    println!("zone:   {}", keys.zone);
    println!("region: {}", keys.region);
    println!("default prefer weight: {}", config.default_prefer_weight());
    Ok(())
}
