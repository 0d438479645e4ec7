use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use orrery::config::Config;

/// Default content for .orrery/.gitignore
const GITIGNORE_CONTENT: &str = r#"# Orrery gitignore
# Temp files left behind by an interrupted save
.graph.tmp.*
"#;

pub fn run(dir: &Path) -> Result<()> {
    if dir.join("graph.jsonl").exists() {
        anyhow::bail!("Orrery already initialized at {}", dir.display());
    }

    fs::create_dir_all(dir).context("Failed to create orrery directory")?;

    let graph_path = super::graph_path(dir);
    fs::write(&graph_path, "").context("Failed to create graph.jsonl")?;

    let gitignore_path = dir.join(".gitignore");
    fs::write(&gitignore_path, GITIGNORE_CONTENT).context("Failed to create .gitignore")?;

    Config::init(dir)?;

    println!("Initialized orrery at {}", dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery::parser::load_graph;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_empty_graph_and_config() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join(".orrery");
        run(&dir).unwrap();

        assert!(load_graph(dir.join("graph.jsonl")).unwrap().is_empty());
        assert!(dir.join("config.toml").exists());
        assert!(dir.join(".gitignore").exists());
    }

    #[test]
    fn test_init_twice_fails() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join(".orrery");
        run(&dir).unwrap();
        assert!(run(&dir).is_err());
    }
}
