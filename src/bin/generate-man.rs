// Render man pages for stageboard and each subcommand
//
// Usage: generate-man [OUTPUT_DIR]   (default: ./man)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::CommandFactory;
use stageboard::cli::Cli;

fn render(cmd: clap::Command, out_dir: &Path, name: &str) -> Result<()> {
    let mut buffer = Vec::new();
    clap_mangen::Man::new(cmd)
        .render(&mut buffer)
        .with_context(|| format!("Failed to render man page for {}", name))?;
    let path = out_dir.join(format!("{}.1", name));
    std::fs::write(&path, buffer)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    let out_dir = PathBuf::from(std::env::args().nth(1).unwrap_or_else(|| "man".to_string()));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let cmd = Cli::command();
    for sub in cmd.get_subcommands() {
        let name = format!("stageboard-{}", sub.get_name());
        render(sub.clone(), &out_dir, &name)?;
    }
    render(cmd, &out_dir, "stageboard")
}
