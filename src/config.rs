// Configuration file (~/.stageboard/rc)
//
// Line-oriented `key=value` pairs; `#` starts a comment line.
//   data.location=<path>        ledger database path
//   stages.<board>=<file.json>  replace a board's preset stages
// Relative paths resolve against the directory holding the rc file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, warn};

use crate::board::{Board, BoardKind};
use crate::models::Stage;

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub data_location: Option<PathBuf>,
    pub stage_files: HashMap<BoardKind, PathBuf>,
}

impl Config {
    /// Home directory (honours `HOME`)
    pub fn home_dir() -> PathBuf {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Directory holding the rc file and the default ledger
    pub fn config_dir() -> PathBuf {
        Self::home_dir().join(".stageboard")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("rc")
    }

    /// Load the rc file, or defaults when it does not exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(Self::parse(&content, &base))
    }

    /// Parse rc content, resolving relative paths against `base_dir`
    pub fn parse(content: &str, base_dir: &Path) -> Self {
        let mut config = Self::default();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                warn!("ignoring config line without '=': {}", line);
                continue;
            };
            let (key, value) = (key.trim(), value.trim());
            if key == "data.location" {
                config.data_location = Some(resolve(base_dir, value));
            } else if let Some(board) = key.strip_prefix("stages.") {
                match BoardKind::from_str(board) {
                    Some(kind) => {
                        config.stage_files.insert(kind, resolve(base_dir, value));
                    }
                    None => warn!("ignoring stage file for unknown board '{}'", board),
                }
            } else {
                debug!("ignoring unknown config key '{}'", key);
            }
        }
        config
    }

    /// Board for `kind`, with stages from the configured stage file if any
    pub fn board(&self, kind: BoardKind) -> Result<Board> {
        let Some(path) = self.stage_files.get(&kind) else {
            return Ok(Board::for_kind(kind));
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read stage file: {}", path.display()))?;
        let stages: Vec<Stage> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse stage file: {}", path.display()))?;
        let board = Board::new(stages, kind.stage_field())
            .with_context(|| format!("Invalid stage file: {}", path.display()))?;
        Ok(board.with_card_fields(kind.card_fields()))
    }
}

fn resolve(base_dir: &Path, value: &str) -> PathBuf {
    let path = PathBuf::from(value);
    if path.is_relative() {
        base_dir.join(path)
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_resolves_relative_paths() {
        let base = Path::new("/home/user/.stageboard");
        let config = Config::parse(
            "# ledger\ndata.location=./custom.db\nstages.deals = /etc/deals.json\n",
            base,
        );
        assert_eq!(config.data_location, Some(base.join("./custom.db")));
        assert_eq!(
            config.stage_files.get(&BoardKind::Deals),
            Some(&PathBuf::from("/etc/deals.json"))
        );
    }

    #[test]
    fn test_parse_ignores_unknown_lines() {
        let config = Config::parse("garbage\nstages.accounts=a.json\ncolor=on\n", Path::new("/"));
        assert!(config.data_location.is_none());
        assert!(config.stage_files.is_empty());
    }

    #[test]
    fn test_board_from_stage_file() {
        let temp_dir = TempDir::new().unwrap();
        let stage_file = temp_dir.path().join("leads.json");
        fs::write(
            &stage_file,
            r##"[{"id":"open","label":"Open","color":"#fff"},{"id":"closed","label":"Closed"}]"##,
        ).unwrap();

        let mut config = Config::default();
        config.stage_files.insert(BoardKind::Leads, stage_file);
        let board = config.board(BoardKind::Leads).unwrap();
        assert_eq!(board.stage_field(), "status");
        assert_eq!(board.stages().len(), 2);
        assert_eq!(board.stages()[1].id, "closed");
    }

    #[test]
    fn test_board_rejects_duplicate_stage_ids() {
        let temp_dir = TempDir::new().unwrap();
        let stage_file = temp_dir.path().join("deals.json");
        fs::write(&stage_file, r#"[{"id":"a","label":"A"},{"id":"a","label":"B"}]"#).unwrap();

        let mut config = Config::default();
        config.stage_files.insert(BoardKind::Deals, stage_file);
        let err = config.board(BoardKind::Deals).unwrap_err();
        assert!(format!("{:#}", err).contains("duplicate stage id 'a'"));
    }

    #[test]
    fn test_board_defaults_to_preset() {
        let board = Config::default().board(BoardKind::Opportunities).unwrap();
        assert_eq!(board.stages()[0].id, "leads");
    }
}
