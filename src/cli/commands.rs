use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::board::{matcher, Board, BoardKind, DragPayload, DropOutcome, MoveOutcome, OptimisticMutator};
use crate::cli::error::{user_error, validate_record_id};
use crate::cli::output::{
    board_to_json, format_board, format_move_history, format_stage_table, get_terminal_width, is_tty,
};
use crate::cli::parser::parse_record_args;
use crate::config::Config;
use crate::db::DbConnection;
use crate::models::{Item, Stage};
use crate::repo::{MoveRepo, RecordRepo, SqliteStore};
use crate::utils::fuzzy;
use anyhow::{Context, Result};

#[derive(Parser)]
#[command(name = "stageboard")]
#[command(about = "Stage boards for CRM records - group leads, deals and opportunities into kanban columns and move them between stages")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a record to a board
    Add {
        /// Board name (leads, deals, opportunities)
        board: String,
        /// Record name and fields (e.g., "Acme roof survey contact_name=Jane value=1200")
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Replace a board's records with a JSON array of objects
    Import {
        /// Board name
        board: String,
        /// JSON file holding an array of records
        file: PathBuf,
    },
    /// Show a board with records grouped into stage columns
    Board {
        /// Board name
        board: String,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Move a record to another stage (drag and drop onto a column)
    Move {
        /// Board name
        board: String,
        /// Record ID
        id: String,
        /// Target stage id or label
        stage: String,
    },
    /// List a board's stages
    Stages {
        /// Board name
        board: String,
    },
    /// Show the stage move history of a record
    History {
        /// Board name
        board: String,
        /// Record ID
        id: String,
    },
    /// Delete a record
    Delete {
        /// Board name
        board: String,
        /// Record ID
        id: String,
    },
}

pub fn run() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                e.print()?;
                return Ok(());
            }
            _ => {
                e.print()?;
                std::process::exit(1);
            }
        },
    };

    handle_command(cli)
}

fn handle_command(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Add { board, args } => handle_add(board, args),
        Commands::Import { board, file } => handle_import(board, file),
        Commands::Board { board, json } => handle_board(board, json),
        Commands::Move { board, id, stage } => handle_move(board, id, stage),
        Commands::Stages { board } => handle_stages(board),
        Commands::History { board, id } => handle_history(board, id),
        Commands::Delete { board, id } => handle_delete(board, id),
    }
}

/// Resolve a board name, suggesting close names on a miss
fn resolve_kind(name: &str) -> BoardKind {
    if let Some(kind) = BoardKind::from_str(name) {
        return kind;
    }
    let names: Vec<&str> = BoardKind::ALL.iter().map(|k| k.as_str()).collect();
    let suggestions = fuzzy::find_near_matches(name, &names, 2);
    if suggestions.is_empty() {
        user_error(&format!("Board '{}' not found. Boards: {}", name, names.join(", ")));
    } else {
        user_error(&format!("Board '{}' not found. Did you mean '{}'?", name, suggestions.join("', '")));
    }
}

fn load_board(kind: BoardKind) -> Result<Board> {
    Config::load()?.board(kind)
}

fn parse_id(id: &str) -> i64 {
    validate_record_id(id).unwrap_or_else(|e| user_error(&e))
}

/// Find the stage a user named: by id, by normalized id, then by label
fn find_stage<'a>(board: &'a Board, input: &str) -> Option<&'a Stage> {
    let normalized = matcher::normalize_id(input);
    let label = input.trim().to_lowercase();
    board
        .stage(input)
        .or_else(|| board.stages().iter().find(|s| s.id == normalized))
        .or_else(|| board.stages().iter().find(|s| s.label.to_lowercase() == label))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn handle_add(board_name: String, args: Vec<String>) -> Result<()> {
    let kind = resolve_kind(&board_name);
    let board = load_board(kind)?;

    if args.is_empty() {
        user_error("Record name is required");
    }
    let parsed = parse_record_args(args).unwrap_or_else(|e| user_error(&e.to_string()));

    let mut fields = Map::new();
    fields.insert("name".to_string(), Value::String(parsed.name()));
    fields.extend(parsed.fields);

    let stage_field = board.stage_field().to_string();
    let has_stage = fields.get(&stage_field).map(|v| !v.is_null()).unwrap_or(false);
    if !has_stage {
        let first = &board.stages()[0];
        fields.insert(stage_field.clone(), Value::String(first.write_value().to_string()));
    }

    let conn = DbConnection::connect().context("Failed to connect to database")?;
    let item = RecordRepo::create(&conn, kind, fields)?;

    let stage_value = item.stage_value(&stage_field);
    match matcher::resolve(stage_value.as_deref(), board.stages()) {
        Some(stage) => println!(
            "Created {} {}: {} ({})",
            kind.record_noun(),
            item.id,
            item.title(),
            stage.label
        ),
        None => {
            println!("Created {} {}: {}", kind.record_noun(), item.id, item.title());
            println!(
                "Note: {} '{}' matches no column; the record will not appear on the board.",
                stage_field,
                stage_value.unwrap_or_default()
            );
        }
    }
    Ok(())
}

fn handle_import(board_name: String, file: PathBuf) -> Result<()> {
    let kind = resolve_kind(&board_name);

    let content = std::fs::read_to_string(&file)
        .unwrap_or_else(|e| user_error(&format!("Cannot read '{}': {}", file.display(), e)));
    let records: Vec<Map<String, Value>> = serde_json::from_str(&content).unwrap_or_else(|e| {
        user_error(&format!(
            "Invalid import file '{}': expected a JSON array of objects ({})",
            file.display(),
            e
        ))
    });

    let mut seen = HashSet::new();
    let mut pending = Vec::with_capacity(records.len());
    for (idx, mut fields) in records.into_iter().enumerate() {
        let id = match fields.remove("id") {
            None | Some(Value::Null) => None,
            Some(value) => match value.as_i64().filter(|id| *id > 0) {
                Some(id) => Some(id),
                None => user_error(&format!("Record {} has an invalid id: {}", idx + 1, value)),
            },
        };
        if let Some(id) = id {
            if !seen.insert(id) {
                user_error(&format!("Duplicate record id {} in import file", id));
            }
        }
        pending.push((id, fields));
    }

    // Records without an id are numbered after the highest given id
    let mut last_id = seen.iter().max().copied().unwrap_or(0);
    let mut items = Vec::with_capacity(pending.len());
    for (id, fields) in pending {
        let id = match id {
            Some(id) => id,
            None => {
                last_id = last_id.checked_add(1).unwrap_or_else(|| {
                    user_error("No record ids left to assign after the highest given id; give every record an id")
                });
                last_id
            }
        };
        items.push(Item { id, fields });
    }

    let conn = DbConnection::connect().context("Failed to connect to database")?;
    let count = RecordRepo::replace_all(&conn, kind, &items)?;
    println!(
        "Imported {} {} into {}.",
        count,
        if count == 1 { "record" } else { "records" },
        kind.as_str()
    );
    Ok(())
}

fn handle_board(board_name: String, json: bool) -> Result<()> {
    let kind = resolve_kind(&board_name);
    let board = load_board(kind)?;
    let conn = DbConnection::connect().context("Failed to connect to database")?;
    let items = RecordRepo::list(&conn, kind)?;
    let partition = board.partition(&items);

    if json {
        let value = board_to_json(kind, &board, &partition);
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print!("{}", format_board(&board, &partition, get_terminal_width(), is_tty()));
    }
    Ok(())
}

fn handle_move(board_name: String, id: String, stage_input: String) -> Result<()> {
    let kind = resolve_kind(&board_name);
    let record_id = parse_id(&id);
    let mut board = load_board(kind)?;

    let target = match find_stage(&board, &stage_input) {
        Some(stage) => stage.clone(),
        None => {
            let ids: Vec<&str> = board.stages().iter().map(|s| s.id.as_str()).collect();
            let suggestions = fuzzy::find_near_matches(&matcher::normalize_id(&stage_input), &ids, 2);
            if suggestions.is_empty() {
                user_error(&format!("Stage '{}' not found. Stages: {}", stage_input, ids.join(", ")));
            } else {
                user_error(&format!(
                    "Stage '{}' not found. Did you mean '{}'?",
                    stage_input,
                    suggestions.join("', '")
                ));
            }
        }
    };

    let conn = DbConnection::connect().context("Failed to connect to database")?;
    let store = SqliteStore::new(&conn, kind);
    let mut items = RecordRepo::list(&conn, kind)?;
    let noun = capitalize(kind.record_noun());

    let item = match items.iter().find(|item| item.id == record_id) {
        Some(item) => item.clone(),
        None => user_error(&format!("{} {} not found", noun, record_id)),
    };

    board.drag_start(&item);
    board.drag_enter(&target.id);
    let payload = DragPayload::new(record_id).encode();
    match board.drop_payload(&items, &payload, &target.id) {
        DropOutcome::Moved(request) => {
            let mutator = OptimisticMutator::new(&store, board.stage_field());
            match mutator.perform(&mut items, &request, target.write_value()) {
                MoveOutcome::Confirmed { .. } => {
                    println!("Moved {} {} to {}.", kind.record_noun(), record_id, request.target_stage_label);
                }
                MoveOutcome::Reverted { error, .. } => {
                    return Err(error).with_context(|| {
                        format!("Failed to move {} {} to {}", kind.record_noun(), record_id, target.label)
                    });
                }
            }
        }
        DropOutcome::Unchanged { .. } => {
            println!("{} {} is already in {}.", noun, record_id, target.label);
        }
        DropOutcome::Aborted(reason) => {
            user_error(&format!("Cannot move {} {}: {:?}", kind.record_noun(), record_id, reason));
        }
    }
    Ok(())
}

fn handle_stages(board_name: String) -> Result<()> {
    let kind = resolve_kind(&board_name);
    let board = load_board(kind)?;
    let conn = DbConnection::connect().context("Failed to connect to database")?;
    let items = RecordRepo::list(&conn, kind)?;
    let partition = board.partition(&items);
    print!("{}", format_stage_table(&board, &partition, is_tty()));
    Ok(())
}

fn require_record(conn: &Connection, kind: BoardKind, record_id: i64) -> Result<Item> {
    match RecordRepo::get_by_id(conn, kind, record_id)? {
        Some(item) => Ok(item),
        None => user_error(&format!("{} {} not found", capitalize(kind.record_noun()), record_id)),
    }
}

fn handle_history(board_name: String, id: String) -> Result<()> {
    let kind = resolve_kind(&board_name);
    let record_id = parse_id(&id);
    let conn = DbConnection::connect().context("Failed to connect to database")?;
    require_record(&conn, kind, record_id)?;

    let moves = MoveRepo::list_for_record(&conn, kind, record_id)?;
    print!("{}", format_move_history(kind, record_id, &moves));
    Ok(())
}

fn handle_delete(board_name: String, id: String) -> Result<()> {
    let kind = resolve_kind(&board_name);
    let record_id = parse_id(&id);
    let conn = DbConnection::connect().context("Failed to connect to database")?;
    let item = require_record(&conn, kind, record_id)?;

    RecordRepo::delete(&conn, kind, record_id)?;
    println!("Deleted {} {}: {}", kind.record_noun(), record_id, item.title());
    Ok(())
}
