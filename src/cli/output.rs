// Output formatting utilities

use crate::board::{Board, BoardKind, Column, Partition};
use crate::models::{Item, StageMove};
use chrono::Local;
use std::io::IsTerminal;

// ANSI escape codes for terminal formatting
const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_RESET: &str = "\x1b[0m";

/// Narrowest column for the side-by-side board layout
const MIN_COLUMN_WIDTH: usize = 18;
const COLUMN_GAP: &str = "  ";

/// Check if stdout is a terminal (TTY)
pub fn is_tty() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width dynamically
///
/// Uses the `terminal_size` crate, with fallback to the COLUMNS environment
/// variable and a sensible default.
pub fn get_terminal_width() -> usize {
    if let Some((terminal_size::Width(w), _)) = terminal_size::terminal_size() {
        if w > 0 {
            return w as usize;
        }
    }

    if let Ok(cols) = std::env::var("COLUMNS") {
        if let Ok(width) = cols.parse::<usize>() {
            if width > 0 && width < 10000 {
                return width;
            }
        }
    }

    120
}

/// Apply bold formatting if in TTY mode
fn bold_if_tty(text: &str, is_tty: bool) -> String {
    if is_tty {
        format!("{}{}{}", ANSI_BOLD, text, ANSI_RESET)
    } else {
        text.to_string()
    }
}

/// Parse a `#rrggbb` stage color
pub fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Bold, and tinted with the stage color when it is a hex color (TTY only)
fn stage_header_if_tty(text: &str, color: &str, is_tty: bool) -> String {
    if !is_tty {
        return text.to_string();
    }
    match parse_hex_color(color) {
        Some((r, g, b)) => format!("{}\x1b[38;2;{};{};{}m{}{}", ANSI_BOLD, r, g, b, text, ANSI_RESET),
        None => bold_if_tty(text, is_tty),
    }
}

/// Format timestamp for display
pub fn format_timestamp(ts: i64) -> String {
    use chrono::TimeZone;
    match Local.timestamp_opt(ts, 0).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => ts.to_string(),
    }
}

/// Format a monetary amount as pounds with two decimals and thousands separators
pub fn format_currency(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::new();
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}£{}.{:02}", sign, grouped, cents % 100)
}

/// Text for one card field, or `None` when the item has nothing to show
fn card_field_text(item: &Item, field: &str) -> Option<String> {
    if field == "value" {
        let value = item.fields.get(field)?;
        let amount = value
            .as_f64()
            .or_else(|| value.as_str().and_then(|s| s.trim().parse::<f64>().ok()));
        return match amount {
            Some(amount) => Some(format_currency(amount)),
            None => item.field_text(field).filter(|s| !s.is_empty()),
        };
    }
    item.field_text(field).filter(|s| !s.is_empty())
}

/// Lines of one card: "#id title", then the card fields the item has
fn card_lines(item: &Item, card_fields: &[String]) -> Vec<String> {
    let mut lines = vec![format!("#{} {}", item.id, item.title())];
    for field in card_fields {
        if let Some(text) = card_field_text(item, field) {
            lines.push(format!("  {}", text));
        }
    }
    lines
}

/// Body lines of a column (cards separated by blank lines)
fn column_body(column: &Column, card_fields: &[String]) -> Vec<String> {
    if column.is_empty() {
        return vec!["No items".to_string()];
    }
    let mut lines = Vec::new();
    for (idx, item) in column.items.iter().enumerate() {
        if idx > 0 {
            lines.push(String::new());
        }
        lines.extend(card_lines(item, card_fields));
    }
    lines
}

fn column_header(column: &Column) -> String {
    format!("{} ({})", column.stage.label, column.len())
}

/// Truncate to `width` chars, marking cut text with ".."
fn truncate(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        return text.to_string();
    }
    if width <= 2 {
        return text.chars().take(width).collect();
    }
    let mut cut: String = text.chars().take(width - 2).collect();
    cut.push_str("..");
    cut
}

fn pad(text: &str, width: usize) -> String {
    let cut = truncate(text, width);
    let fill = width.saturating_sub(cut.chars().count());
    format!("{}{}", cut, " ".repeat(fill))
}

/// Render a partitioned board for the terminal
///
/// Columns are laid out side by side when each gets at least
/// `MIN_COLUMN_WIDTH` characters, otherwise stacked one under another.
pub fn format_board(board: &Board, partition: &Partition, width: usize, is_tty: bool) -> String {
    let columns = partition.columns();
    let count = columns.len().max(1);
    let gaps = COLUMN_GAP.len() * (count - 1);
    let column_width = width.saturating_sub(gaps) / count;

    let mut output = if column_width >= MIN_COLUMN_WIDTH {
        format_board_side_by_side(columns, board.card_fields(), column_width, is_tty)
    } else {
        format_board_stacked(columns, board.card_fields(), is_tty)
    };

    let excluded = partition.excluded().len();
    if excluded > 0 {
        output.push_str(&format!(
            "\n{} {} not shown: stage value matches no column.\n",
            excluded,
            if excluded == 1 { "record" } else { "records" }
        ));
    }
    output
}

fn format_board_side_by_side(columns: &[Column], card_fields: &[String], width: usize, is_tty: bool) -> String {
    let mut output = String::new();

    let headers: Vec<String> = columns
        .iter()
        .map(|c| stage_header_if_tty(&pad(&column_header(c), width), &c.stage.color, is_tty))
        .collect();
    output.push_str(headers.join(COLUMN_GAP).trim_end());
    output.push('\n');

    let rules: Vec<String> = columns.iter().map(|_| "-".repeat(width)).collect();
    output.push_str(&rules.join(COLUMN_GAP));
    output.push('\n');

    let bodies: Vec<Vec<String>> = columns.iter().map(|c| column_body(c, card_fields)).collect();
    let rows = bodies.iter().map(Vec::len).max().unwrap_or(0);
    for row in 0..rows {
        let cells: Vec<String> = bodies
            .iter()
            .map(|body| pad(body.get(row).map(String::as_str).unwrap_or(""), width))
            .collect();
        output.push_str(cells.join(COLUMN_GAP).trim_end());
        output.push('\n');
    }

    output
}

fn format_board_stacked(columns: &[Column], card_fields: &[String], is_tty: bool) -> String {
    let mut output = String::new();
    for (idx, column) in columns.iter().enumerate() {
        if idx > 0 {
            output.push('\n');
        }
        let header = column_header(column);
        output.push_str(&stage_header_if_tty(&header, &column.stage.color, is_tty));
        output.push('\n');
        output.push_str(&"-".repeat(header.chars().count()));
        output.push('\n');
        for line in column_body(column, card_fields) {
            if line.is_empty() {
                output.push('\n');
            } else {
                output.push_str(&format!("  {}\n", line));
            }
        }
    }
    output
}

/// JSON form of a partitioned board
pub fn board_to_json(kind: BoardKind, board: &Board, partition: &Partition) -> serde_json::Value {
    let columns: Vec<serde_json::Value> = partition
        .columns()
        .iter()
        .map(|column| {
            serde_json::json!({
                "id": column.stage.id,
                "label": column.stage.label,
                "color": column.stage.color,
                "count": column.len(),
                "items": column.items,
            })
        })
        .collect();
    let excluded: Vec<i64> = partition.excluded().iter().map(|item| item.id).collect();

    serde_json::json!({
        "board": kind.as_str(),
        "stage_field": board.stage_field(),
        "columns": columns,
        "excluded": excluded,
    })
}

/// Format a board's stage configuration as a table
pub fn format_stage_table(board: &Board, partition: &Partition, is_tty: bool) -> String {
    let headers = ["ID", "Label", "Color", "Writes", "Count"];
    let rows: Vec<[String; 5]> = board
        .stages()
        .iter()
        .map(|stage| {
            [
                stage.id.clone(),
                stage.label.clone(),
                stage.color.clone(),
                stage.write_value().to_string(),
                partition.items_in(&stage.id).len().to_string(),
            ]
        })
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    let mut output = String::new();
    let header_line: Vec<String> = headers.iter().zip(&widths).map(|(h, w)| pad(h, *w)).collect();
    output.push_str(&bold_if_tty(header_line.join(" ").trim_end(), is_tty));
    output.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    output.push_str(&rule.join(" "));
    output.push('\n');
    for row in rows {
        let cells: Vec<String> = row.iter().zip(&widths).map(|(c, w)| pad(c, *w)).collect();
        output.push_str(cells.join(" ").trim_end());
        output.push('\n');
    }
    output
}

/// Format the move history of one record
pub fn format_move_history(kind: BoardKind, record_id: i64, moves: &[StageMove]) -> String {
    if moves.is_empty() {
        return format!("No moves recorded for {} {}.\n", kind.record_noun(), record_id);
    }
    let mut output = String::new();
    for stage_move in moves {
        output.push_str(&format!(
            "{}  {} -> {}\n",
            format_timestamp(stage_move.moved_ts),
            stage_move.from_value.as_deref().unwrap_or("(none)"),
            stage_move.to_value
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardKind;

    fn lead_items() -> Vec<Item> {
        vec![
            Item::new(1)
                .with_field("name", "Acme roof survey")
                .with_field("status", "New Lead")
                .with_field("contact_name", "Jane"),
            Item::new(2).with_field("name", "Globex").with_field("status", "Prospect"),
            Item::new(3).with_field("status", "archived"),
        ]
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "£0.00");
        assert_eq!(format_currency(1234.5), "£1,234.50");
        assert_eq!(format_currency(1_000_000.0), "£1,000,000.00");
        assert_eq!(format_currency(-99.999), "-£100.00");
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ff6d3b"), Some((255, 109, 59)));
        assert_eq!(parse_hex_color("ff6d3b"), None);
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#gggggg"), None);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Working on it", 8), "Workin..");
        assert_eq!(truncate("abc", 2), "ab");
    }

    #[test]
    fn test_card_value_field_formats_currency() {
        let item = Item::new(1).with_field("value", 2500).with_field("grade", "A");
        let fields = vec!["value".to_string(), "grade".to_string(), "company_name".to_string()];
        assert_eq!(card_lines(&item, &fields), vec!["#1 Untitled", "  £2,500.00", "  A"]);
    }

    #[test]
    fn test_format_board_side_by_side() {
        let board = Board::for_kind(BoardKind::Leads);
        let items = lead_items();
        let partition = board.partition(&items);
        let output = format_board(&board, &partition, 120, false);

        let first = output.lines().next().unwrap();
        assert!(first.starts_with("New Leads (1)"));
        assert!(first.contains("Working on it (0)"));
        assert!(output.contains("#1 Acme roof survey"));
        assert!(output.contains("Jane"));
        assert!(output.contains("No items"));
        assert!(output.contains("1 record not shown"));
        assert!(!output.contains('\x1b'));
    }

    #[test]
    fn test_format_board_stacked_when_narrow() {
        let board = Board::for_kind(BoardKind::Leads);
        let items = lead_items();
        let partition = board.partition(&items);
        let output = format_board(&board, &partition, 40, false);

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "New Leads (1)");
        assert_eq!(lines[1], "-------------");
        assert_eq!(lines[2], "  #1 Acme roof survey");
        assert!(output.contains("Prospect (1)\n"));
    }

    #[test]
    fn test_board_to_json() {
        let board = Board::for_kind(BoardKind::Leads);
        let items = lead_items();
        let partition = board.partition(&items);
        let json = board_to_json(BoardKind::Leads, &board, &partition);

        assert_eq!(json["stage_field"], "status");
        assert_eq!(json["columns"][0]["id"], "new_leads");
        assert_eq!(json["columns"][0]["count"], 1);
        assert_eq!(json["columns"][0]["items"][0]["id"], 1);
        assert_eq!(json["excluded"], serde_json::json!([3]));
    }

    #[test]
    fn test_format_stage_table() {
        let board = Board::for_kind(BoardKind::Leads);
        let items = lead_items();
        let partition = board.partition(&items);
        let output = format_stage_table(&board, &partition, false);
        let lines: Vec<&str> = output.lines().collect();
        assert!(lines[0].starts_with("ID"));
        assert!(lines[2].starts_with("new_leads"));
        assert!(lines[2].contains("New Lead "));
        assert!(lines[2].ends_with("1"));
    }
}
