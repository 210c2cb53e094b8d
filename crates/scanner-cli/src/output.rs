use std::io::{self, IsTerminal, Write};

use colored::{ColoredString, Colorize};
use scanner_core::{Cell, Report, Table, Tone};

use crate::error::CliError;

const SYMBOL_RGB: (u8, u8, u8) = (255, 140, 20);
const POSITIVE_RGB: (u8, u8, u8) = (40, 180, 80);
const NEGATIVE_RGB: (u8, u8, u8) = (220, 40, 40);
const TITLE_RGB: (u8, u8, u8) = (200, 200, 200);

/// Writes every table of `report` to stdout.
pub fn render(report: &Report) -> Result<(), CliError> {
    let renderer = Renderer::for_stdout();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    renderer.write_report(&mut out, report)?;
    out.flush()?;
    Ok(())
}

/// GitHub-style pipe tables, optionally colorized.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub const fn plain() -> Self {
        Self { color: false }
    }

    /// Color only when stdout is a terminal and `NO_COLOR` is unset.
    pub fn for_stdout() -> Self {
        let color = io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
        colored::control::set_override(color);
        Self { color }
    }

    pub fn write_report<W: Write>(&self, out: &mut W, report: &Report) -> io::Result<()> {
        for table in &report.tables {
            self.write_table(out, table)?;
        }
        Ok(())
    }

    pub fn write_table<W: Write>(&self, out: &mut W, table: &Table) -> io::Result<()> {
        let title = format!("// {}", table.title);
        writeln!(out)?;
        writeln!(out, "{}", self.paint(&title, Some(TITLE_RGB)))?;

        let texts = table
            .rows
            .iter()
            .map(|row| row.iter().map(Cell::plain_text).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        let columns = column_layout(table, &texts);

        let header = table
            .headers
            .iter()
            .zip(&columns)
            .map(|(header, column)| column.pad(header, header.to_string()))
            .collect::<Vec<_>>();
        write_line(out, &header)?;
        let separator = columns
            .iter()
            .map(|column| "-".repeat(column.width))
            .collect::<Vec<_>>();
        writeln!(out, "|-{}-|", separator.join("-|-"))?;

        if table.is_empty() {
            writeln!(out, "  no results")?;
        }
        for (row, row_texts) in table.rows.iter().zip(&texts) {
            let cells = row
                .iter()
                .zip(row_texts)
                .zip(&columns)
                .map(|((cell, text), column)| column.pad(text, self.paint_cell(cell, text)))
                .collect::<Vec<_>>();
            write_line(out, &cells)?;
        }

        for note in &table.notes {
            writeln!(out, "  {note}")?;
        }
        Ok(())
    }

    fn paint_cell(&self, cell: &Cell, text: &str) -> String {
        let rgb = match (cell, cell.tone()) {
            (Cell::Symbol(_), _) => Some(SYMBOL_RGB),
            (_, Some(Tone::Positive)) => Some(POSITIVE_RGB),
            (_, Some(Tone::Negative)) => Some(NEGATIVE_RGB),
            (_, None) => None,
        };
        self.paint(text, rgb)
    }

    fn paint(&self, text: &str, rgb: Option<(u8, u8, u8)>) -> String {
        match rgb {
            Some((r, g, b)) if self.color => {
                let painted: ColoredString = text.truecolor(r, g, b);
                painted.to_string()
            }
            _ => text.to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Column {
    width: usize,
    right: bool,
}

impl Column {
    /// Pads by the visible width of `plain`, so escape codes in `shown` are ignored.
    fn pad(&self, plain: &str, shown: String) -> String {
        let fill = " ".repeat(self.width.saturating_sub(display_width(plain)));
        if self.right {
            format!("{fill}{shown}")
        } else {
            format!("{shown}{fill}")
        }
    }
}

fn column_layout(table: &Table, texts: &[Vec<String>]) -> Vec<Column> {
    table
        .headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            let width = texts
                .iter()
                .filter_map(|row| row.get(index))
                .map(|text| display_width(text))
                .fold(display_width(header), usize::max);
            let cells = table.rows.iter().filter_map(|row| row.get(index));
            let mut valued = cells
                .filter(|cell| !matches!(cell, Cell::Placeholder))
                .peekable();
            let right = valued.peek().is_some() && valued.all(Cell::is_numeric);
            Column { width, right }
        })
        .collect()
}

fn write_line<W: Write>(out: &mut W, cells: &[String]) -> io::Result<()> {
    writeln!(out, "| {} |", cells.join(" | "))
}

fn display_width(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanner_core::{DeltaStyle, FetchStats, Symbol};

    fn render_plain(report: &Report) -> String {
        let mut out = Vec::new();
        Renderer::plain()
            .write_report(&mut out, report)
            .expect("write");
        String::from_utf8(out).expect("utf8")
    }

    fn symbol(raw: &str) -> Cell {
        Cell::Symbol(Symbol::parse(raw).expect("valid symbol"))
    }

    #[test]
    fn renders_pipe_table_with_numeric_columns_right_aligned() {
        let mut table = Table::new("top gainers", &["SYM", "PRICE", "%"]);
        table.push_row(vec![
            symbol("NVDA"),
            Cell::price(Some(912.5)),
            Cell::delta(Some(3.25), DeltaStyle::Percent),
        ]);
        table.push_row(vec![
            symbol("AMD"),
            Cell::price(Some(95.0)),
            Cell::delta(Some(-1.0), DeltaStyle::Percent),
        ]);

        let text = render_plain(&Report::single(table, FetchStats::default()));

        assert_eq!(
            text,
            "\n\
             // top gainers\n\
             | SYM  |  PRICE |      % |\n\
             |------|--------|--------|\n\
             | NVDA | 912.50 | +3.25% |\n\
             | AMD  |  95.00 | -1.00% |\n"
        );
    }

    #[test]
    fn empty_table_keeps_header_and_says_no_results() {
        let table = Table::new("earnings catalyst  (±1 day)", &["SYM", "DATE"]);
        let text = render_plain(&Report::single(table, FetchStats::default()));

        assert_eq!(
            text,
            "\n// earnings catalyst  (±1 day)\n| SYM | DATE |\n|-----|------|\n  no results\n"
        );
    }

    #[test]
    fn placeholders_do_not_break_alignment_and_notes_follow() {
        let mut table = Table::new("top losers", &["SYM", "52W POS"]);
        table.push_row(vec![symbol("AMD"), Cell::Placeholder]);
        table.push_row(vec![symbol("INTC"), Cell::percent(Some(12.0), 0)]);
        table.push_note("skipped: SAP (not found)");

        let text = render_plain(&Report::single(table, FetchStats::default()));
        let lines = text.lines().collect::<Vec<_>>();

        assert_eq!(lines[4], "| AMD  |       — |");
        assert_eq!(lines[5], "| INTC |     12% |");
        assert_eq!(lines[6], "  skipped: SAP (not found)");
    }

    #[test]
    fn plain_renderer_emits_no_escape_codes() {
        let mut table = Table::new("quotes", &["SYM", "STATE"]);
        table.push_row(vec![symbol("AAPL"), Cell::Error(String::from("error"))]);

        let text = render_plain(&Report::single(table, FetchStats::default()));
        assert!(!text.contains('\u{1b}'));
        assert!(text.contains("| AAPL | error |"));
    }

    #[test]
    fn colored_renderer_tints_symbols_and_tones() {
        colored::control::set_override(true);
        let renderer = Renderer { color: true };

        let painted = renderer.paint_cell(&symbol("AAPL"), "AAPL");
        assert!(painted.contains("38;2;255;140;20"));

        let loss = Cell::delta(Some(-2.0), DeltaStyle::Percent);
        assert!(renderer.paint_cell(&loss, "-2.00%").contains("38;2;220;40;40"));

        let neutral = Cell::text("USD");
        assert_eq!(renderer.paint_cell(&neutral, "USD"), "USD");
    }
}
