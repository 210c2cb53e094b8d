//! Neutral table model produced by report builders.
//!
//! Cells carry typed values plus enough formatting intent for a renderer to
//! produce plain text via [`Cell::plain_text`] and pick colors from
//! [`Cell::tone`]. Nothing in here knows about terminals.

use crate::{SourceError, Symbol};

/// Glyph shown for any value that is missing or not computable.
pub const PLACEHOLDER: &str = "—";

/// Semantic coloring hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Negative,
}

/// How a signed value is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaStyle {
    /// `+1.25%`
    Percent,
    /// `▲ +1.25` / `▼ -1.25`
    Arrow,
    /// `+1.25`
    Signed,
}

/// Fixed-precision number with optional affixes.
#[derive(Debug, Clone, PartialEq)]
pub struct Numeric {
    pub value: Option<f64>,
    pub decimals: usize,
    pub prefix: &'static str,
    pub suffix: &'static str,
    pub tone: Option<Tone>,
}

impl Numeric {
    fn render(&self) -> String {
        match self.value {
            Some(value) => format!(
                "{}{:.prec$}{}",
                self.prefix,
                value,
                self.suffix,
                prec = self.decimals
            ),
            None => PLACEHOLDER.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Symbol(Symbol),
    Text(String),
    Number(Numeric),
    /// Signed value colored by its sign: green at or above zero, red below.
    Delta { value: Option<f64>, style: DeltaStyle },
    /// Per-row failure marker.
    Error(String),
    Placeholder,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Text or the placeholder glyph when absent or blank.
    pub fn optional_text(value: Option<&str>) -> Self {
        match value.map(str::trim).filter(|value| !value.is_empty()) {
            Some(value) => Self::text(value),
            None => Self::Placeholder,
        }
    }

    /// `190.50`
    pub fn price(value: Option<f64>) -> Self {
        Self::decimal(value, 2)
    }

    /// `$190.50`
    pub fn money(value: Option<f64>) -> Self {
        Self::Number(Numeric {
            value,
            decimals: 2,
            prefix: "$",
            suffix: "",
            tone: None,
        })
    }

    pub fn decimal(value: Option<f64>, decimals: usize) -> Self {
        Self::Number(Numeric {
            value,
            decimals,
            prefix: "",
            suffix: "",
            tone: None,
        })
    }

    /// Unsigned share such as `42%`.
    pub fn percent(value: Option<f64>, decimals: usize) -> Self {
        Self::Number(Numeric {
            value,
            decimals,
            prefix: "",
            suffix: "%",
            tone: None,
        })
    }

    pub fn delta(value: Option<f64>, style: DeltaStyle) -> Self {
        Self::Delta { value, style }
    }

    pub fn error(error: &SourceError) -> Self {
        Self::Error(error.message().to_owned())
    }

    /// Same cell with a fixed tone. Only numbers carry one.
    pub fn tinted(self, tone: Tone) -> Self {
        match self {
            Self::Number(numeric) => Self::Number(Numeric {
                tone: Some(tone),
                ..numeric
            }),
            other => other,
        }
    }

    pub fn plain_text(&self) -> String {
        match self {
            Self::Symbol(symbol) => symbol.to_string(),
            Self::Text(text) => text.clone(),
            Self::Number(numeric) => numeric.render(),
            Self::Delta { value: None, .. } | Self::Placeholder => PLACEHOLDER.to_owned(),
            Self::Delta {
                value: Some(value),
                style,
            } => match style {
                DeltaStyle::Percent => format!("{value:+.2}%"),
                DeltaStyle::Signed => format!("{value:+.2}"),
                DeltaStyle::Arrow if *value < 0.0 => format!("▼ {value:+.2}"),
                DeltaStyle::Arrow => format!("▲ {value:+.2}"),
            },
            Self::Error(message) => message.clone(),
        }
    }

    pub fn tone(&self) -> Option<Tone> {
        match self {
            Self::Number(numeric) if numeric.value.is_some() => numeric.tone,
            Self::Delta {
                value: Some(value), ..
            } => Some(if *value < 0.0 {
                Tone::Negative
            } else {
                Tone::Positive
            }),
            Self::Error(_) => Some(Tone::Negative),
            _ => None,
        }
    }

    /// Numbers are right-aligned by renderers.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Number(_) | Self::Delta { .. })
    }
}

/// One titled table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub title: String,
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<Cell>>,
    pub notes: Vec<String>,
}

impl Table {
    pub fn new(title: impl Into<String>, headers: &[&'static str]) -> Self {
        Self {
            title: title.into(),
            headers: headers.to_vec(),
            rows: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        debug_assert_eq!(row.len(), self.headers.len());
        self.rows.push(row);
    }

    pub fn push_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Plain text of one column, top to bottom.
    pub fn column_text(&self, header: &str) -> Vec<String> {
        let Some(index) = self.headers.iter().position(|candidate| *candidate == header) else {
            return Vec::new();
        };
        self.rows
            .iter()
            .filter_map(|row| row.get(index))
            .map(Cell::plain_text)
            .collect()
    }
}

/// Upstream call accounting for one report run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    pub attempted: usize,
    pub transport_failures: usize,
}

impl FetchStats {
    pub fn record<T>(&mut self, result: &Result<T, SourceError>) {
        self.attempted += 1;
        if matches!(result, Err(error) if error.is_transport()) {
            self.transport_failures += 1;
        }
    }

    pub fn record_failure(&mut self, error: &SourceError) {
        self.attempted += 1;
        if error.is_transport() {
            self.transport_failures += 1;
        }
    }

    pub fn record_success(&mut self) {
        self.attempted += 1;
    }

    /// Every attempted call failed at the transport level.
    pub fn all_failed(&self) -> bool {
        self.attempted > 0 && self.transport_failures == self.attempted
    }

    pub fn merge(&mut self, other: FetchStats) {
        self.attempted += other.attempted;
        self.transport_failures += other.transport_failures;
    }
}

/// Output of one report: one or more tables plus call accounting.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub tables: Vec<Table>,
    pub stats: FetchStats,
}

impl Report {
    pub fn single(table: Table, stats: FetchStats) -> Self {
        Self {
            tables: vec![table],
            stats,
        }
    }

    pub fn table(&self, title: &str) -> Option<&Table> {
        self.tables.iter().find(|table| table.title == title)
    }
}
