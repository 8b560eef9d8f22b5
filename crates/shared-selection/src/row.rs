//! Typed table rows with shared choice columns.
//!
//! A [`RowEntry`] stores the cells of one table row. Each column has a
//! [`ColumnKind`]: free text, a boolean flag, or a choice whose options come
//! from a [`SharedCollection<String>`] shared by every row of the table.
//! Choice cells own a [`SelectionTracker`] so they keep their selection when
//! the shared options are replaced.
//!
//! # Example
//!
//! ```
//! use shared_selection::model::SharedCollection;
//! use shared_selection::row::{CellValue, RowEntry};
//!
//! let units = SharedCollection::new(vec!["mm".to_string(), "cm".to_string()]);
//! let mut row = RowEntry::new(
//!     &["string", "choice(unit)", "boolean"],
//!     &[units.clone()],
//!     &["width", "cm", "TRUE "],
//! )?;
//!
//! assert_eq!(row.cell(1), Some(CellValue::Choice(Some("cm".to_string()))));
//! assert_eq!(row.cell(2), Some(CellValue::Flag(true)));
//!
//! row.set_cell(0, "height");
//! units.update(vec!["cm".to_string(), "m".to_string()]);
//! assert_eq!(row.cell(1), Some(CellValue::Choice(Some("cm".to_string()))));
//!
//! row.dispose();
//! # Ok::<(), shared_selection::RowError>(())
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use shared_selection_core::logging::targets;

use crate::error::{Result, RowError};
use crate::model::{SelectionPolicy, SelectionTracker, SharedCollection};

/// The type of a row column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    /// Free text.
    Text,
    /// A boolean flag.
    Flag,
    /// A selection among shared options.
    Choice,
}

impl ColumnKind {
    /// Parses a column marker.
    ///
    /// Markers are case-insensitive and may carry a parenthesised suffix,
    /// as in `"choice(unit)"`, which is ignored.
    pub fn parse(marker: &str) -> Result<Self> {
        let name = marker.split_once('(').map_or(marker, |(head, _)| head).trim();
        if name.eq_ignore_ascii_case("string") {
            Ok(Self::Text)
        } else if name.eq_ignore_ascii_case("boolean") {
            Ok(Self::Flag)
        } else if name.eq_ignore_ascii_case("choice") {
            Ok(Self::Choice)
        } else {
            Err(RowError::unknown_column_type(marker))
        }
    }

    /// Returns the canonical marker of this kind.
    pub fn marker(self) -> &'static str {
        match self {
            Self::Text => "string",
            Self::Flag => "boolean",
            Self::Choice => "choice",
        }
    }
}

impl FromStr for ColumnKind {
    type Err = RowError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

/// A cell value read from or written to a [`RowEntry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    /// Text content.
    Text(String),
    /// Flag state.
    Flag(bool),
    /// Selected option of a choice cell.
    Choice(Option<String>),
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

#[derive(Debug, Clone)]
enum Cell {
    Text(String),
    Flag(bool),
    Choice(Arc<SelectionTracker<String>>),
}

impl Cell {
    fn kind(&self) -> ColumnKind {
        match self {
            Self::Text(_) => ColumnKind::Text,
            Self::Flag(_) => ColumnKind::Flag,
            Self::Choice(_) => ColumnKind::Choice,
        }
    }
}

/// Selection options of the trackers created for choice cells.
pub fn choice_policy() -> SelectionPolicy {
    SelectionPolicy::default()
        .with_allow_empty_selection(false)
        .with_match_by_value(true)
}

/// One row of a table with typed cells.
///
/// Cloning a row shares its choice trackers with the clone.
#[derive(Debug, Clone)]
pub struct RowEntry {
    cells: Vec<Cell>,
}

impl RowEntry {
    /// Creates a row from column markers.
    ///
    /// `choice_models` supplies the options of each choice column, in
    /// column order. `defaults` is either empty or holds one value per
    /// column: text cells take it as is, flag cells are `true` when it
    /// reads `"true"` (ignoring case and surrounding whitespace), and choice
    /// cells start with it selected when it is one of the options.
    ///
    /// # Errors
    ///
    /// Fails on an unknown column marker, when `defaults` is non-empty but
    /// its length differs from the number of columns, or when the number of
    /// choice models differs from the number of choice columns.
    pub fn new(
        column_types: &[&str],
        choice_models: &[Arc<SharedCollection<String>>],
        defaults: &[&str],
    ) -> Result<Self> {
        let kinds = column_types
            .iter()
            .map(|marker| ColumnKind::parse(marker))
            .collect::<Result<Vec<_>>>()?;

        if !defaults.is_empty() && defaults.len() != kinds.len() {
            return Err(RowError::DefaultsLength {
                columns: kinds.len(),
                defaults: defaults.len(),
            });
        }

        let choice_columns = kinds.iter().filter(|k| **k == ColumnKind::Choice).count();
        if choice_columns != choice_models.len() {
            return Err(RowError::ChoiceModelCount {
                choice_columns,
                models: choice_models.len(),
            });
        }

        let mut models = choice_models.iter();
        let mut cells = Vec::with_capacity(kinds.len());
        for (column, kind) in kinds.iter().enumerate() {
            let default = defaults.get(column).copied();
            let cell = match kind {
                ColumnKind::Text => Cell::Text(default.unwrap_or_default().to_string()),
                ColumnKind::Flag => Cell::Flag(default.is_some_and(parse_flag)),
                ColumnKind::Choice => {
                    let Some(model) = models.next() else {
                        return Err(RowError::ChoiceModelCount {
                            choice_columns,
                            models: choice_models.len(),
                        });
                    };
                    Cell::Choice(SelectionTracker::new(
                        model.clone(),
                        default.map(str::to_string),
                        choice_policy(),
                    ))
                }
            };
            cells.push(cell);
        }

        tracing::debug!(target: targets::ROW, columns = kinds.len(), choice_columns, "row created");
        Ok(Self { cells })
    }

    /// Creates a row from ready-made cell values.
    ///
    /// Each column takes the next unused value of its kind from `texts`,
    /// `flags` or `choices`.
    ///
    /// # Errors
    ///
    /// Fails when the supplied values do not add up to the number of
    /// columns, or when a column finds no value of its kind left.
    pub fn from_cells(
        kinds: &[ColumnKind],
        texts: Vec<String>,
        flags: Vec<bool>,
        choices: Vec<Arc<SelectionTracker<String>>>,
    ) -> Result<Self> {
        let supplied = texts.len() + flags.len() + choices.len();
        if supplied != kinds.len() {
            return Err(RowError::CellCount {
                columns: kinds.len(),
                supplied,
            });
        }

        let mut texts = texts.into_iter();
        let mut flags = flags.into_iter();
        let mut choices = choices.into_iter();
        let cells = kinds
            .iter()
            .enumerate()
            .map(|(column, &kind)| {
                let cell = match kind {
                    ColumnKind::Text => texts.next().map(Cell::Text),
                    ColumnKind::Flag => flags.next().map(Cell::Flag),
                    ColumnKind::Choice => choices.next().map(Cell::Choice),
                };
                cell.ok_or(RowError::MissingCellValue { column, kind })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { cells })
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the kinds of all columns.
    pub fn kinds(&self) -> Vec<ColumnKind> {
        self.cells.iter().map(Cell::kind).collect()
    }

    /// Returns the value of `column`, or `None` if out of range.
    pub fn cell(&self, column: usize) -> Option<CellValue> {
        Some(match self.cells.get(column)? {
            Cell::Text(text) => CellValue::Text(text.clone()),
            Cell::Flag(flag) => CellValue::Flag(*flag),
            Cell::Choice(tracker) => CellValue::Choice(tracker.selected()),
        })
    }

    /// Returns the tracker of a choice column.
    pub fn choice(&self, column: usize) -> Option<&Arc<SelectionTracker<String>>> {
        match self.cells.get(column)? {
            Cell::Choice(tracker) => Some(tracker),
            _ => None,
        }
    }

    /// Writes `value` into `column`.
    ///
    /// Text cells store the value's text. Flag cells take a flag as is and
    /// parse text as `"true"` ignoring case and surrounding whitespace.
    /// Choice cells select the given option. Out-of-range columns are
    /// ignored.
    pub fn set_cell(&mut self, column: usize, value: impl Into<CellValue>) {
        let value = value.into();
        let Some(cell) = self.cells.get_mut(column) else {
            tracing::trace!(target: targets::ROW, column, "ignoring write to missing column");
            return;
        };

        match (cell, value) {
            (Cell::Text(text), CellValue::Text(value)) => *text = value,
            (Cell::Text(text), CellValue::Flag(flag)) => *text = flag.to_string(),
            (Cell::Text(text), CellValue::Choice(choice)) => *text = choice.unwrap_or_default(),
            (Cell::Flag(flag), CellValue::Flag(value)) => *flag = value,
            (Cell::Flag(flag), CellValue::Text(text)) => *flag = parse_flag(&text),
            (Cell::Flag(flag), CellValue::Choice(choice)) => {
                *flag = choice.as_deref().is_some_and(parse_flag)
            }
            (Cell::Choice(tracker), CellValue::Choice(choice)) => {
                tracker.select(choice);
            }
            (Cell::Choice(tracker), CellValue::Text(text)) => {
                tracker.select(Some(text));
            }
            (Cell::Choice(_), CellValue::Flag(_)) => {
                tracing::trace!(target: targets::ROW, column, "ignoring flag written to choice column");
            }
        }
    }

    /// Disposes the trackers of all choice cells.
    ///
    /// Call this when the row is removed from its table.
    pub fn dispose(&self) {
        for cell in &self.cells {
            if let Cell::Choice(tracker) = cell {
                tracker.dispose();
            }
        }
    }
}

fn parse_flag(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case("true")
}
