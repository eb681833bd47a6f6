// tracetool - Execution Trace Tables
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

use super::{LineNumber, SnapshotLog};
use crate::grid::render_grid;

/// Header of the line-number column
pub const LINE_COLUMN: &str = "Line";
/// Header of the output column
pub const OUTPUT_COLUMN: &str = "OUTPUT";

/// Every scoped variable name observed across a run, sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableUniverse(BTreeSet<String>);

impl VariableUniverse {
    /// Union of the names captured in every snapshot of `log`
    pub fn from_snapshots(log: &SnapshotLog) -> Self {
        Self(log.iter().flat_map(|snapshot| snapshot.names().map(str::to_owned)).collect())
    }

    /// Names in column order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of distinct names
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no variable was ever captured
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One body row: a line event with the variables and output attributed to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceRow {
    /// Line number that executed
    pub line: LineNumber,
    /// Rendered value per variable column, empty when not captured
    pub values: Vec<String>,
    /// Output attributed to the line, empty when there is none
    pub output: String,
}

impl TraceRow {
    /// All cells of the row: line, each variable, output
    pub fn cells(&self) -> Vec<String> {
        let mut cells = Vec::with_capacity(self.values.len() + 2);
        cells.push(self.line.to_string());
        cells.extend(self.values.iter().cloned());
        cells.push(self.output.clone());
        cells
    }
}

/// The merged trace table.
///
/// The column set is fixed when the table is created and every row is built
/// by the table itself, so each row has exactly `2 + variables` cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceTable {
    variables: Vec<String>,
    rows: Vec<TraceRow>,
}

impl TraceTable {
    /// Create an empty table whose variable columns are `universe`, in order
    pub fn new(universe: &VariableUniverse) -> Self {
        Self { variables: universe.iter().map(str::to_owned).collect(), rows: Vec::new() }
    }

    /// Append a row for `line`. `lookup` yields the rendered value of a
    /// variable column; columns it does not know are left empty.
    pub fn push_row<'a>(
        &mut self,
        line: LineNumber,
        lookup: impl Fn(&str) -> Option<&'a str>,
        output: &str,
    ) {
        let values =
            self.variables.iter().map(|var| lookup(var).unwrap_or_default().to_owned()).collect();
        self.rows.push(TraceRow { line, values, output: output.to_owned() });
    }

    /// Header row: `Line`, each variable, `OUTPUT`
    pub fn header(&self) -> Vec<String> {
        let mut header = Vec::with_capacity(self.width());
        header.push(LINE_COLUMN.to_owned());
        header.extend(self.variables.iter().cloned());
        header.push(OUTPUT_COLUMN.to_owned());
        header
    }

    /// Variable column names in order
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Body rows in execution order
    pub fn rows(&self) -> &[TraceRow] {
        &self.rows
    }

    /// Number of cells in every row
    pub fn width(&self) -> usize {
        self.variables.len() + 2
    }

    /// Number of body rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no body rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rendered value of `variable` in body row `row`
    pub fn value(&self, row: usize, variable: &str) -> Option<&str> {
        let column = self.variables.iter().position(|v| v == variable)?;
        self.rows.get(row).map(|r| r.values[column].as_str())
    }

    /// Header followed by every body row, as plain cells
    pub fn to_rows(&self) -> Vec<Vec<String>> {
        std::iter::once(self.header()).chain(self.rows.iter().map(TraceRow::cells)).collect()
    }

    /// Grid rendition of the whole table
    pub fn render(&self) -> String {
        render_grid(&self.to_rows(), true)
    }

    /// Serialize the table to JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for TraceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
