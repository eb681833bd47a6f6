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

//! Plain-text grid tables.
//!
//! Produces the familiar boxed layout:
//!
//! ```text
//! +------+-----+
//! | Line | x   |
//! +======+=====+
//! | 1    | 5   |
//! +------+-----+
//! ```
//!
//! Cells may span several lines; every row is as tall as its tallest cell.
//! Ragged rows are padded with empty cells so the grid is always rectangular.

use itertools::Itertools;

/// Render `rows` as a grid. When `has_header` is set the first row is treated
/// as a header and separated from the body by a `=` rule.
pub fn render_grid<S: AsRef<str>>(rows: &[Vec<S>], has_header: bool) -> String {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    if columns == 0 {
        return String::new();
    }

    let split: Vec<Vec<Vec<&str>>> = rows
        .iter()
        .map(|row| {
            (0..columns)
                .map(|col| row.get(col).map(|cell| cell.as_ref().split('\n').collect()).unwrap_or_else(|| vec![""]))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = (0..columns)
        .map(|col| {
            split
                .iter()
                .flat_map(|row| row[col].iter())
                .map(|line| line.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let rule = |fill: char| -> String {
        let body = widths.iter().map(|w| fill.to_string().repeat(w + 2)).join("+");
        format!("+{body}+")
    };

    let mut out = vec![rule('-')];
    for (index, row) in split.iter().enumerate() {
        let height = row.iter().map(Vec::len).max().unwrap_or(1);
        for line in 0..height {
            let cells = row
                .iter()
                .zip(&widths)
                .map(|(cell, width)| {
                    let text = cell.get(line).copied().unwrap_or("");
                    let pad = width - text.chars().count();
                    format!(" {text}{} ", " ".repeat(pad))
                })
                .join("|");
            out.push(format!("|{cells}|"));
        }
        out.push(if has_header && index == 0 { rule('=') } else { rule('-') });
    }

    out.join("\n")
}
