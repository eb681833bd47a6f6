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

//! Reconciliation of the collected artifacts into one table.

use tracetool_common::types::{ExecutionOrder, LineOutputMap, SnapshotLog, TraceTable, VariableUniverse};
use tracing::{debug, warn};

use crate::error::{TraceError, TraceResult};

/// Merges execution order, snapshots and output into a [`TraceTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceTableBuilder {
    offset: usize,
}

impl TraceTableBuilder {
    /// Builder pairing row `i` with snapshot `i + offset`
    pub fn new(offset: usize) -> Self {
        Self { offset }
    }

    /// Snapshots skipped before the first row
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Build the table, one row per entry of `order`.
    ///
    /// Fails with [`TraceError::Divergence`] when fewer than `order.len()`
    /// snapshots remain after the offset.
    pub fn build(
        &self,
        order: &ExecutionOrder,
        snapshots: &SnapshotLog,
        outputs: &LineOutputMap,
    ) -> TraceResult<TraceTable> {
        let available = snapshots.len().saturating_sub(self.offset);
        if available < order.len() {
            warn!(needed = order.len(), available, offset = self.offset, "Snapshot log diverged from execution order");
            return Err(TraceError::Divergence { needed: order.len(), available, offset: self.offset });
        }

        let universe = VariableUniverse::from_snapshots(snapshots);
        let mut table = TraceTable::new(&universe);
        for (snapshot, &line) in snapshots.iter().skip(self.offset).zip(order.iter()) {
            table.push_row(line, |var| snapshot.get(var), outputs.output_for(line));
        }
        debug!(rows = table.len(), columns = table.width(), "Built trace table");
        Ok(table)
    }
}
