//! Console rendering of records and indices.

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use serde::Serialize;
use std::fmt;

use crate::index::HierarchicalIndex;
use crate::key::Key;
use crate::record::Record;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn payload_cell<P: Serialize>(payload: &P) -> String {
    serde_json::to_string(payload).unwrap_or_else(|_| "<unprintable>".to_string())
}

fn parent_cell(parent: Option<&Key>) -> String {
    match parent {
        Some(parent) => parent.to_string(),
        None => "null".to_string(),
    }
}

/// Render a query result as a table of id, parent and payload.
pub fn records_table<P: Serialize>(records: &[&Record<P>]) -> Table {
    let mut table = new_table(vec!["id", "parent", "payload"]);
    for record in records {
        table.add_row(vec![
            record.id.to_string(),
            parent_cell(record.parent.as_ref()),
            payload_cell(&record.payload),
        ]);
    }
    table
}

impl<P: Serialize> HierarchicalIndex<P> {
    /// Every record with its depth, in `get_all` order.
    pub fn to_table(&self) -> Table {
        let mut table = new_table(vec!["id", "parent", "depth", "payload"]);
        for record in self.get_all() {
            let depth = self
                .depth(&record.id)
                .map(|d| d.to_string())
                .unwrap_or_default();
            table.add_row(vec![
                record.id.to_string(),
                parent_cell(record.parent.as_ref()),
                depth,
                payload_cell(&record.payload),
            ]);
        }
        table
    }
}

impl<P: Serialize> fmt::Display for HierarchicalIndex<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_table())
    }
}
