//! Builds an index from a small JSON record set and prints each query.
//!
//! Run with `RUST_LOG=hierindex=debug` to see construction events.

use hierindex::{records_table, HierarchicalIndex, Key};
use tracing_subscriber::EnvFilter;

const ITEMS: &str = r#"[
    {"id": 1, "parent": "root", "type": null},
    {"id": 2, "parent": 1, "type": "test"},
    {"id": 3, "parent": 1, "type": "test"},
    {"id": 4, "parent": 2, "type": "test"},
    {"id": 5, "parent": 2, "type": "test"},
    {"id": 6, "parent": 2, "type": "test"},
    {"id": 7, "parent": 4, "type": null},
    {"id": 8, "parent": 4, "type": null}
]"#;

fn main() -> hierindex::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let index = HierarchicalIndex::from_json_str(ITEMS)?;

    println!("getAll()\n{index}");

    match index.get_item(&Key::Int(3)) {
        Some(item) => println!("getItem(3)\n{}", records_table(&[item])),
        None => println!("getItem(3)\nnot found"),
    }

    println!(
        "getChildren(4)\n{}",
        records_table(&index.get_children(&Key::Int(4)))
    );
    println!(
        "getChildren(5)\n{}",
        records_table(&index.get_children(&Key::Int(5)))
    );
    println!(
        "getAllDescendants(2)\n{}",
        records_table(&index.get_all_descendants(&Key::Int(2)))
    );
    println!(
        "getAllAncestors(7)\n{}",
        records_table(&index.get_all_ancestors(&Key::Int(7)))
    );

    let bad = r#"[{"id": 1, "parent": null}, {"id": true, "parent": 1}]"#;
    if let Err(err) = HierarchicalIndex::from_json_str(bad) {
        println!("rejected: {err}");
    }

    Ok(())
}
