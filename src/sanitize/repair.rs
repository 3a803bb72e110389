//! Structural repairs on the node tree
//!
//! All repairs are idempotent: running them on their own output changes
//! nothing.

use crate::dom::Node;

/// Wrap rows that sit directly under a `table` into one `tbody`
pub fn wrap_loose_rows(table: &mut Node) {
    if !table.children.iter().any(|c| c.is_tag("tr")) {
        return;
    }

    let mut tbody = Node::element("tbody");
    let mut kept = Vec::with_capacity(table.children.len());
    let mut slot = None;
    for child in std::mem::take(&mut table.children) {
        if child.is_tag("tr") {
            slot.get_or_insert(kept.len());
            tbody.add_child(child);
        } else {
            kept.push(child);
        }
    }
    if let Some(at) = slot {
        kept.insert(at, tbody);
    }
    table.children = kept;
}

fn is_header_row(row: &Node) -> bool {
    let mut cells = row.children_elements().peekable();
    cells.peek().is_some() && cells.all(|c| c.is_tag("th"))
}

/// Move a header-only first row into a synthesized `thead`
pub fn synthesize_thead(table: &mut Node) {
    if table.children.iter().any(|c| c.is_tag("thead")) {
        return;
    }

    let Some(section_idx) = table
        .children
        .iter()
        .position(|c| c.is_tag("tbody") || c.is_tag("tr") || c.is_tag("tfoot"))
    else {
        return;
    };
    if table.children[section_idx].is_tag("tfoot") {
        return;
    }

    let header = if table.children[section_idx].is_tag("tr") {
        if !is_header_row(&table.children[section_idx]) {
            return;
        }
        table.children.remove(section_idx)
    } else {
        let tbody = &mut table.children[section_idx];
        let Some(row_idx) = tbody.children.iter().position(|c| c.is_tag("tr")) else {
            return;
        };
        if !is_header_row(&tbody.children[row_idx]) {
            return;
        }
        let row = tbody.children.remove(row_idx);
        if !tbody.children.iter().any(Node::is_element) {
            table.children.remove(section_idx);
        }
        row
    };

    table
        .children
        .insert(section_idx, Node::element_with("thead", vec![header]));
}

/// Wrap the content of a `pre` without any nested `code` in one
pub fn wrap_pre_code(pre: &mut Node) {
    if pre.find_first("code").is_some() {
        return;
    }
    let children = std::mem::take(&mut pre.children);
    pre.children = vec![Node::element_with("code", children)];
}

/// Apply the table and `pre` repairs to every matching element in the tree
pub fn repair_tree(node: &mut Node, rows_only: bool) {
    for child in &mut node.children {
        repair_tree(child, rows_only);
    }
    if node.is_tag("table") {
        if !rows_only {
            synthesize_thead(node);
        }
        wrap_loose_rows(node);
    } else if node.is_tag("pre") && !rows_only {
        wrap_pre_code(node);
    }
}
