use std::fmt::Write;

use gleaner_dom::{DomTree, NodeId, NodeType};

/// Render the subtree at `id`, one node per line, two spaces per level.
#[must_use]
pub fn render_tree(tree: &DomTree, id: NodeId) -> String {
    let mut out = String::new();
    render_into(tree, id, 0, &mut out);
    out
}

/// Print the subtree at `id` to stdout.
pub fn print_tree(tree: &DomTree, id: NodeId, indent: usize) {
    let mut out = String::new();
    render_into(tree, id, indent, &mut out);
    print!("{out}");
}

fn render_into(tree: &DomTree, id: NodeId, indent: usize, out: &mut String) {
    let Some(node) = tree.get(id) else {
        return;
    };
    let prefix = "  ".repeat(indent);
    let _ = match &node.node_type {
        NodeType::Document => writeln!(out, "{prefix}Document"),
        NodeType::Element(data) => {
            if data.attrs.is_empty() {
                writeln!(out, "{prefix}<{}>", data.tag_name)
            } else {
                let attrs: Vec<String> = data
                    .attrs
                    .iter()
                    .map(|(k, v)| {
                        if v.is_empty() {
                            k.to_string()
                        } else {
                            format!("{k}=\"{v}\"")
                        }
                    })
                    .collect();
                writeln!(out, "{prefix}<{} {}>", data.tag_name, attrs.join(" "))
            }
        }
        NodeType::Text(text) => writeln!(out, "{prefix}\"{text}\""),
        NodeType::Comment(text) => writeln!(out, "{prefix}<!--{text}-->"),
        NodeType::Raw(raw) => writeln!(
            out,
            "{prefix}[{}: {} chars]",
            raw.kind.tag_name(),
            raw.text.chars().count()
        ),
    };
    for &child in tree.children(id) {
        render_into(tree, child, indent + 1, out);
    }
}
