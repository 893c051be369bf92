//! Integration tests for the arena tree, document view and path keys.

use gleaner_dom::{
    Attributes, Document, DomTree, ElementData, NodeId, NodeType, PathKey, PathSegment, RawData,
    RawKind, TextContent,
};

fn element(tag: &str) -> NodeType {
    NodeType::Element(ElementData {
        tag_name: tag.to_string(),
        attrs: Attributes::new(),
    })
}

/// `<div><p>one</p><p>two</p><!--c--><script>x</script></div>`
fn sample() -> (DomTree, NodeId) {
    let mut tree = DomTree::new();
    let div = tree.alloc(element("div"));
    tree.append_child(NodeId::ROOT, div);
    for word in ["one", "two"] {
        let p = tree.alloc(element("p"));
        tree.append_child(div, p);
        let text = tree.alloc(NodeType::Text(word.to_string()));
        tree.append_child(p, text);
    }
    let comment = tree.alloc(NodeType::Comment("c".to_string()));
    tree.append_child(div, comment);
    let script = tree.alloc(NodeType::Raw(RawData {
        kind: RawKind::Script,
        text: "x".to_string(),
    }));
    tree.append_child(div, script);
    (tree, div)
}

fn paths_for(tree: &DomTree) -> Vec<PathKey> {
    (0..tree.len())
        .map(|i| PathKey::root().child("n", i))
        .collect()
}

#[test]
fn test_sibling_links() {
    let (tree, div) = sample();
    let children = tree.children(div).to_vec();
    assert_eq!(children.len(), 4);
    assert_eq!(tree.first_child(div), Some(children[0]));
    assert_eq!(tree.last_child(div), Some(children[3]));
    assert_eq!(tree.next_sibling(children[0]), Some(children[1]));
    assert_eq!(tree.prev_sibling(children[1]), Some(children[0]));
    assert_eq!(tree.prev_sibling(children[0]), None);
    assert_eq!(tree.parent(children[2]), Some(div));
    assert_eq!(tree.top_level_elements().collect::<Vec<_>>(), [div]);
}

#[test]
fn test_descendants_pre_order() {
    let (tree, div) = sample();
    let labels: Vec<&str> = tree
        .descendants(div)
        .map(|id| tree.get(id).unwrap().node_type.label())
        .collect();
    assert_eq!(
        labels,
        ["#element", "#element", "#text", "#element", "#text", "#comment", "#script"]
    );
}

#[test]
fn test_ancestors_and_descendant_check() {
    let (tree, div) = sample();
    let text = tree.descendants(div).find(|&id| tree.as_text(id).is_some()).unwrap();
    let chain: Vec<NodeId> = tree.ancestors(text).collect();
    assert_eq!(chain.last(), Some(&NodeId::ROOT));
    assert!(tree.is_descendant_of(text, div));
    assert!(!tree.is_descendant_of(div, text));
}

#[test]
fn test_text_content_skips_comments_and_raw() {
    let (tree, div) = sample();
    let paths = paths_for(&tree);
    let document = Document::new(tree, div, paths);
    assert_eq!(document.root_ref().text_content(), "one two");
    assert_eq!(document.text_content(), "one two");
}

#[test]
fn test_node_ref_navigation() {
    let (tree, div) = sample();
    let paths = paths_for(&tree);
    let document = Document::new(tree, div, paths);
    let root = document.root_ref();
    assert_eq!(root.name(), Some("div"));
    assert_eq!(root.children().count(), 4);
    assert_eq!(root.element_children().count(), 2);
    let first_p = root.element_children().next().unwrap();
    assert_eq!(first_p.parent().map(|p| p.id()), Some(div));
    assert_eq!(document.find_element("p").map(|p| p.id()), Some(first_p.id()));
    assert!(document.find_element("table").is_none());
}

#[test]
fn test_attributes_first_wins() {
    let mut attrs = Attributes::new();
    assert!(attrs.insert_if_absent("href".to_string(), "a".to_string()));
    assert!(!attrs.insert_if_absent("href".to_string(), "b".to_string()));
    assert_eq!(attrs.get("href"), Some("a"));
    assert_eq!(attrs.get_ignore_ascii_case("HREF"), Some("a"));
    assert_eq!(attrs.set("href".to_string(), "c".to_string()), Some("a".to_string()));
    assert_eq!(attrs.len(), 1);
}

#[test]
fn test_attributes_serialize_in_order() {
    let attrs: Attributes = [("b", "1"), ("a", "2")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let json = serde_json::to_string(&attrs).unwrap();
    assert_eq!(json, r#"{"b":"1","a":"2"}"#);
}

#[test]
fn test_path_key_relations() {
    let body = PathKey::from_segments(vec![
        PathSegment::new("html", 0),
        PathSegment::new("body", 1),
    ]);
    let para = body.child("p", 3);
    assert_eq!(para.to_string(), "html[0]/body[1]/p[3]");
    assert_eq!(PathKey::root().to_string(), "/");
    assert!(body.is_ancestor_of(&para));
    assert!(!para.is_ancestor_of(&body));
    assert_eq!(para.parent(), Some(body.clone()));
    assert_eq!(body.common_prefix_len(&para), 2);
    assert_eq!(PathKey::root().parent(), None);
}
