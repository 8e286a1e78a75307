use paramgen_core::{ConfigNode, Mapping};

/// Parse a JSON literal into a tree, panicking on malformed input.
pub fn node(json: &str) -> ConfigNode {
    ConfigNode::from_json_str(json).expect("fixture json")
}

/// Parse a JSON object literal into a mapping.
pub fn mapping(json: &str) -> Mapping {
    match node(json) {
        ConfigNode::Mapping(mapping) => mapping,
        other => panic!("fixture is a {}, not a mapping", other.kind()),
    }
}

/// Compact JSON rendering, handy for order-sensitive assertions.
pub fn render(node: &ConfigNode) -> String {
    serde_json::to_string(node).expect("render")
}
