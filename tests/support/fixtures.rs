use std::fs;
use std::path::PathBuf;

use mqa::graph::{parse_graph, Graph, GraphFormat};

pub fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

pub fn load_fixture(name: &str) -> String {
    let path = fixture_path(name);
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to load fixture '{}' from {:?}: {}", name, path, e))
}

pub fn load_catalog(name: &str) -> Graph {
    parse_graph(&load_fixture(name), GraphFormat::Turtle)
        .unwrap_or_else(|e| panic!("Failed to parse fixture '{}': {}", name, e))
}
