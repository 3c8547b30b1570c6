//! Template dependency graph.
//!
//! Dependencies are declarative: the graph is only checked for unknown
//! references and cycles. Installs never reorder or pull in templates based
//! on it.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::manifest::Manifest;

/// Directed graph from each template to the templates it depends on.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    edges: BTreeMap<String, Vec<String>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_manifest(manifest: &Manifest) -> Self {
        let mut graph = Self::new();
        for template in &manifest.templates {
            graph.add_node(&template.name, template.dependencies.iter().cloned());
        }
        graph
    }

    /// Add a node with its outgoing edges. A repeated node accumulates edges.
    pub fn add_node(&mut self, name: &str, dependencies: impl IntoIterator<Item = String>) {
        self.edges
            .entry(name.to_string())
            .or_default()
            .extend(dependencies);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.edges.contains_key(name)
    }

    pub fn dependencies_of(&self, name: &str) -> &[String] {
        self.edges.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every `(template, dependency)` pair whose dependency is not a node.
    pub fn missing_dependencies(&self) -> Vec<(String, String)> {
        let mut missing = BTreeSet::new();
        for (name, deps) in &self.edges {
            for dep in deps {
                if !self.edges.contains_key(dep) {
                    missing.insert((name.clone(), dep.clone()));
                }
            }
        }
        missing.into_iter().collect()
    }

    /// All distinct cycles, found with a visited + recursion-stack DFS.
    ///
    /// Each cycle is rotated to start at its smallest member and closes by
    /// repeating that member, e.g. `["a", "b", "a"]`.
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        let mut visited = HashSet::new();
        let mut stack = Vec::new();
        let mut on_stack = HashSet::new();
        let mut cycles = BTreeSet::new();

        for start in self.edges.keys() {
            if !visited.contains(start.as_str()) {
                self.visit(start, &mut visited, &mut stack, &mut on_stack, &mut cycles);
            }
        }
        cycles.into_iter().collect()
    }

    pub fn has_cycles(&self) -> bool {
        !self.find_cycles().is_empty()
    }

    fn visit<'a>(
        &'a self,
        node: &'a str,
        visited: &mut HashSet<&'a str>,
        stack: &mut Vec<&'a str>,
        on_stack: &mut HashSet<&'a str>,
        cycles: &mut BTreeSet<Vec<String>>,
    ) {
        visited.insert(node);
        stack.push(node);
        on_stack.insert(node);

        for dep in self.dependencies_of(node) {
            let dep = dep.as_str();
            if on_stack.contains(dep) {
                if let Some(pos) = stack.iter().position(|n| *n == dep) {
                    cycles.insert(canonical_cycle(&stack[pos..]));
                }
            } else if !visited.contains(dep) && self.edges.contains_key(dep) {
                self.visit(dep, visited, stack, on_stack, cycles);
            }
        }

        stack.pop();
        on_stack.remove(node);
    }
}

fn canonical_cycle(members: &[&str]) -> Vec<String> {
    let start = members
        .iter()
        .enumerate()
        .min_by_key(|(_, name)| **name)
        .map(|(i, _)| i)
        .unwrap_or(0);
    let mut cycle: Vec<String> = members[start..]
        .iter()
        .chain(&members[..start])
        .map(|s| s.to_string())
        .collect();
    if let Some(first) = cycle.first().cloned() {
        cycle.push(first);
    }
    cycle
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn graph(edges: &[(&str, &[&str])]) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for (name, deps) in edges {
            graph.add_node(name, deps.iter().map(|d| d.to_string()));
        }
        graph
    }

    #[test]
    fn acyclic_graph_has_no_cycles() {
        let g = graph(&[("base", &[]), ("ext", &["base"]), ("top", &["ext", "base"])]);
        assert!(!g.has_cycles());
        assert!(g.missing_dependencies().is_empty());
    }

    #[test]
    fn two_node_cycle() {
        let g = graph(&[("b", &["a"]), ("a", &["b"])]);
        assert_eq!(g.find_cycles(), vec![vec!["a", "b", "a"]]);
    }

    #[test]
    fn self_loop() {
        let g = graph(&[("solo", &["solo"])]);
        assert_eq!(g.find_cycles(), vec![vec!["solo", "solo"]]);
    }

    #[test]
    fn disjoint_cycles_are_all_reported() {
        let g = graph(&[
            ("a", &["b"]),
            ("b", &["a"]),
            ("x", &["y"]),
            ("y", &["z"]),
            ("z", &["x"]),
            ("free", &["a"]),
        ]);
        assert_eq!(
            g.find_cycles(),
            vec![vec!["a", "b", "a"], vec!["x", "y", "z", "x"]]
        );
    }

    #[test]
    fn missing_dependencies_are_named() {
        let g = graph(&[("ext", &["base", "ghost"]), ("base", &[])]);
        assert_eq!(
            g.missing_dependencies(),
            vec![("ext".to_string(), "ghost".to_string())]
        );
    }

    #[test]
    fn dependencies_of_unknown_is_empty() {
        assert!(DependencyGraph::new().dependencies_of("nope").is_empty());
    }
}
