//! Column dependency ordering
//!
//! Columns may read already-scrubbed values of sibling columns (an email
//! seeded from a scrubbed full name, for example). This module orders a
//! table's columns so every column comes after the columns it depends on.
//!
//! The sort is a depth-first post-order walk. Roots are visited in declaration
//! order, so identical input always yields the identical order.

use crate::domain::{Result, ScrubError};
use std::collections::HashMap;

/// Orders `nodes` so that dependencies come first
///
/// Each node is `(name, dependencies)`. Dependencies naming something that is
/// not a node are ignored. Returns indexes into `nodes`.
///
/// # Errors
///
/// Returns [`ScrubError::CircularDependency`] naming the first column found on
/// the active recursion stack. A column depending on itself is a cycle too.
///
/// # Examples
///
/// ```
/// use scrub::scrub::dependency::dependency_order;
///
/// let nodes = vec![
///     ("email", vec!["fullname"]),
///     ("fullname", vec![]),
/// ];
/// let order = dependency_order("users", &nodes).unwrap();
/// assert_eq!(order, vec![1, 0]);
/// ```
pub fn dependency_order<N: AsRef<str>>(table: &str, nodes: &[(N, Vec<N>)]) -> Result<Vec<usize>> {
    let index: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, (name, _))| (name.as_ref(), i))
        .collect();

    let edges: Vec<Vec<usize>> = nodes
        .iter()
        .map(|(_, deps)| {
            deps.iter()
                .filter_map(|d| index.get(d.as_ref()).copied())
                .collect()
        })
        .collect();

    let mut walk = Walk {
        table,
        nodes,
        edges: &edges,
        visited: vec![false; nodes.len()],
        on_stack: vec![false; nodes.len()],
        sorted: Vec::with_capacity(nodes.len()),
    };

    for node in 0..nodes.len() {
        walk.visit(node)?;
    }

    Ok(walk.sorted)
}

struct Walk<'a, N> {
    table: &'a str,
    nodes: &'a [(N, Vec<N>)],
    edges: &'a [Vec<usize>],
    visited: Vec<bool>,
    on_stack: Vec<bool>,
    sorted: Vec<usize>,
}

impl<N: AsRef<str>> Walk<'_, N> {
    fn visit(&mut self, node: usize) -> Result<()> {
        if self.visited[node] {
            return Ok(());
        }
        if self.on_stack[node] {
            return Err(ScrubError::CircularDependency {
                table: self.table.to_string(),
                column: self.nodes[node].0.as_ref().to_string(),
            });
        }

        self.on_stack[node] = true;
        for &dep in &self.edges[node] {
            self.visit(dep)?;
        }
        self.on_stack[node] = false;
        self.visited[node] = true;
        self.sorted.push(node);

        Ok(())
    }
}
