//! Explicit task graph for release builds.
//!
//! The release build is a directed acyclic graph with declared dependencies
//! rather than an implicit call sequence, so the before/after guarantees
//! are inspectable: each task runs only after everything it depends on has
//! finished writing to disk.

use crate::error::{Error, Result};
use crate::report::TaskReport;
use crate::{clean, dist, images, scripts, sources, styles};
use kiln_config::KilnConfig;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

/// A named pipeline task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    /// Empty the dist directory
    CleanDist,
    /// Compile, concatenate, prefix and minify stylesheets
    Styles,
    /// Concatenate and minify scripts
    Scripts,
    /// Optimize changed images
    Images,
    /// Assemble the distributable tree
    Dist,
}

impl Task {
    /// Task name as shown in logs and summaries.
    pub fn name(&self) -> &'static str {
        match self {
            Task::CleanDist => "clean-dist",
            Task::Styles => "styles",
            Task::Scripts => "scripts",
            Task::Images => "images",
            Task::Dist => "dist",
        }
    }

    /// Run this task against a project.
    pub fn run(&self, config: &KilnConfig, root: &Path) -> Result<TaskReport> {
        match self {
            Task::CleanDist => {
                let started = Instant::now();
                clean::clean_tree(&sources::resolve(&config.dist_dir, root))?;
                let mut report = TaskReport::new("clean-dist");
                report.duration = started.elapsed();
                Ok(report)
            }
            Task::Styles => styles::build(config, root),
            Task::Scripts => scripts::build(config, root),
            Task::Images => images::build(config, root),
            Task::Dist => dist::assemble(config, root),
        }
    }
}

/// A task graph with declared dependencies.
#[derive(Debug, Default)]
pub struct TaskGraph {
    graph: DiGraph<Task, ()>,
    nodes: HashMap<Task, NodeIndex>,
}

impl TaskGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task (idempotent).
    pub fn add_task(&mut self, task: Task) -> NodeIndex {
        match self.nodes.get(&task) {
            Some(&index) => index,
            None => {
                let index = self.graph.add_node(task);
                self.nodes.insert(task, index);
                index
            }
        }
    }

    /// Declare that `task` must run after `dependency`.
    pub fn add_dependency(&mut self, task: Task, dependency: Task) {
        let task_index = self.add_task(task);
        let dep_index = self.add_task(dependency);
        self.graph.add_edge(dep_index, task_index, ());
    }

    /// Topological execution order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GraphCycle`] when the declared dependencies contain
    /// a cycle.
    pub fn execution_order(&self) -> Result<Vec<Task>> {
        let order = toposort(&self.graph, None)
            .map_err(|cycle| Error::GraphCycle(self.graph[cycle.node_id()].name().to_string()))?;
        Ok(order.into_iter().map(|index| self.graph[index]).collect())
    }

    /// Run all tasks in dependency order, strictly sequentially.
    ///
    /// Each task's output is fully on disk before the next starts; the
    /// reports come back in execution order.
    pub fn run(&self, config: &KilnConfig, root: &Path) -> Result<Vec<TaskReport>> {
        let mut reports = Vec::new();
        for task in self.execution_order()? {
            tracing::info!(task = task.name(), "running");
            reports.push(task.run(config, root)?);
        }
        Ok(reports)
    }

    /// The release build: clean, then styles, scripts, images, dist in
    /// strict sequence.
    pub fn release_build() -> Self {
        let mut graph = Self::new();
        graph.add_dependency(Task::Styles, Task::CleanDist);
        graph.add_dependency(Task::Scripts, Task::Styles);
        graph.add_dependency(Task::Images, Task::Scripts);
        graph.add_dependency(Task::Dist, Task::Images);
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_build_order() {
        let order = TaskGraph::release_build().execution_order().unwrap();
        assert_eq!(
            order,
            vec![
                Task::CleanDist,
                Task::Styles,
                Task::Scripts,
                Task::Images,
                Task::Dist,
            ]
        );
    }

    #[test]
    fn test_cycle_is_detected() {
        let mut graph = TaskGraph::new();
        graph.add_dependency(Task::Styles, Task::Scripts);
        graph.add_dependency(Task::Scripts, Task::Styles);
        let err = graph.execution_order().unwrap_err();
        assert!(matches!(err, Error::GraphCycle(_)));
    }

    #[test]
    fn test_add_task_is_idempotent() {
        let mut graph = TaskGraph::new();
        let a = graph.add_task(Task::Styles);
        let b = graph.add_task(Task::Styles);
        assert_eq!(a, b);
    }

    #[test]
    fn test_dependencies_order_independent_tasks_stably() {
        // A diamond: dist depends on both builders, either order is legal
        let mut graph = TaskGraph::new();
        graph.add_dependency(Task::Dist, Task::Styles);
        graph.add_dependency(Task::Dist, Task::Scripts);
        let order = graph.execution_order().unwrap();
        assert_eq!(order.last(), Some(&Task::Dist));
        assert_eq!(order.len(), 3);
    }
}
