//! Evaluation order of the dependency table
//!
//! This module provides functions to:
//! - Build an explicit graph between dependency rows from name references
//! - Assign every row its hierarchy (execution layer) by peeling layers
//!   with Kahn's algorithm
//! - Order the rows by hierarchy, keeping declaration order within a layer

use std::collections::{BTreeSet, HashMap, HashSet};

use super::error::{ImportError, Result, fmt_names};
use super::table::Table;
use super::value::Value;

/// A dependency row as seen by the resolver
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyRow {
    /// Position in the dependency table
    pub index: usize,
    pub destination: String,
    pub argument_1: Value,
    pub argument_2: Value,
}

impl DependencyRow {
    pub fn new(index: usize, destination: &str, argument_1: Value, argument_2: Value) -> Self {
        Self {
            index,
            destination: destination.to_string(),
            argument_1,
            argument_2,
        }
    }

    /// Read all rows of a validated dependency table
    pub fn from_table(table: &Table) -> Vec<Self> {
        (0..table.len())
            .map(|idx| {
                let cell = |column: &str| table.cell(idx, column).cloned().unwrap_or_default();
                DependencyRow {
                    index: idx,
                    destination: cell("destination").label(),
                    argument_1: cell("argument_1"),
                    argument_2: cell("argument_2"),
                }
            })
            .collect()
    }

    fn arguments(&self) -> [&Value; 2] {
        [&self.argument_1, &self.argument_2]
    }
}

/// An argument is directly resolvable when it is a known input or a number
pub fn is_resolvable(argument: &Value, known_inputs: &HashSet<String>) -> bool {
    argument.is_numeric() || known_inputs.contains(&argument.label())
}

/// Reference graph between dependency rows
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    rows: Vec<DependencyRow>,
    /// Rows whose arguments are both directly resolvable
    seeded: Vec<bool>,
    /// row -> rows whose destination it references
    dependencies: Vec<BTreeSet<usize>>,
    /// row -> rows referencing its destination
    dependents: Vec<BTreeSet<usize>>,
}

impl DependencyGraph {
    /// Build the graph; `known_inputs` are the fixed, internal and external input names
    pub fn build(rows: Vec<DependencyRow>, known_inputs: &HashSet<String>) -> Self {
        let mut by_destination: HashMap<&str, Vec<usize>> = HashMap::new();
        for (idx, row) in rows.iter().enumerate() {
            by_destination
                .entry(row.destination.as_str())
                .or_default()
                .push(idx);
        }

        let mut seeded = Vec::with_capacity(rows.len());
        let mut dependencies = vec![BTreeSet::new(); rows.len()];
        let mut dependents = vec![BTreeSet::new(); rows.len()];

        for (idx, row) in rows.iter().enumerate() {
            let pending: Vec<&Value> = row
                .arguments()
                .into_iter()
                .filter(|arg| !is_resolvable(arg, known_inputs))
                .collect();
            seeded.push(pending.is_empty());

            for argument in pending {
                let Some(sources) = by_destination.get(argument.label().as_str()) else {
                    continue;
                };
                // Don't include self-references
                for &source in sources.iter().filter(|&&s| s != idx) {
                    dependencies[idx].insert(source);
                    dependents[source].insert(idx);
                }
            }
        }

        Self {
            rows,
            seeded,
            dependencies,
            dependents,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows whose destination `row` references
    pub fn dependencies_of(&self, row: usize) -> &BTreeSet<usize> {
        &self.dependencies[row]
    }

    /// Hierarchy of `row` given the hierarchies of all its dependencies
    ///
    /// Seeded rows are layer 1. Any other row sits one layer above its
    /// highest dependency, and never below 2. A row waiting on two rows of
    /// the same layer is therefore one layer above them, not two: in a
    /// diamond `a <- {b, c} <- d` the layers are 1, 2, 2, 3.
    fn level_of(&self, row: usize, hierarchy: &[Option<u32>]) -> u32 {
        if self.seeded[row] {
            return 1;
        }
        let highest = self.dependencies[row]
            .iter()
            .filter_map(|&dep| hierarchy[dep])
            .max()
            .unwrap_or(1);
        (highest + 1).max(2)
    }

    /// Next frontier: rows whose last unresolved dependency is in `frontier`
    fn release(&self, frontier: &[usize], remaining: &mut [usize]) -> Vec<usize> {
        let mut next = BTreeSet::new();
        for &row in frontier {
            for &dependent in &self.dependents[row] {
                remaining[dependent] -= 1;
                if remaining[dependent] == 0 {
                    next.insert(dependent);
                }
            }
        }
        next.into_iter().collect()
    }

    /// Assign a hierarchy to every row using Kahn's algorithm
    pub fn hierarchies(&self) -> std::result::Result<Vec<u32>, CycleError> {
        let mut remaining: Vec<usize> = self.dependencies.iter().map(BTreeSet::len).collect();
        let mut hierarchy: Vec<Option<u32>> = vec![None; self.rows.len()];

        // Start with rows that depend on no other row
        let mut frontier: Vec<usize> = (0..self.rows.len())
            .filter(|&row| remaining[row] == 0)
            .collect();
        let mut steps = 0;

        while !frontier.is_empty() {
            for &row in &frontier {
                hierarchy[row] = Some(self.level_of(row, &hierarchy));
            }
            frontier = self.release(&frontier, &mut remaining);
            steps += 1;
        }
        log::debug!("Hierarchy calculated in {} iterations", steps);

        // Rows never released are part of (or wait on) a cycle
        let unresolved: Vec<usize> = (0..self.rows.len())
            .filter(|&row| hierarchy[row].is_none())
            .collect();
        if !unresolved.is_empty() {
            return Err(CycleError {
                destinations: unresolved
                    .iter()
                    .map(|&row| self.rows[row].destination.clone())
                    .collect(),
            });
        }

        Ok(hierarchy.into_iter().flatten().collect())
    }
}

/// Error when the dependency rows reference each other in a cycle
#[derive(Debug, Clone)]
pub struct CycleError {
    pub destinations: Vec<String>,
}

impl std::fmt::Display for CycleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Circular dependency detected involving destination(s) {}",
            fmt_names(&self.destinations)
        )
    }
}

impl std::error::Error for CycleError {}

impl From<CycleError> for ImportError {
    fn from(err: CycleError) -> Self {
        ImportError::Template(err.to_string())
    }
}

/// Resolved evaluation order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyPlan {
    /// Hierarchy per row, in original row order
    pub hierarchy: Vec<u32>,
    /// Original row indices sorted by hierarchy (stable)
    pub order: Vec<usize>,
}

impl HierarchyPlan {
    /// Hierarchies in evaluation order
    pub fn sorted_hierarchy(&self) -> Vec<u32> {
        self.order.iter().map(|&row| self.hierarchy[row]).collect()
    }
}

/// Compute the hierarchy of every row and the resulting evaluation order
pub fn resolve_hierarchy(
    rows: Vec<DependencyRow>,
    known_inputs: &HashSet<String>,
) -> Result<HierarchyPlan> {
    let graph = DependencyGraph::build(rows, known_inputs);
    let hierarchy = graph.hierarchies()?;

    // sort_by_key is stable: equal hierarchies keep declaration order
    let mut order: Vec<usize> = (0..hierarchy.len()).collect();
    order.sort_by_key(|&row| hierarchy[row]);

    Ok(HierarchyPlan { hierarchy, order })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn row(index: usize, destination: &str, a: &str, b: &str) -> DependencyRow {
        DependencyRow::new(index, destination, Value::from_text(a), Value::from_text(b))
    }

    #[test]
    fn test_inputs_and_literals_are_layer_one() {
        let rows = vec![
            row(0, "revenue", "price", "volume"),
            row(1, "costs", "volume", "2.5"),
            row(2, "tax_rate", "0.21", "1"),
        ];
        let plan = resolve_hierarchy(rows, &inputs(&["price", "volume"])).unwrap();
        assert_eq!(plan.hierarchy, vec![1, 1, 1]);
        assert_eq!(plan.order, vec![0, 1, 2]);
    }

    #[test]
    fn test_chain() {
        // Declared in reverse so that ordering has to move rows
        let rows = vec![
            row(0, "c", "b", "price"),
            row(1, "b", "a", "price"),
            row(2, "a", "price", "volume"),
        ];
        let plan = resolve_hierarchy(rows, &inputs(&["price", "volume"])).unwrap();
        assert_eq!(plan.hierarchy, vec![3, 2, 1]);
        assert_eq!(plan.order, vec![2, 1, 0]);
        assert_eq!(plan.sorted_hierarchy(), vec![1, 2, 3]);
    }

    #[test]
    fn test_stable_within_layer() {
        let rows = vec![
            row(0, "profit", "revenue", "costs"),
            row(1, "revenue", "price", "volume"),
            row(2, "margin", "profit", "revenue"),
            row(3, "costs", "volume", "unit_cost"),
            row(4, "net", "revenue", "10"),
        ];
        let plan =
            resolve_hierarchy(rows, &inputs(&["price", "volume", "unit_cost"])).unwrap();
        assert_eq!(plan.hierarchy, vec![2, 1, 3, 1, 2]);
        assert_eq!(plan.order, vec![1, 3, 0, 4, 2]);
    }

    #[test]
    fn test_hierarchy_exceeds_every_reference() {
        let rows = vec![
            row(0, "a", "price", "1"),
            row(1, "b", "a", "price"),
            row(2, "c", "a", "b"),
            row(3, "d", "c", "a"),
        ];
        let graph = DependencyGraph::build(rows, &inputs(&["price"]));
        let hierarchy = graph.hierarchies().unwrap();

        for row in 0..graph.len() {
            for &dep in graph.dependencies_of(row) {
                assert!(hierarchy[row] > hierarchy[dep]);
            }
        }
        assert_eq!(hierarchy, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_diamond_counts_longest_path() {
        let rows = vec![
            row(0, "a", "price", "1"),
            row(1, "b", "a", "price"),
            row(2, "c", "a", "2"),
            row(3, "d", "b", "c"),
        ];
        let plan = resolve_hierarchy(rows, &inputs(&["price"])).unwrap();
        assert_eq!(plan.hierarchy, vec![1, 2, 2, 3]);
        assert_eq!(plan.order, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_self_reference_is_ignored() {
        let rows = vec![
            row(0, "stock", "stock", "inflow"),
            row(1, "report", "stock", "1"),
        ];
        let plan = resolve_hierarchy(rows, &inputs(&["inflow"])).unwrap();
        // An unresolved self-reference keeps the row out of layer 1, nothing more
        assert_eq!(plan.hierarchy, vec![2, 3]);
    }

    #[test]
    fn test_input_named_like_destination_is_resolvable() {
        let rows = vec![row(0, "price", "price", "1.1")];
        let plan = resolve_hierarchy(rows, &inputs(&["price"])).unwrap();
        assert_eq!(plan.hierarchy, vec![1]);
    }

    #[test]
    fn test_cycle_is_reported() {
        let rows = vec![
            row(0, "a", "price", "1"),
            row(1, "x", "y", "a"),
            row(2, "y", "x", "1"),
            row(3, "z", "y", "1"),
        ];
        let err = resolve_hierarchy(rows, &inputs(&["price"])).unwrap_err();
        assert!(err.is_template());
        assert_eq!(
            err.to_string(),
            "Template Error: Circular dependency detected involving destination(s) {'x', 'y', 'z'}"
        );
    }

    #[test]
    fn test_from_table() {
        let mut table = Table::new(
            "dependencies",
            ["destination", "argument_1", "argument_2", "operator"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
        );
        table.push_row(vec![
            Value::from("revenue"),
            Value::from("price"),
            Value::Number(3.0),
            Value::from("*"),
        ]);

        let rows = DependencyRow::from_table(&table);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].destination, "revenue");
        assert_eq!(rows[0].argument_2, Value::Number(3.0));
    }
}
