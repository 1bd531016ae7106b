//! Static circular dependency detection for formula cells.
//!
//! Evaluation already reports `#CIRCULAR` for any cell whose value depends
//! on itself. This module answers the structural question instead: which
//! cells form the loop. It walks the references written in each formula,
//! without evaluating anything, on an explicit stack so chain length is
//! bounded by memory rather than by the thread's stack.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;

use super::deps::cell_dependencies;
use super::{CellRef, Grid};

/// Detect circular dependencies starting from a cell.
/// Returns Some(cycle_path) if a cycle is found, None otherwise. The path
/// ends with the cell that closed the loop, e.g. `[A1, B1, A1]`.
pub fn detect_cycle(start: &CellRef, grid: &Grid) -> Option<Vec<CellRef>> {
    let mut finished = HashSet::new();
    let mut on_path = HashSet::from([start.clone()]);
    let mut path = vec![start.clone()];
    let mut pending = vec![cell_dependencies(start, grid).into_iter()];

    while let Some(deps) = pending.last_mut() {
        match deps.next() {
            Some(dep) => {
                if on_path.contains(&dep) {
                    path.push(dep);
                    return Some(path);
                }
                if finished.contains(&dep) {
                    continue;
                }
                pending.push(cell_dependencies(&dep, grid).into_iter());
                on_path.insert(dep.clone());
                path.push(dep);
            }
            None => {
                pending.pop();
                if let Some(done) = path.pop() {
                    on_path.remove(&done);
                    finished.insert(done);
                }
            }
        }
    }
    None
}

/// Find one loop for every group of formula cells that reference each
/// other, directly or through other cells.
///
/// Two loops sharing a cell belong to the same group and are reported once.
/// Each loop starts and ends at the group's smallest cell (row-major) and is
/// a shortest way around, e.g. `[A1, B1, A1]`. Loops are sorted by that
/// cell. Runs in time linear in the number of references.
pub fn detect_cycles(grid: &Grid) -> Vec<Vec<CellRef>> {
    let graph = RefGraph::build(grid);
    let mut cycles: Vec<Vec<CellRef>> = graph
        .components()
        .into_iter()
        .filter_map(|component| graph.shortest_loop(&component))
        .map(|ids| ids.into_iter().map(|id| graph.cells[id].clone()).collect())
        .collect();
    cycles.sort();

    for cycle in &cycles {
        debug!(start = %cycle[0], len = cycle.len() - 1, "found reference cycle");
    }
    cycles
}

/// Formula cells and the formula cells they reference, by dense id.
/// References to non-formula cells are dropped: they can never close a loop.
struct RefGraph {
    cells: Vec<CellRef>,
    edges: Vec<Vec<usize>>,
}

impl RefGraph {
    fn build(grid: &Grid) -> RefGraph {
        let mut cells: Vec<CellRef> = grid
            .iter()
            .filter(|entry| entry.is_formula())
            .map(|entry| entry.key().clone())
            .collect();
        cells.sort();

        let edges: Vec<Vec<usize>> = {
            let ids: HashMap<&CellRef, usize> =
                cells.iter().enumerate().map(|(id, cell)| (cell, id)).collect();
            cells
                .iter()
                .map(|cell| {
                    cell_dependencies(cell, grid)
                        .iter()
                        .filter_map(|dep| ids.get(dep).copied())
                        .collect::<Vec<usize>>()
                })
                .collect()
        };

        RefGraph { cells, edges }
    }

    /// Strongly connected components that contain a loop (more than one
    /// member, or a cell referencing itself). Iterative Tarjan.
    fn components(&self) -> Vec<Vec<usize>> {
        const UNVISITED: usize = usize::MAX;
        let n = self.cells.len();
        let mut index = vec![UNVISITED; n];
        let mut lowlink = vec![0; n];
        let mut on_stack = vec![false; n];
        let mut stack = Vec::new();
        let mut next_index = 0;
        let mut components = Vec::new();

        for root in 0..n {
            if index[root] != UNVISITED {
                continue;
            }
            index[root] = next_index;
            lowlink[root] = next_index;
            next_index += 1;
            stack.push(root);
            on_stack[root] = true;
            let mut work = vec![(root, 0usize)];

            while let Some(&(node, edge)) = work.last() {
                if let Some(&dep) = self.edges[node].get(edge) {
                    if let Some(top) = work.last_mut() {
                        top.1 += 1;
                    }
                    if index[dep] == UNVISITED {
                        index[dep] = next_index;
                        lowlink[dep] = next_index;
                        next_index += 1;
                        stack.push(dep);
                        on_stack[dep] = true;
                        work.push((dep, 0));
                    } else if on_stack[dep] {
                        lowlink[node] = lowlink[node].min(index[dep]);
                    }
                    continue;
                }

                work.pop();
                if let Some(&(parent, _)) = work.last() {
                    lowlink[parent] = lowlink[parent].min(lowlink[node]);
                }
                if lowlink[node] == index[node] {
                    let mut component = Vec::new();
                    while let Some(member) = stack.pop() {
                        on_stack[member] = false;
                        component.push(member);
                        if member == node {
                            break;
                        }
                    }
                    let looped = component.len() > 1 || self.edges[node].contains(&node);
                    if looped {
                        components.push(component);
                    }
                }
            }
        }
        components
    }

    /// Breadth-first search from the component's smallest member back to
    /// itself, staying inside the component.
    fn shortest_loop(&self, component: &[usize]) -> Option<Vec<usize>> {
        let start = *component.iter().min()?;
        if self.edges[start].contains(&start) {
            return Some(vec![start, start]);
        }

        let members: HashSet<usize> = component.iter().copied().collect();
        let mut parent: HashMap<usize, usize> = HashMap::new();
        let mut queue = VecDeque::from([start]);

        while let Some(node) = queue.pop_front() {
            for &dep in &self.edges[node] {
                if !members.contains(&dep) {
                    continue;
                }
                if dep == start {
                    let mut path = vec![start, node];
                    let mut cur = node;
                    while let Some(&prev) = parent.get(&cur) {
                        path.push(prev);
                        cur = prev;
                    }
                    path.reverse();
                    return Some(path);
                }
                if !parent.contains_key(&dep) {
                    parent.insert(dep, node);
                    queue.push_back(dep);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Cell;
    use pretty_assertions::assert_eq;

    fn grid(cells: &[(&str, &str)]) -> Grid {
        let grid = Grid::new();
        for (address, raw) in cells {
            grid.insert(CellRef::parse_address(address).unwrap(), Cell::from_input(raw));
        }
        grid
    }

    fn at(address: &str) -> CellRef {
        CellRef::parse_address(address).unwrap()
    }

    fn chain(len: usize) -> Grid {
        let grid = Grid::new();
        grid.insert(CellRef::new(0, 0), Cell::from_input("1"));
        for row in 1..len {
            grid.insert(CellRef::new(row, 0), Cell::from_input(&format!("=A{}+1", row)));
        }
        grid
    }

    #[test]
    fn test_detects_two_cell_cycle() {
        let g = grid(&[("A1", "=B1"), ("B1", "=A1")]);
        assert_eq!(detect_cycle(&at("A1"), &g), Some(vec![at("A1"), at("B1"), at("A1")]));
    }

    #[test]
    fn test_path_starts_at_start_even_when_loop_is_downstream() {
        let g = grid(&[("A1", "=B1+1"), ("B1", "=C1"), ("C1", "=B1")]);
        assert_eq!(
            detect_cycle(&at("A1"), &g),
            Some(vec![at("A1"), at("B1"), at("C1"), at("B1")])
        );
    }

    #[test]
    fn test_diamond_has_no_cycle() {
        let g = grid(&[("A1", "5"), ("B1", "=A1+1"), ("C1", "=A1+2"), ("D1", "=B1+C1")]);
        assert_eq!(detect_cycle(&at("D1"), &g), None);
        assert!(detect_cycles(&g).is_empty());
    }

    #[test]
    fn test_non_formula_breaks_chain() {
        let g = grid(&[("A1", "=B1"), ("B1", "=A1#")]);
        assert_eq!(detect_cycle(&at("A1"), &g), None);
        assert!(detect_cycles(&g).is_empty());
    }

    #[test]
    fn test_detect_cycles_one_loop_per_group() {
        let g = grid(&[
            ("A1", "=B1"),
            ("B1", "=A1"),
            ("C1", "=A1+1"),
            ("D4", "=D4"),
            ("E1", "=F1"),
        ]);
        assert_eq!(
            detect_cycles(&g),
            vec![vec![at("A1"), at("B1"), at("A1")], vec![at("D4"), at("D4")]]
        );
    }

    #[test]
    fn test_loops_sharing_a_cell_form_one_group() {
        let g = grid(&[("A1", "=B1+C1"), ("B1", "=A1"), ("C1", "=A1")]);
        assert_eq!(detect_cycles(&g), vec![vec![at("A1"), at("B1"), at("A1")]]);
    }

    #[test]
    fn test_reported_loop_is_shortest_from_smallest_cell() {
        // A1 -> B1 -> C1 -> A1 and the shortcut A1 -> C1 -> A1.
        let g = grid(&[("C1", "=A1"), ("B1", "=C1"), ("A1", "=B1+C1")]);
        assert_eq!(detect_cycles(&g), vec![vec![at("A1"), at("C1"), at("A1")]]);
    }

    #[test]
    fn test_long_loop_is_reported_once() {
        let g = chain(5_000);
        g.insert(CellRef::new(0, 0), Cell::from_input("=A5000"));
        let cycles = detect_cycles(&g);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].len(), 5_001);
        assert_eq!(cycles[0][0], at("A1"));
        assert_eq!(cycles[0][1], at("A5000"));
    }

    #[test]
    fn test_deep_acyclic_chain() {
        let g = chain(50_000);
        assert!(detect_cycles(&g).is_empty());
        assert_eq!(detect_cycle(&at("A50000"), &g), None);
    }
}
