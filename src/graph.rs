use std::{
    cmp::Reverse,
    collections::{BTreeMap, BinaryHeap, HashMap},
    fmt::Display,
};

use log::trace;

use crate::{Direction, Grid, Position};

/// Weighted undirected graph over the open cells of a grid. Every edge is stored in both
/// directions with the same weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    width: usize,
    height: usize,
    start: Position,
    end: Position,
    adjacency: BTreeMap<Position, BTreeMap<Position, usize>>,
}

impl Display for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Dimensions: {}x{}", self.width, self.height)?;
        write!(f, "Nodes: [")?;
        for (ind, pos) in self.adjacency.keys().enumerate() {
            if ind > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", pos)?;
        }
        write!(f, "]")
    }
}

impl Graph {
    /// Link every given node to its orthogonal neighbors that are nodes too, with weight 1.
    /// Start and end are the top left and bottom right corners of `grid`, which also gives the
    /// dimensions shown by `Display`.
    pub fn new<I: IntoIterator<Item = Position>>(grid: &Grid, nodes: I) -> Self {
        let mut adjacency: BTreeMap<Position, BTreeMap<Position, usize>> = nodes
            .into_iter()
            .map(|pos| (pos, BTreeMap::new()))
            .collect();
        let positions = adjacency.keys().copied().collect::<Vec<_>>();
        for pos in positions {
            let neighbors = Direction::all_dirs()
                .iter()
                .filter_map(|dir| pos.neighbor(*dir))
                .filter(|next_pos| adjacency.contains_key(next_pos))
                .map(|next_pos| (next_pos, 1))
                .collect();
            adjacency.insert(pos, neighbors);
        }

        Self {
            width: grid.width(),
            height: grid.height(),
            start: grid.start(),
            end: grid.end(),
            adjacency,
        }
    }

    pub fn from_grid(grid: &Grid) -> Self {
        Self::new(grid, grid.open_positions())
    }

    /// Graph of the open cells plus `barrier` turned into a corridor.
    pub fn with_opened(grid: &Grid, barrier: &Position) -> Self {
        Self::new(grid, grid.open_positions().chain([*barrier]))
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    pub fn node_n(&self) -> usize {
        self.adjacency.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Position> {
        self.adjacency.keys()
    }

    pub fn contains(&self, pos: &Position) -> bool {
        self.adjacency.contains_key(pos)
    }

    pub fn neighbors(&self, pos: &Position) -> impl Iterator<Item = (&Position, &usize)> {
        self.adjacency.get(pos).into_iter().flatten()
    }

    pub fn degree(&self, pos: &Position) -> usize {
        self.adjacency.get(pos).map_or(0, |neighbors| neighbors.len())
    }

    pub fn weight(&self, from: &Position, to: &Position) -> Option<usize> {
        self.adjacency
            .get(from)
            .and_then(|neighbors| neighbors.get(to))
            .copied()
    }

    fn is_terminal(&self, pos: &Position) -> bool {
        *pos == self.start || *pos == self.end
    }

    /// Remove `pos` and all the edges pointing to it, return its former neighbors.
    fn remove_node(&mut self, pos: &Position) -> Option<BTreeMap<Position, usize>> {
        let neighbors = self.adjacency.remove(pos)?;
        for next_pos in neighbors.keys() {
            if let Some(back_edges) = self.adjacency.get_mut(next_pos) {
                back_edges.remove(pos);
            }
        }

        Some(neighbors)
    }

    fn set_edge(&mut self, left: Position, right: Position, weight: usize) {
        self.adjacency
            .entry(left)
            .or_default()
            .insert(right, weight);
        self.adjacency
            .entry(right)
            .or_default()
            .insert(left, weight);
    }

    /// One simplification pass over the non-terminal nodes: nodes with no edge or a single edge
    /// are dropped, nodes with two edges are replaced by one edge between their neighbors. A
    /// node's degree is read when the pass reaches it. Returns whether the graph changed.
    pub fn simplify(&mut self) -> bool {
        let nodes = self
            .adjacency
            .keys()
            .filter(|pos| !self.is_terminal(pos))
            .copied()
            .collect::<Vec<_>>();
        let node_n_before = self.node_n();
        for pos in nodes {
            if self.degree(&pos) > 2 {
                continue;
            }

            let Some(neighbors) = self.remove_node(&pos) else {
                continue;
            };
            let mut neighbors = neighbors.into_iter();
            if let (Some((left, left_weight)), Some((right, right_weight))) =
                (neighbors.next(), neighbors.next())
            {
                let spliced_weight = left_weight + right_weight;
                // Keep a cheaper direct edge if there is one.
                if self
                    .weight(&left, &right)
                    .map_or(true, |weight| weight >= spliced_weight)
                {
                    self.set_edge(left, right, spliced_weight);
                }
            }
        }

        trace!(
            "Simplified graph from {} to {} node(s).",
            node_n_before,
            self.node_n()
        );
        self.node_n() != node_n_before
    }

    /// Simplify until a pass changes nothing, returns the number of passes which changed the graph.
    pub fn simplify_fully(&mut self) -> usize {
        let mut pass_n = 0;
        while self.simplify() {
            pass_n += 1;
        }

        pass_n
    }

    /// A* from start to end with the manhattan distance as heuristic. The length is counted in
    /// visited cells, i.e. the total edge weight plus one. `None` if end can't be reached.
    pub fn shortest_path_len(&self) -> Option<usize> {
        if !self.contains(&self.start) || !self.contains(&self.end) {
            return None;
        }

        let mut g_scores = HashMap::from([(self.start, 0)]);
        let mut insert_n = 0;
        let mut frontier = BinaryHeap::from([Reverse(SearchState::new(
            self.start,
            0,
            self.start.manhattan_dist(&self.end),
            insert_n,
        ))]);
        while let Some(Reverse(cur_state)) = frontier.pop() {
            // Stale entry, the node has been pushed again with a smaller g.
            if g_scores
                .get(&cur_state.pos)
                .is_some_and(|g| *g < cur_state.g)
            {
                continue;
            }

            if cur_state.pos == self.end {
                return Some(cur_state.g + 1);
            }

            for (next_pos, weight) in self.neighbors(&cur_state.pos) {
                let next_g = cur_state.g + weight;
                if g_scores.get(next_pos).map_or(true, |g| next_g < *g) {
                    g_scores.insert(*next_pos, next_g);
                    insert_n += 1;
                    frontier.push(Reverse(SearchState::new(
                        *next_pos,
                        next_g,
                        next_g + next_pos.manhattan_dist(&self.end),
                        insert_n,
                    )));
                }
            }
        }

        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SearchState {
    f: usize,
    insert_ind: usize,
    g: usize,
    pos: Position,
}

impl Ord for SearchState {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.f
            .cmp(&other.f)
            .then(self.insert_ind.cmp(&other.insert_ind))
    }
}

impl PartialOrd for SearchState {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl SearchState {
    fn new(pos: Position, g: usize, f: usize, insert_ind: usize) -> Self {
        Self {
            f,
            insert_ind,
            g,
            pos,
        }
    }
}
