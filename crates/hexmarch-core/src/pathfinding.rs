//! Breadth-first pathfinding on the hex grid.
//!
//! Both searches process their frontier in discovery (FIFO) order rather
//! than by accumulated cost. On mixed-cost terrain the returned path is
//! therefore not guaranteed to be the cheapest one; that behavior is part
//! of the movement contract and must not be "fixed" to a cost-ordered
//! search without revisiting every caller.

use crate::hex::HexCoord;
use crate::map::Map;
use std::collections::{HashMap, HashSet, VecDeque};

/// Find every position reachable from `start` within the movement budget.
///
/// A neighbor is enqueued only if it is inside the map, its terrain is
/// passable, and the cumulative cost along the frontier path does not
/// exceed `budget`. The start position is always included.
pub fn reachable_tiles(map: &Map, start: HexCoord, budget: u32) -> Vec<HexCoord> {
    let mut visited: HashSet<HexCoord> = HashSet::from([start]);
    let mut order: Vec<HexCoord> = vec![start];
    let mut queue: VecDeque<(HexCoord, u32)> = VecDeque::from([(start, 0)]);

    while let Some((current, spent)) = queue.pop_front() {
        for neighbor in map.neighbors(&current) {
            if visited.contains(&neighbor) {
                continue;
            }
            let Some(terrain) = map.terrain_at(&neighbor) else {
                continue;
            };
            if !terrain.is_passable() {
                continue;
            }
            let cost = spent + terrain.movement_cost();
            if cost > budget {
                continue;
            }
            visited.insert(neighbor);
            order.push(neighbor);
            queue.push_back((neighbor, cost));
        }
    }

    order
}

/// Find a path from `start` (exclusive) to `goal` (inclusive) within the
/// movement budget, or `None` when the budget exhausts first.
///
/// The search is the same FIFO expansion as [`reachable_tiles`], so any
/// position that search discovers is also discoverable here at the same
/// cost.
pub fn find_path(map: &Map, start: HexCoord, goal: HexCoord, budget: u32) -> Option<Vec<HexCoord>> {
    if start == goal {
        return Some(Vec::new());
    }

    let mut visited: HashSet<HexCoord> = HashSet::from([start]);
    let mut came_from: HashMap<HexCoord, HexCoord> = HashMap::new();
    let mut queue: VecDeque<(HexCoord, u32)> = VecDeque::from([(start, 0)]);

    while let Some((current, spent)) = queue.pop_front() {
        if current == goal {
            return Some(reconstruct_path(&came_from, start, goal));
        }
        for neighbor in map.neighbors(&current) {
            if visited.contains(&neighbor) {
                continue;
            }
            let Some(terrain) = map.terrain_at(&neighbor) else {
                continue;
            };
            if !terrain.is_passable() {
                continue;
            }
            let cost = spent + terrain.movement_cost();
            if cost > budget {
                continue;
            }
            visited.insert(neighbor);
            came_from.insert(neighbor, current);
            queue.push_back((neighbor, cost));
        }
    }

    None
}

/// Sum the terrain cost of entering each position along a path.
///
/// The path is start-exclusive, so every element is an entered tile.
pub fn path_cost(map: &Map, path: &[HexCoord]) -> u32 {
    path.iter()
        .filter_map(|coord| map.terrain_at(coord))
        .map(|terrain| terrain.movement_cost())
        .sum()
}

/// Walk the predecessor chain back from the goal.
fn reconstruct_path(
    came_from: &HashMap<HexCoord, HexCoord>,
    start: HexCoord,
    goal: HexCoord,
) -> Vec<HexCoord> {
    let mut path = vec![goal];
    let mut current = goal;

    while current != start {
        match came_from.get(&current) {
            Some(&prev) => {
                if prev != start {
                    path.push(prev);
                }
                current = prev;
            }
            None => break,
        }
    }

    path.reverse();
    path
}
