//! Exact 0/1 knapsack with a cardinality cap and a per-group pick cap.
//!
//! Items are processed group by group. Within a group, layer `t` holds the best
//! value using at most `t` of the group's items, so the group cap is enforced
//! exactly and the last layer already dominates the others. Every improvement
//! is recorded in a per-item bitset that the backtrack walks in reverse. Cells
//! use "at most `w` weight, at most `k` items" semantics, which makes the
//! optimum non-decreasing in both dimensions.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Item {
    pub weight: u64,
    pub value: u64,
}

/// Row-major `(weight, count)` value table in one allocation.
#[derive(Clone)]
struct Grid {
    counts: usize,
    cells: Vec<u64>,
}

impl Grid {
    fn new(weights: usize, counts: usize) -> Self {
        Self {
            counts,
            cells: vec![0; weights * counts],
        }
    }

    fn get(&self, weight: usize, count: usize) -> u64 {
        self.cells[weight * self.counts + count]
    }

    fn set(&mut self, weight: usize, count: usize, value: u64) {
        self.cells[weight * self.counts + count] = value;
    }
}

/// One bit per `(weight, count)` cell.
struct BitGrid {
    counts: usize,
    words: Vec<u64>,
}

impl BitGrid {
    fn new(weights: usize, counts: usize) -> Self {
        Self {
            counts,
            words: vec![0; (weights * counts).div_ceil(64)],
        }
    }

    fn set(&mut self, weight: usize, count: usize) {
        let bit = weight * self.counts + count;
        self.words[bit / 64] |= 1 << (bit % 64);
    }

    fn get(&self, weight: usize, count: usize) -> bool {
        let bit = weight * self.counts + count;
        self.words[bit / 64] & (1 << (bit % 64)) != 0
    }
}

/// Cells an item improved, one bitset per group layer.
struct Decision {
    item: usize,
    improved: Vec<BitGrid>,
}

struct GroupTrail {
    depth: usize,
    decisions: Vec<Decision>,
}

/// Indices of the items in an optimal selection, ascending.
///
/// `groups` partitions item indices; `capacity` and item weights share a unit.
/// Among equal-value selections the earliest-found one wins: skipping an item
/// beats taking it, and earlier items beat later ones.
pub(crate) fn solve(
    items: &[Item],
    groups: &[Vec<usize>],
    capacity: u64,
    max_items: usize,
    group_cap: usize,
) -> Vec<usize> {
    let group_cap = group_cap.max(1);
    let max_items = max_items.min(items.len());
    let Ok(capacity) = usize::try_from(capacity) else {
        return Vec::new();
    };
    if max_items == 0 || capacity == 0 {
        return Vec::new();
    }

    let weights = capacity + 1;
    let counts = max_items + 1;

    let mut best = Grid::new(weights, counts);
    // layers[t - 1]: best value using at most `t` items of the current group.
    let mut layers: Vec<Grid> = vec![best.clone(); group_cap.min(max_items)];
    let mut trails: Vec<GroupTrail> = Vec::with_capacity(groups.len());

    for group in groups {
        let depth = group_cap.min(group.len()).min(layers.len());
        if depth == 0 {
            continue;
        }
        for layer in &mut layers[..depth] {
            layer.cells.copy_from_slice(&best.cells);
        }

        let mut decisions = Vec::with_capacity(group.len());
        for &index in group {
            let item = items[index];
            let Ok(item_weight) = usize::try_from(item.weight) else {
                continue;
            };
            if item_weight >= weights {
                continue;
            }

            let mut improved: Vec<BitGrid> =
                (0..depth).map(|_| BitGrid::new(weights, counts)).collect();
            for taken in (1..=depth).rev() {
                let (lower, upper) = layers.split_at_mut(taken - 1);
                let current = &mut upper[0];
                let previous = if taken == 1 { &best } else { &lower[taken - 2] };
                let bits = &mut improved[taken - 1];

                for weight in item_weight..weights {
                    for count in 1..counts {
                        let candidate =
                            previous.get(weight - item_weight, count - 1) + item.value;
                        if candidate > current.get(weight, count) {
                            current.set(weight, count, candidate);
                            bits.set(weight, count);
                        }
                    }
                }
            }
            decisions.push(Decision {
                item: index,
                improved,
            });
        }

        best.cells.copy_from_slice(&layers[depth - 1].cells);
        trails.push(GroupTrail { depth, decisions });
    }

    let mut selected = Vec::new();
    let mut weight = capacity;
    let mut count = max_items;
    for trail in trails.iter().rev() {
        let mut layer = trail.depth;
        for decision in trail.decisions.iter().rev() {
            if layer == 0 {
                break;
            }
            if decision.improved[layer - 1].get(weight, count) {
                selected.push(decision.item);
                weight -= items[decision.item].weight as usize;
                count -= 1;
                layer -= 1;
            }
        }
    }

    selected.sort_unstable();
    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(pairs: &[(u64, u64)]) -> Vec<Item> {
        pairs
            .iter()
            .map(|&(weight, value)| Item { weight, value })
            .collect()
    }

    fn singletons(len: usize) -> Vec<Vec<usize>> {
        (0..len).map(|index| vec![index]).collect()
    }

    fn total(items: &[Item], selected: &[usize]) -> (u64, u64) {
        selected.iter().fold((0, 0), |(weight, value), index| {
            (weight + items[*index].weight, value + items[*index].value)
        })
    }

    #[test]
    fn solves_a_plain_knapsack() {
        let items = items(&[(5, 10), (4, 40), (6, 30), (3, 50)]);
        let selected = solve(&items, &singletons(4), 10, 4, 2);
        assert_eq!(selected, vec![1, 3]);
        assert_eq!(total(&items, &selected), (7, 90));
    }

    #[test]
    fn respects_the_group_cap() {
        let items = items(&[(3, 9), (4, 10), (2, 6)]);
        let selected = solve(&items, &[vec![0, 1, 2]], 9, 3, 2);
        assert_eq!(selected, vec![0, 1]);
    }

    #[test]
    fn respects_the_item_cap() {
        let items = items(&[(1, 5), (1, 5), (1, 5), (1, 5)]);
        let selected = solve(&items, &singletons(4), 10, 3, 2);
        assert_eq!(selected, vec![0, 1, 2]);
    }

    #[test]
    fn ties_prefer_earlier_items() {
        let items = items(&[(2, 10), (2, 10)]);
        assert_eq!(solve(&items, &singletons(2), 2, 2, 2), vec![0]);
    }

    #[test]
    fn oversized_items_are_skipped() {
        let items = items(&[(11, 100), (4, 1)]);
        assert_eq!(solve(&items, &singletons(2), 10, 2, 2), vec![1]);
    }

    #[test]
    fn skipping_a_group_beats_an_equal_swap() {
        let items = items(&[(2, 10), (2, 10)]);
        let groups = vec![vec![0], vec![1]];
        assert_eq!(solve(&items, &groups, 4, 1, 2), vec![0]);
    }

    #[test]
    fn larger_group_caps_are_exact() {
        let items = items(&[(1, 4), (1, 4), (1, 4), (1, 4), (3, 9)]);
        let selected = solve(&items, &[vec![0, 1, 2, 3], vec![4]], 6, 5, 3);
        assert_eq!(selected, vec![0, 1, 2, 4]);
        assert_eq!(total(&items, &selected), (6, 21));
    }

    #[test]
    fn coprime_weights_over_a_wide_table() {
        // Weights share no divisor, so every dollar is a table column.
        let items: Vec<Item> = (0..120u64)
            .map(|index| Item {
                weight: 1_001 + index * 37,
                value: 200 + (index * 53) % 900,
            })
            .collect();
        let groups: Vec<Vec<usize>> = (0..120)
            .collect::<Vec<usize>>()
            .chunks(6)
            .map(<[usize]>::to_vec)
            .collect();

        let selected = solve(&items, &groups, 20_000, 10, 2);

        let (weight, value) = total(&items, &selected);
        assert!(weight <= 20_000);
        assert!(selected.len() <= 10);
        for group in &groups {
            assert!(selected.iter().filter(|index| group.contains(*index)).count() <= 2);
        }
        let richest = items.iter().map(|item| item.value).max().unwrap_or(0);
        assert!(value >= richest);
    }

    #[test]
    fn empty_inputs_select_nothing() {
        assert!(solve(&[], &[], 10, 3, 2).is_empty());
        let items = items(&[(1, 1)]);
        assert!(solve(&items, &singletons(1), 0, 3, 2).is_empty());
        assert!(solve(&items, &singletons(1), 5, 0, 2).is_empty());
    }
}
