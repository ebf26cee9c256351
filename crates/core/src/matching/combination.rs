//! Exact subset-sum over open receivables.

use conciliar_shared::types::Amount;

/// Upper bound on explored branches; deposits needing more are left to a
/// person.
const MAX_STEPS: usize = 200_000;

/// Finds positions of `items` whose amounts sum exactly to `target`.
///
/// Depth-first in input order; the first solution found wins. Only positive
/// items are considered. Returns `None` when no combination exists or the
/// search budget is exhausted.
#[must_use]
pub fn find_combination(items: &[Amount], target: Amount) -> Option<Vec<usize>> {
    if !target.is_positive() {
        return None;
    }
    let mut search = Search {
        items,
        target: target.minor(),
        picked: Vec::new(),
        steps: 0,
    };
    if search.backtrack(0, 0) {
        Some(search.picked)
    } else {
        None
    }
}

struct Search<'a> {
    items: &'a [Amount],
    target: i64,
    picked: Vec<usize>,
    steps: usize,
}

impl Search<'_> {
    fn backtrack(&mut self, start: usize, sum: i64) -> bool {
        if sum == self.target {
            return true;
        }
        for index in start..self.items.len() {
            self.steps += 1;
            if self.steps > MAX_STEPS {
                return false;
            }
            let value = self.items[index].minor();
            if value <= 0 || sum + value > self.target {
                continue;
            }
            self.picked.push(index);
            if self.backtrack(index + 1, sum + value) {
                return true;
            }
            self.picked.pop();
        }
        false
    }
}
