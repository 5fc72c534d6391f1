//! Deterministic Weighted Sampler
//!
//! Seeded selection of items from a labeled pool under three kinds of
//! constraint:
//! - an exact total count
//! - weight groups (fraction of the total per group)
//! - category minimums (at least N items carrying a category)
//!
//! Allocation:
//! 1. Group targets from `fraction * total`, rounded by largest remainder so
//!    they sum to the total exactly.
//! 2. A group smaller than its target gives up everything it has; its
//!    deficit is spread over the groups not yet exhausted, again by largest
//!    remainder, until it is absorbed or no group is left.
//! 3. Inside a group, items are drawn without replacement with probability
//!    proportional to `1 + weakness`.
//! 4. Category minimums are met by swapping reserve items into the same
//!    group, never dropping another minimum that is already met.
//!
//! Draws use sequential roulette selection, which needs only additions and
//! multiplications, so the same seed and pool give bit-identical results on
//! every platform. Shortfalls are reported, never raised.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::rng::SeededRng;

/// Group key used when the caller supplies no weight groups.
const IMPLICIT_GROUP: &str = "";

// ==================== Data Structures ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolItem {
    pub id: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub categories: BTreeSet<String>,
    /// Mastery deficit as a fraction, `max(0, target - mastery) / 100`.
    #[serde(default)]
    pub weakness: Option<f64>,
}

impl PoolItem {
    pub fn new(id: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            group: group.into(),
            categories: BTreeSet::new(),
            weakness: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.insert(category.into());
        self
    }

    pub fn with_weakness(mut self, weakness: f64) -> Self {
        self.weakness = Some(weakness);
        self
    }

    pub fn selection_weight(&self) -> f64 {
        let deficit = self
            .weakness
            .filter(|w| w.is_finite())
            .unwrap_or(0.0)
            .max(0.0);
        1.0 + deficit
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleConstraints {
    pub total_count: usize,
    #[serde(default)]
    pub category_minimums: BTreeMap<String, usize>,
    /// Group -> fraction of `total_count`. Empty means one group for the
    /// whole pool.
    #[serde(default)]
    pub weight_groups: BTreeMap<String, f64>,
}

impl SampleConstraints {
    pub fn validate(&self) -> EngineResult<()> {
        if self.total_count == 0 {
            return Err(EngineError::NonPositiveCount {
                field: "totalCount",
            });
        }
        for (group, &weight) in &self.weight_groups {
            if !weight.is_finite() || weight < 0.0 {
                return Err(EngineError::InvalidWeight {
                    group: group.clone(),
                    weight,
                });
            }
        }
        if !self.weight_groups.is_empty() {
            let sum: f64 = self.weight_groups.values().sum();
            if sum <= 0.0 {
                return Err(EngineError::WeightSum { sum });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Shortfall {
    #[serde(rename_all = "camelCase")]
    Group {
        group: String,
        requested: usize,
        filled: usize,
    },
    #[serde(rename_all = "camelCase")]
    Category {
        category: String,
        required: usize,
        filled: usize,
    },
    #[serde(rename_all = "camelCase")]
    Total { requested: usize, filled: usize },
}

impl Shortfall {
    pub fn missing(&self) -> usize {
        match self {
            Shortfall::Group {
                requested, filled, ..
            }
            | Shortfall::Total { requested, filled } => requested.saturating_sub(*filled),
            Shortfall::Category {
                required, filled, ..
            } => required.saturating_sub(*filled),
        }
    }
}

impl fmt::Display for Shortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shortfall::Group {
                group,
                requested,
                filled,
            } => write!(
                f,
                "group {group}: requested {requested}, only {filled} available (short {})",
                self.missing()
            ),
            Shortfall::Category {
                category,
                required,
                filled,
            } => write!(
                f,
                "category {category}: at least {required} required, only {filled} selected"
            ),
            Shortfall::Total { requested, filled } => {
                write!(f, "requested {requested} items, pool supplied {filled}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleOutcome {
    pub picked: Vec<PoolItem>,
    pub shortfalls: Vec<Shortfall>,
    /// Initial largest-remainder target per weight group.
    pub targets: BTreeMap<String, usize>,
    /// Items picked per weight group.
    pub actual: BTreeMap<String, usize>,
    /// Items whose group is not a weight group.
    pub ineligible: usize,
}

// ==================== Allocation ====================

/// Split `total` over `weights` so the parts sum exactly to `total`.
///
/// Remainder ties go to the smaller key. A zero weight sum splits evenly.
pub fn largest_remainder(total: usize, weights: &BTreeMap<String, f64>) -> BTreeMap<String, usize> {
    if weights.is_empty() {
        return BTreeMap::new();
    }
    let sum: f64 = weights.values().sum();
    let even = 1.0 / weights.len() as f64;

    let mut parts: Vec<(&String, usize, f64)> = weights
        .iter()
        .map(|(key, &weight)| {
            let fraction = if sum > 0.0 { weight / sum } else { even };
            let exact = fraction * total as f64;
            let floor = exact.floor();
            (key, floor as usize, exact - floor)
        })
        .collect();

    let assigned: u128 = parts.iter().map(|(_, n, _)| *n as u128).sum();

    let mut order: Vec<usize> = (0..parts.len()).collect();
    order.sort_by(|&a, &b| {
        parts[b]
            .2
            .partial_cmp(&parts[a].2)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| parts[a].0.cmp(parts[b].0))
    });

    if assigned > total as u128 {
        // Past 2^53 the floors can overshoot; take the excess back from the
        // smallest remainders.
        let mut excess = usize::try_from(assigned - total as u128).unwrap_or(usize::MAX);
        while excess > 0 {
            let Some(&idx) = order.iter().rev().find(|&&idx| parts[idx].1 > 0) else {
                break;
            };
            let take = excess.min(parts[idx].1);
            parts[idx].1 -= take;
            excess -= take;
        }
    } else {
        let mut remaining = total - assigned as usize;
        for &idx in order.iter().cycle() {
            if remaining == 0 {
                break;
            }
            parts[idx].1 += 1;
            remaining -= 1;
        }
    }

    parts.into_iter().map(|(key, n, _)| (key.clone(), n)).collect()
}

/// Grow group requests until every deficit is absorbed or no group is left.
fn redistribute(
    targets: &BTreeMap<String, usize>,
    available: &BTreeMap<String, usize>,
    weights: &BTreeMap<String, f64>,
) -> BTreeMap<String, usize> {
    let mut requested = targets.clone();
    let mut exhausted: BTreeSet<String> = BTreeSet::new();

    loop {
        let mut deficit: usize = 0;
        for (group, &want) in &requested {
            if exhausted.contains(group) {
                continue;
            }
            let have = available.get(group).copied().unwrap_or(0);
            if want > have {
                deficit = deficit.saturating_add(want - have);
                exhausted.insert(group.clone());
            }
        }
        if deficit == 0 {
            break;
        }

        let receivers: BTreeMap<String, f64> = weights
            .iter()
            .filter(|(group, _)| !exhausted.contains(*group))
            .map(|(group, &weight)| (group.clone(), weight))
            .collect();
        if receivers.is_empty() {
            break;
        }
        for (group, extra) in largest_remainder(deficit, &receivers) {
            if let Some(want) = requested.get_mut(&group) {
                *want = want.saturating_add(extra);
            }
        }
    }

    requested
}

/// Weighted random permutation: repeated roulette draws without replacement.
fn weighted_order<'a>(items: &[&'a PoolItem], rng: &mut SeededRng) -> Vec<&'a PoolItem> {
    let mut remaining: Vec<&PoolItem> = items.to_vec();
    let mut ordered = Vec::with_capacity(items.len());

    while !remaining.is_empty() {
        let total: f64 = remaining.iter().map(|item| item.selection_weight()).sum();
        let mut target = rng.next_unit() * total;
        let mut chosen = remaining.len() - 1;
        for (pos, item) in remaining.iter().enumerate() {
            let weight = item.selection_weight();
            if target < weight {
                chosen = pos;
                break;
            }
            target -= weight;
        }
        ordered.push(remaining.remove(chosen));
    }

    ordered
}

// ==================== Category Minimums ====================

struct GroupSelection<'a> {
    picked: Vec<&'a PoolItem>,
    reserve: Vec<&'a PoolItem>,
}

fn category_counts(groups: &BTreeMap<String, GroupSelection<'_>>) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for selection in groups.values() {
        for item in &selection.picked {
            for category in &item.categories {
                *counts.entry(category.clone()).or_insert(0) += 1;
            }
        }
    }
    counts
}

/// Removing `outgoing` for `incoming` must not drop any category minimum
/// it currently helps to meet.
fn can_swap(
    outgoing: &PoolItem,
    incoming: &PoolItem,
    counts: &BTreeMap<String, usize>,
    minimums: &BTreeMap<String, usize>,
) -> bool {
    outgoing.categories.iter().all(|category| {
        let minimum = minimums.get(category).copied().unwrap_or(0);
        let count = counts.get(category).copied().unwrap_or(0);
        minimum == 0 || count > minimum || incoming.categories.contains(category)
    })
}

fn enforce_minimums(
    groups: &mut BTreeMap<String, GroupSelection<'_>>,
    minimums: &BTreeMap<String, usize>,
) -> Vec<Shortfall> {
    let mut shortfalls = Vec::new();

    for (category, &minimum) in minimums {
        if minimum == 0 {
            continue;
        }
        let mut counts = category_counts(groups);

        'groups: for selection in groups.values_mut() {
            loop {
                if counts.get(category).copied().unwrap_or(0) >= minimum {
                    break 'groups;
                }
                let Some(in_pos) = selection
                    .reserve
                    .iter()
                    .position(|item| item.categories.contains(category))
                else {
                    break;
                };
                let incoming = selection.reserve[in_pos];
                let Some(out_pos) = selection.picked.iter().rposition(|item| {
                    !item.categories.contains(category)
                        && can_swap(item, incoming, &counts, minimums)
                }) else {
                    break;
                };

                let outgoing = selection.picked[out_pos];
                selection.picked[out_pos] = incoming;
                selection.reserve.remove(in_pos);
                selection.reserve.push(outgoing);

                for c in &outgoing.categories {
                    if let Some(n) = counts.get_mut(c) {
                        *n = n.saturating_sub(1);
                    }
                }
                for c in &incoming.categories {
                    *counts.entry(c.clone()).or_insert(0) += 1;
                }
            }
        }

        let filled = counts.get(category).copied().unwrap_or(0);
        if filled < minimum {
            shortfalls.push(Shortfall::Category {
                category: category.clone(),
                required: minimum,
                filled,
            });
        }
    }

    shortfalls
}

// ==================== Entry Points ====================

/// Sample `pool` under `constraints`, seeded by `seed`.
pub fn sample(
    pool: &[PoolItem],
    constraints: &SampleConstraints,
    seed: &str,
) -> EngineResult<SampleOutcome> {
    let mut rng = SeededRng::from_seed_str(seed)?;
    sample_with_rng(pool, constraints, &mut rng)
}

pub fn sample_with_rng(
    pool: &[PoolItem],
    constraints: &SampleConstraints,
    rng: &mut SeededRng,
) -> EngineResult<SampleOutcome> {
    constraints.validate()?;

    let implicit = constraints.weight_groups.is_empty();
    let weights: BTreeMap<String, f64> = if implicit {
        BTreeMap::from([(IMPLICIT_GROUP.to_string(), 1.0)])
    } else {
        constraints.weight_groups.clone()
    };

    // Bucket the pool, first occurrence of each id only.
    let mut buckets: BTreeMap<String, Vec<&PoolItem>> =
        weights.keys().map(|group| (group.clone(), Vec::new())).collect();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut ineligible = 0;
    for item in pool {
        if !seen.insert(item.id.as_str()) {
            continue;
        }
        let key = if implicit { IMPLICIT_GROUP } else { item.group.as_str() };
        match buckets.get_mut(key) {
            Some(bucket) => bucket.push(item),
            None => ineligible += 1,
        }
    }

    let available: BTreeMap<String, usize> = buckets
        .iter()
        .map(|(group, items)| (group.clone(), items.len()))
        .collect();
    let targets = largest_remainder(constraints.total_count, &weights);
    let requested = redistribute(&targets, &available, &weights);

    let mut shortfalls = Vec::new();
    let mut groups: BTreeMap<String, GroupSelection<'_>> = BTreeMap::new();
    for (group, items) in &buckets {
        let want = requested.get(group).copied().unwrap_or(0);
        let mut ordered = weighted_order(items, rng);
        let take = want.min(ordered.len());
        let reserve = ordered.split_off(take);
        if want > take && !implicit {
            shortfalls.push(Shortfall::Group {
                group: group.clone(),
                requested: want,
                filled: take,
            });
        }
        groups.insert(
            group.clone(),
            GroupSelection {
                picked: ordered,
                reserve,
            },
        );
    }

    shortfalls.extend(enforce_minimums(&mut groups, &constraints.category_minimums));

    let mut actual = BTreeMap::new();
    let mut picked: Vec<PoolItem> = Vec::with_capacity(constraints.total_count.min(pool.len()));
    for (group, selection) in &groups {
        actual.insert(group.clone(), selection.picked.len());
        picked.extend(selection.picked.iter().map(|item| (*item).clone()));
    }
    rng.shuffle(&mut picked);

    if picked.len() < constraints.total_count {
        shortfalls.push(Shortfall::Total {
            requested: constraints.total_count,
            filled: picked.len(),
        });
    }

    if !shortfalls.is_empty() {
        tracing::debug!(
            picked = picked.len(),
            requested = constraints.total_count,
            shortfalls = shortfalls.len(),
            "sample completed with shortfalls"
        );
    }

    let (targets, actual) = if implicit {
        (BTreeMap::new(), BTreeMap::new())
    } else {
        (targets, actual)
    };

    Ok(SampleOutcome {
        picked,
        shortfalls,
        targets,
        actual,
        ineligible,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn pool(groups: &[(&str, usize)]) -> Vec<PoolItem> {
        groups
            .iter()
            .flat_map(|(group, n)| {
                (0..*n).map(move |i| PoolItem::new(format!("{group}-q{i}"), *group))
            })
            .collect()
    }

    fn ids(outcome: &SampleOutcome) -> Vec<&str> {
        outcome.picked.iter().map(|item| item.id.as_str()).collect()
    }

    #[test]
    fn test_largest_remainder_sums_exactly() {
        let parts = largest_remainder(10, &weights(&[("a", 1.0), ("b", 1.0), ("c", 1.0)]));
        assert_eq!(parts.values().sum::<usize>(), 10);
        // remainder tie goes to the smallest key
        assert_eq!(parts["a"], 4);
        assert_eq!(parts["b"], 3);
        assert_eq!(parts["c"], 3);
    }

    #[test]
    fn test_largest_remainder_prefers_bigger_remainder() {
        let exam = weights(&[("1.0", 0.24), ("2.0", 0.19), ("3.0", 0.17), ("4.0", 0.40)]);
        let parts = largest_remainder(90, &exam);
        assert_eq!(parts.values().sum::<usize>(), 90);
        assert_eq!(parts["4.0"], 36);
        assert_eq!(parts["3.0"], 15);
    }

    #[test]
    fn test_deterministic_for_same_seed() {
        let pool = pool(&[("a", 30), ("b", 30)]);
        let constraints = SampleConstraints {
            total_count: 20,
            weight_groups: weights(&[("a", 0.5), ("b", 0.5)]),
            ..Default::default()
        };
        let first = sample(&pool, &constraints, "seed-1").unwrap();
        let second = sample(&pool, &constraints, "seed-1").unwrap();
        assert_eq!(first, second);
        let other = sample(&pool, &constraints, "seed-2").unwrap();
        assert_ne!(ids(&first), ids(&other));
    }

    #[test]
    fn test_graceful_shortfall_small_pool() {
        let pool = pool(&[("a", 5)]);
        let constraints = SampleConstraints {
            total_count: 90,
            ..Default::default()
        };
        let outcome = sample(&pool, &constraints, "tiny").unwrap();
        assert_eq!(outcome.picked.len(), 5);
        assert!(!outcome.shortfalls.is_empty());
        assert!(outcome
            .shortfalls
            .contains(&Shortfall::Total { requested: 90, filled: 5 }));
    }

    #[test]
    fn test_huge_total_against_small_pool() {
        let pool = pool(&[("a", 3), ("b", 2)]);
        for total_count in [usize::MAX / 8, usize::MAX] {
            let constraints = SampleConstraints {
                total_count,
                weight_groups: weights(&[("a", 0.5), ("b", 0.5)]),
                ..Default::default()
            };
            let outcome = sample(&pool, &constraints, "big").unwrap();
            assert_eq!(outcome.picked.len(), 5);
            let targeted = outcome.targets.values().fold(0usize, |acc, n| acc.saturating_add(*n));
            assert_eq!(targeted, total_count);
            assert!(outcome
                .shortfalls
                .contains(&Shortfall::Total { requested: total_count, filled: 5 }));
        }
    }

    #[test]
    fn test_largest_remainder_huge_total_sums_exactly() {
        let total = usize::MAX / 8;
        let parts = largest_remainder(total, &weights(&[("a", 0.3), ("b", 0.7)]));
        assert_eq!(parts["a"] + parts["b"], total);
    }

    #[test]
    fn test_deficit_redistributed_to_other_groups() {
        let pool = pool(&[("a", 2), ("b", 20)]);
        let constraints = SampleConstraints {
            total_count: 10,
            weight_groups: weights(&[("a", 0.5), ("b", 0.5)]),
            ..Default::default()
        };
        let outcome = sample(&pool, &constraints, "redistribute").unwrap();
        assert_eq!(outcome.picked.len(), 10);
        assert_eq!(outcome.targets["a"], 5);
        assert_eq!(outcome.actual["a"], 2);
        assert_eq!(outcome.actual["b"], 8);
        assert_eq!(
            outcome.shortfalls,
            vec![Shortfall::Group { group: "a".to_string(), requested: 5, filled: 2 }]
        );
    }

    #[test]
    fn test_redistribution_cascades_into_shortfalls() {
        let pool = pool(&[("1.0", 2), ("2.0", 1)]);
        let constraints = SampleConstraints {
            total_count: 4,
            weight_groups: weights(&[("1.0", 0.5), ("2.0", 0.5)]),
            ..Default::default()
        };
        let outcome = sample(&pool, &constraints, "cascade").unwrap();
        assert_eq!(outcome.picked.len(), 3);
        let group_missing: BTreeMap<&str, usize> = outcome
            .shortfalls
            .iter()
            .filter_map(|s| match s {
                Shortfall::Group { group, .. } => Some((group.as_str(), s.missing())),
                _ => None,
            })
            .collect();
        assert_eq!(group_missing.get("1.0"), Some(&1));
        assert_eq!(group_missing.get("2.0"), Some(&1));
    }

    #[test]
    fn test_no_duplicates_even_with_duplicate_pool_ids() {
        let mut pool = pool(&[("a", 10)]);
        pool.extend(pool.clone());
        let constraints = SampleConstraints {
            total_count: 15,
            weight_groups: weights(&[("a", 1.0)]),
            ..Default::default()
        };
        let outcome = sample(&pool, &constraints, "dupes").unwrap();
        let unique: HashSet<&str> = ids(&outcome).into_iter().collect();
        assert_eq!(unique.len(), outcome.picked.len());
        assert_eq!(outcome.picked.len(), 10);
    }

    #[test]
    fn test_ungrouped_items_are_ineligible() {
        let pool = pool(&[("a", 3), ("z", 4)]);
        let constraints = SampleConstraints {
            total_count: 3,
            weight_groups: weights(&[("a", 1.0)]),
            ..Default::default()
        };
        let outcome = sample(&pool, &constraints, "ineligible").unwrap();
        assert_eq!(outcome.ineligible, 4);
        assert!(outcome.picked.iter().all(|item| item.group == "a"));
    }

    #[test]
    fn test_category_minimum_swaps_within_group() {
        let mut pool = pool(&[("a", 20)]);
        for item in pool.iter_mut().take(3) {
            item.categories.insert("scenario".to_string());
        }
        let constraints = SampleConstraints {
            total_count: 5,
            category_minimums: BTreeMap::from([("scenario".to_string(), 3)]),
            weight_groups: weights(&[("a", 1.0)]),
        };
        for seed in ["m1", "m2", "m3", "m4"] {
            let outcome = sample(&pool, &constraints, seed).unwrap();
            let scenario = outcome
                .picked
                .iter()
                .filter(|item| item.categories.contains("scenario"))
                .count();
            assert_eq!(scenario, 3, "seed {seed}");
            assert_eq!(outcome.picked.len(), 5);
            assert!(outcome.shortfalls.is_empty());
        }
    }

    #[test]
    fn test_unmet_category_minimum_reported() {
        let mut pool = pool(&[("a", 10)]);
        pool[0].categories.insert("scenario".to_string());
        let constraints = SampleConstraints {
            total_count: 5,
            category_minimums: BTreeMap::from([("scenario".to_string(), 3)]),
            weight_groups: BTreeMap::new(),
        };
        let outcome = sample(&pool, &constraints, "unmet").unwrap();
        assert_eq!(
            outcome.shortfalls,
            vec![Shortfall::Category { category: "scenario".to_string(), required: 3, filled: 1 }]
        );
    }

    #[test]
    fn test_swap_keeps_other_minimum() {
        // Only interactive items are in the picked set's reach; scenario
        // swaps must not push interactive below its minimum.
        let mut pool = Vec::new();
        for i in 0..4 {
            pool.push(PoolItem::new(format!("i{i}"), "a").with_category("interactive"));
        }
        pool.push(PoolItem::new("s0", "a").with_category("scenario"));
        let constraints = SampleConstraints {
            total_count: 4,
            category_minimums: BTreeMap::from([
                ("interactive".to_string(), 4),
                ("scenario".to_string(), 1),
            ]),
            weight_groups: BTreeMap::new(),
        };
        let outcome = sample(&pool, &constraints, "keep").unwrap();
        let interactive = outcome
            .picked
            .iter()
            .filter(|item| item.categories.contains("interactive"))
            .count();
        let scenario = outcome.picked.len() - interactive;
        // whichever minimum was satisfied first stays satisfied
        assert!(interactive == 4 || scenario == 1);
        assert_eq!(outcome.shortfalls.len(), 1);
    }

    #[test]
    fn test_weakness_biases_selection() {
        let mut pool = Vec::new();
        for i in 0..50 {
            pool.push(PoolItem::new(format!("weak{i}"), "a").with_weakness(9.0));
            pool.push(PoolItem::new(format!("strong{i}"), "a"));
        }
        let constraints = SampleConstraints {
            total_count: 20,
            ..Default::default()
        };
        let outcome = sample(&pool, &constraints, "bias").unwrap();
        let weak = outcome.picked.iter().filter(|item| item.id.starts_with("weak")).count();
        assert!(weak > 10, "expected weak items to dominate, got {weak}");
    }

    #[test]
    fn test_invalid_constraints() {
        let pool = pool(&[("a", 3)]);
        let zero = SampleConstraints::default();
        assert!(matches!(
            sample(&pool, &zero, "s"),
            Err(EngineError::NonPositiveCount { .. })
        ));
        let negative = SampleConstraints {
            total_count: 2,
            weight_groups: weights(&[("a", -1.0)]),
            ..Default::default()
        };
        assert!(matches!(
            sample(&pool, &negative, "s"),
            Err(EngineError::InvalidWeight { .. })
        ));
        let zero_sum = SampleConstraints {
            total_count: 2,
            weight_groups: weights(&[("a", 0.0)]),
            ..Default::default()
        };
        assert!(matches!(
            sample(&pool, &zero_sum, "s"),
            Err(EngineError::WeightSum { .. })
        ));
        let ok = SampleConstraints {
            total_count: 2,
            ..Default::default()
        };
        assert!(matches!(sample(&pool, &ok, ""), Err(EngineError::EmptySeed)));
    }
}
