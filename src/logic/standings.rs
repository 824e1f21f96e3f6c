//! Standings: pool points, ranking with tie-breaks, preselection order and bracket seeding.
//!
//! Everything here is computed from the category's performers and battles; nothing is cached.

use crate::models::{
    Battle, BattlePhase, Category, OutcomeType, Performer, PerformerId, Pool, PoolId, PoolRecord,
};
use serde::Serialize;
use std::collections::HashMap;

/// One row of a pool table.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Standing {
    /// 1-based.
    pub position: usize,
    pub performer: PerformerId,
    pub name: String,
    pub record: PoolRecord,
    pub points: u32,
    /// Own minus opponents' score in tenths, summed over scored pool battles.
    pub margin: i32,
    /// Still level with a neighbour after every tie-break.
    pub tied: bool,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Standings {
    pub pool_id: PoolId,
    pub pool_name: String,
    pub entries: Vec<Standing>,
    /// Groups that no criterion could separate, in table order.
    pub unresolved: Vec<Vec<PerformerId>>,
}

impl Standings {
    pub fn order(&self) -> Vec<PerformerId> {
        self.entries.iter().map(|s| s.performer).collect()
    }

    /// Unique leader, or None when the top of the table is tied (or empty).
    pub fn leader(&self) -> Option<PerformerId> {
        self.entries.first().filter(|s| !s.tied).map(|s| s.performer)
    }

    /// Performers tied for first place, if the top is ambiguous.
    pub fn tied_leaders(&self) -> Option<&[PerformerId]> {
        let first = self.entries.first()?;
        if !first.tied {
            return None;
        }
        self.unresolved
            .iter()
            .find(|g| g.contains(&first.performer))
            .map(Vec::as_slice)
    }
}

/// Completed round-robin battles of a pool (tiebreaks excluded).
fn pool_results<'a>(pool: &'a Pool, battles: &'a [Battle]) -> impl Iterator<Item = &'a Battle> + 'a {
    battles
        .iter()
        .filter(move |b| b.phase == BattlePhase::Pool && b.pool_id == Some(pool.id) && b.is_completed())
}

pub fn record_for(performer: PerformerId, pool: &Pool, battles: &[Battle]) -> PoolRecord {
    let mut record = PoolRecord::default();
    for result in pool_results(pool, battles)
        .filter(|b| b.involves(performer))
        .filter_map(|b| b.result.as_ref())
    {
        record.add(performer, result);
    }
    record
}

/// Win 3, draw 1, loss 0 over the pool's completed battles.
pub fn points_for(performer: PerformerId, pool: &Pool, battles: &[Battle]) -> u32 {
    record_for(performer, pool, battles).points()
}

fn margin_for(performer: PerformerId, pool: &Pool, battles: &[Battle]) -> i32 {
    pool_results(pool, battles)
        .filter(|b| b.involves(performer))
        .filter_map(|b| b.result.as_ref())
        .map(|r| {
            let own = r.score_of(performer).map_or(0, |s| i32::from(s.tenths()));
            let others: i32 = r
                .scores
                .iter()
                .filter(|s| s.performer != performer)
                .map(|s| i32::from(s.score.tenths()))
                .sum();
            own - others
        })
        .sum()
}

/// Points earned only in battles where every participant belongs to `group`.
fn head_to_head_points(performer: PerformerId, group: &[PerformerId], pool: &Pool, battles: &[Battle]) -> u32 {
    let mut record = PoolRecord::default();
    for result in pool_results(pool, battles)
        .filter(|b| b.involves(performer) && b.performers.iter().all(|p| group.contains(p)))
        .filter_map(|b| b.result.as_ref())
    {
        record.add(performer, result);
    }
    record.points()
}

#[derive(Clone, Copy, Debug)]
enum TieBreak {
    HeadToHead,
    Margin,
}

struct Ranker<'a> {
    pool: &'a Pool,
    battles: &'a [Battle],
}

impl Ranker<'_> {
    fn key(&self, criterion: TieBreak, performer: PerformerId, group: &[PerformerId]) -> i64 {
        match criterion {
            TieBreak::HeadToHead => i64::from(head_to_head_points(performer, group, self.pool, self.battles)),
            TieBreak::Margin => i64::from(margin_for(performer, self.pool, self.battles)),
        }
    }

    /// Split a group of performers level on points into ordered sub-groups.
    /// Sub-groups with more than one member are unresolved.
    fn resolve(&self, group: Vec<PerformerId>, criteria: &[TieBreak]) -> Vec<Vec<PerformerId>> {
        if group.len() < 2 {
            return vec![group];
        }
        let Some((&criterion, rest)) = criteria.split_first() else {
            return vec![group];
        };
        let mut keyed: Vec<(PerformerId, i64)> = group
            .iter()
            .map(|&p| (p, self.key(criterion, p, &group)))
            .collect();
        if keyed.iter().all(|(_, k)| *k == keyed[0].1) {
            return self.resolve(group, rest);
        }
        keyed.sort_by(|a, b| b.1.cmp(&a.1));

        // Each smaller sub-group starts over, so head-to-head is recomputed
        // among exactly the performers still level.
        let mut out = Vec::new();
        for sub in split_runs(&keyed) {
            out.extend(self.resolve(sub, criteria));
        }
        out
    }
}

/// Consecutive runs of equal keys.
fn split_runs<K: PartialEq + Copy>(keyed: &[(PerformerId, K)]) -> Vec<Vec<PerformerId>> {
    let mut runs: Vec<Vec<PerformerId>> = Vec::new();
    let mut last: Option<K> = None;
    for &(p, k) in keyed {
        if last == Some(k) {
            if let Some(run) = runs.last_mut() {
                run.push(p);
                continue;
            }
        }
        runs.push(vec![p]);
        last = Some(k);
    }
    runs
}

/// Rank a pool: points, then head-to-head among the tied, then scored margin
/// (scored pools only), then registration order (flagged as unresolved).
/// A completed tiebreak battle moves its winner to the front of its tied group.
pub fn rank(category: &Category, pool: &Pool) -> Standings {
    let battles = category.battles.as_slice();
    let mut members = pool.performers.clone();
    members.sort_by_key(|&p| category.registration_order(p));

    let records: HashMap<PerformerId, PoolRecord> = members
        .iter()
        .map(|&p| (p, record_for(p, pool, battles)))
        .collect();
    members.sort_by(|a, b| records[b].points().cmp(&records[a].points()));

    let criteria: &[TieBreak] = if category.pool_outcome == OutcomeType::Scored {
        &[TieBreak::HeadToHead, TieBreak::Margin]
    } else {
        &[TieBreak::HeadToHead]
    };
    let ranker = Ranker { pool, battles };
    let keyed: Vec<(PerformerId, u32)> = members.iter().map(|&p| (p, records[&p].points())).collect();
    let mut groups: Vec<Vec<PerformerId>> = split_runs(&keyed)
        .into_iter()
        .flat_map(|g| ranker.resolve(g, criteria))
        .collect();

    for tiebreak in category
        .pool_battles(pool.id)
        .filter(|b| b.phase == BattlePhase::Tiebreak && b.is_completed())
    {
        let Some(winner) = tiebreak.winner() else { continue };
        let Some(idx) = groups.iter().position(|g| {
            g.len() > 1 && g.contains(&winner) && tiebreak.performers.iter().all(|p| g.contains(p))
        }) else {
            continue;
        };
        let rest: Vec<PerformerId> = groups[idx].iter().copied().filter(|&p| p != winner).collect();
        groups[idx] = rest;
        groups.insert(idx, vec![winner]);
    }

    let mut entries = Vec::with_capacity(pool.performers.len());
    for group in &groups {
        for &performer in group {
            let record = records[&performer];
            entries.push(Standing {
                position: entries.len() + 1,
                performer,
                name: category
                    .performer(performer)
                    .map(|p| p.name.clone())
                    .unwrap_or_default(),
                record,
                points: record.points(),
                margin: margin_for(performer, pool, battles),
                tied: group.len() > 1,
            });
        }
    }

    Standings {
        pool_id: pool.id,
        pool_name: pool.name.clone(),
        entries,
        unresolved: groups.into_iter().filter(|g| g.len() > 1).collect(),
    }
}

/// Preselection ranking: score descending, unscored last, ties by registration order.
pub fn rank_by_preselection(performers: &[Performer]) -> Vec<PerformerId> {
    let mut ranked: Vec<&Performer> = performers.iter().collect();
    ranked.sort_by(|a, b| {
        b.preselection_score
            .cmp(&a.preselection_score)
            .then(a.registration_order.cmp(&b.registration_order))
    });
    ranked.into_iter().map(|p| p.id).collect()
}

/// A first-round bracket position.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Seeding {
    Bye(PerformerId),
    Pair(PerformerId, PerformerId),
}

/// Standard power-of-two seeding (1 vs N, 2 vs N-1, ...), in bracket order so that
/// seeds 1 and 2 can only meet in the final. Missing opponents become byes for the
/// best seeds.
pub fn seed_bracket(ranked: &[PerformerId]) -> Vec<Seeding> {
    let n = ranked.len();
    match n {
        0 => return Vec::new(),
        1 => return vec![Seeding::Bye(ranked[0])],
        _ => {}
    }
    bracket_order(n.next_power_of_two())
        .chunks_exact(2)
        .map(|pair| {
            let (high, low) = (pair[0], pair[1]);
            if low > n {
                Seeding::Bye(ranked[high - 1])
            } else {
                Seeding::Pair(ranked[high - 1], ranked[low - 1])
            }
        })
        .collect()
}

/// 1-based seed order of a bracket: 2 → [1,2], 4 → [1,4,2,3], 8 → [1,8,4,5,2,7,3,6].
fn bracket_order(size: usize) -> Vec<usize> {
    let mut order = vec![1];
    while order.len() < size {
        let sum = order.len() * 2 + 1;
        order = order.iter().flat_map(|&s| [s, sum - s]).collect();
    }
    order
}
