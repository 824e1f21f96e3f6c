//! Phase transitions: builds the pools and battles of the next phase, and the follow-up
//! battles that completed ones trigger (pool tiebreaks, later bracket rounds).
//!
//! Generation never mutates a category. It returns a [`Generated`] plan that the caller
//! applies once every category of the tournament has been planned, so a failure in one
//! category leaves all of them untouched. Given the same category, the plan is identical,
//! battle and pool ids included.

use crate::error::{Result, TournamentError};
use crate::logic::battle::BattleCompleted;
use crate::logic::standings::{points_for, rank, rank_by_preselection, seed_bracket, Seeding};
use crate::models::{
    Battle, BattlePhase, Bracket, BracketRound, BracketSlot, Category, OutcomeType, PerformerId,
    Pool, PoolId, TournamentPhase,
};

/// Entities produced for one category.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Generated {
    pub pools: Vec<Pool>,
    pub battles: Vec<Battle>,
    pub pool_winners: Vec<(PoolId, PerformerId)>,
    /// Replaces the category's bracket when set.
    pub bracket: Option<Bracket>,
}

impl Generated {
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
            && self.battles.is_empty()
            && self.pool_winners.is_empty()
            && self.bracket.is_none()
    }

    pub fn apply(self, category: &mut Category) {
        category.pools.extend(self.pools);
        category.battles.extend(self.battles);
        for (pool_id, winner) in self.pool_winners {
            if let Some(pool) = category.pools.iter_mut().find(|p| p.id == pool_id) {
                pool.winner = Some(winner);
            }
        }
        if let Some(bracket) = self.bracket {
            category.bracket = Some(bracket);
        }
    }
}

/// Plan the entities a category needs when the tournament enters `target`.
pub fn generate(category: &Category, target: TournamentPhase) -> Result<Generated> {
    let generated = match target {
        TournamentPhase::Registration => {
            return Err(TournamentError::invalid_transition(
                "none",
                target,
                "registration is never entered by a transition",
            ))
        }
        TournamentPhase::Preselection => preselection(category),
        TournamentPhase::Pools => pools(category),
        TournamentPhase::Finals => finals(category)?,
        TournamentPhase::Completed => Generated::default(),
    };
    log::debug!(
        "category '{}' entering {}: {} pools, {} battles",
        category.name,
        target,
        generated.pools.len(),
        generated.battles.len()
    );
    Ok(generated)
}

/// Registration order, in pairs; an odd performer out joins the last pair.
pub fn preselection_groups(performers: &[PerformerId]) -> Vec<Vec<PerformerId>> {
    let mut groups: Vec<Vec<PerformerId>> = performers.chunks(2).map(<[_]>::to_vec).collect();
    if groups.len() > 1 && groups.last().is_some_and(|g| g.len() == 1) {
        if let Some(odd) = groups.pop() {
            if let Some(last) = groups.last_mut() {
                last.extend(odd);
            }
        }
    }
    groups
}

fn preselection(category: &Category) -> Generated {
    let ids: Vec<PerformerId> = category.performers.iter().map(|p| p.id).collect();
    let first = category.next_sequence_order();
    let battles = preselection_groups(&ids)
        .into_iter()
        .zip(first..)
        .map(|(group, seq)| {
            Battle::new(category.id, BattlePhase::Preselection, OutcomeType::Scored, group, seq)
        })
        .collect();
    Generated {
        battles,
        ..Generated::default()
    }
}

/// Round-robin seeding: seed 1 → pool 1, seed 2 → pool 2, ..., wrapping around.
pub fn distribute(ranked: &[PerformerId], groups: usize) -> Vec<Vec<PerformerId>> {
    let mut pools = vec![Vec::new(); groups];
    if groups == 0 {
        return pools;
    }
    for (i, &p) in ranked.iter().enumerate() {
        pools[i % groups].push(p);
    }
    pools
}

/// Every unordered pairing of `n` members as index pairs `(i, j)` with `i < j`,
/// scheduled with the circle method so nobody battles twice in a row when avoidable.
pub fn round_robin_pairs(n: usize) -> Vec<(usize, usize)> {
    if n < 2 {
        return Vec::new();
    }
    let slots = n + n % 2;
    let mut ring: Vec<usize> = (0..slots).collect();
    let mut pairs = Vec::with_capacity(n * (n - 1) / 2);
    for _ in 0..slots - 1 {
        for i in 0..slots / 2 {
            let (a, b) = (ring[i], ring[slots - 1 - i]);
            // index n is the bye when n is odd
            if a < n && b < n {
                pairs.push((a.min(b), a.max(b)));
            }
        }
        ring[1..].rotate_right(1);
    }
    pairs
}

fn pools(category: &Category) -> Generated {
    let ranked = rank_by_preselection(&category.performers);
    let qualified = &ranked[..category.quota.min(ranked.len())];
    let mut seq = category.next_sequence_order();
    let mut out = Generated::default();

    for (index, members) in distribute(qualified, category.groups_ideal)
        .into_iter()
        .enumerate()
    {
        let pool = Pool::new(category.id, index, members);
        for (a, b) in round_robin_pairs(pool.performers.len()) {
            out.battles.push(
                Battle::new(
                    category.id,
                    BattlePhase::Pool,
                    category.pool_outcome,
                    vec![pool.performers[a], pool.performers[b]],
                    seq,
                )
                .in_pool(pool.id),
            );
            seq += 1;
        }
        out.pools.push(pool);
    }
    out
}

/// Pool winners, best first: pool points, then pool order.
pub fn finalists(category: &Category) -> Result<Vec<PerformerId>> {
    let mut missing = Vec::new();
    let mut ranked: Vec<(PerformerId, u32)> = Vec::with_capacity(category.pools.len());
    for pool in &category.pools {
        match pool.winner {
            Some(w) => ranked.push((w, points_for(w, pool, &category.battles))),
            None => missing.push(format!(
                "{} in '{}' has no winner",
                pool.name, category.name
            )),
        }
    }
    if !missing.is_empty() {
        return Err(TournamentError::Validation(missing));
    }
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(ranked.into_iter().map(|(p, _)| p).collect())
}

fn finals(category: &Category) -> Result<Generated> {
    let seeds = finalists(category)?;
    let mut seq = category.next_sequence_order();
    let mut battles = Vec::new();
    let mut slots = Vec::new();

    // Only the first round exists up front; the rest follow completed battles.
    for seeding in seed_bracket(&seeds) {
        match seeding {
            Seeding::Bye(performer) => slots.push(BracketSlot::Bye { performer }),
            Seeding::Pair(a, b) => {
                let battle = finals_battle(category, vec![a, b], seq, 0);
                seq += 1;
                slots.push(BracketSlot::Battle { battle_id: battle.id });
                battles.push(battle);
            }
        }
    }

    Ok(Generated {
        battles,
        bracket: Some(Bracket {
            seeds,
            rounds: vec![BracketRound { index: 0, slots }],
            champion: None,
        }),
        ..Generated::default()
    })
}

fn finals_battle(category: &Category, performers: Vec<PerformerId>, seq: u32, round: u32) -> Battle {
    Battle::new(category.id, BattlePhase::Finals, OutcomeType::WinLoss, performers, seq).in_round(round)
}

/// React to a completed battle: settle its pool or move the bracket forward.
pub fn on_battle_completed(category: &Category, event: &BattleCompleted) -> Result<Generated> {
    match event.phase {
        BattlePhase::Preselection => Ok(Generated::default()),
        BattlePhase::Pool | BattlePhase::Tiebreak => Ok(event
            .pool_id
            .and_then(|id| category.pool(id))
            .map(|pool| settle_pool(category, pool))
            .unwrap_or_default()),
        BattlePhase::Finals => advance_bracket(category, event),
    }
}

/// Once all of a pool's battles are done, name its winner, or schedule a tiebreak
/// between the performers tied for first.
pub fn settle_pool(category: &Category, pool: &Pool) -> Generated {
    let mut out = Generated::default();
    if pool.winner.is_some() || category.pool_battles(pool.id).any(|b| !b.is_completed()) {
        return out;
    }
    let standings = rank(category, pool);
    if let Some(leader) = standings.leader() {
        log::info!("{} in '{}' won by {}", pool.name, category.name, leader);
        out.pool_winners.push((pool.id, leader));
    } else if let Some(tied) = standings.tied_leaders() {
        log::info!(
            "{} in '{}' has {} performers tied for first, scheduling a tiebreak",
            pool.name,
            category.name,
            tied.len()
        );
        out.battles.push(
            Battle::new(
                category.id,
                BattlePhase::Tiebreak,
                OutcomeType::Tiebreak,
                tied.to_vec(),
                category.next_sequence_order(),
            )
            .in_pool(pool.id),
        );
    }
    out
}

fn advance_bracket(category: &Category, event: &BattleCompleted) -> Result<Generated> {
    let Some(bracket) = &category.bracket else {
        return Ok(Generated::default());
    };
    let Some(round) = bracket.current_round() else {
        return Ok(Generated::default());
    };
    if bracket.round_of(event.battle_id).map(|r| r.index) != Some(round.index) {
        return Ok(Generated::default());
    }

    let mut winners = Vec::with_capacity(round.slots.len());
    for slot in &round.slots {
        match *slot {
            BracketSlot::Bye { performer } => winners.push(performer),
            BracketSlot::Battle { battle_id } => {
                let battle = category
                    .battle(battle_id)
                    .ok_or(TournamentError::not_found("battle", battle_id))?;
                match battle.winner() {
                    Some(w) if battle.is_completed() => winners.push(w),
                    // round still running
                    _ => return Ok(Generated::default()),
                }
            }
        }
    }

    let mut next = bracket.clone();
    if let [champion] = winners.as_slice() {
        log::info!("'{}' won by {}", category.name, champion);
        next.champion = Some(*champion);
        return Ok(Generated {
            bracket: Some(next),
            ..Generated::default()
        });
    }

    let index = round.index + 1;
    let mut seq = category.next_sequence_order();
    let mut battles = Vec::new();
    let mut slots = Vec::new();
    for pair in winners.chunks(2) {
        match *pair {
            [a, b] => {
                let battle = finals_battle(category, vec![a, b], seq, index);
                seq += 1;
                slots.push(BracketSlot::Battle { battle_id: battle.id });
                battles.push(battle);
            }
            [a] => slots.push(BracketSlot::Bye { performer: a }),
            _ => {}
        }
    }
    log::debug!(
        "'{}' bracket round {} generated with {} battles",
        category.name,
        index,
        battles.len()
    );
    next.rounds.push(BracketRound { index, slots });
    Ok(Generated {
        battles,
        bracket: Some(next),
        ..Generated::default()
    })
}
