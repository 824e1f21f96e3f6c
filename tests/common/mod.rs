//! Fixtures shared by the integration tests.
#![allow(dead_code)]

use battle_tournament::logic::record_outcome;
use battle_tournament::{
    start_battle, Battle, BattleId, BattlePhase, BattleStatus, Category, CategoryId, Format,
    NewCategory, Outcome, OutcomeType, PerformerId, PhaseGenerator, Tournament,
};
use chrono::NaiveDate;

pub fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 5, 1).unwrap()
}

pub fn new_category(name: &str, quota: usize, groups_ideal: usize) -> NewCategory {
    NewCategory {
        name: name.to_string(),
        format: Format::OneVOne,
        quota,
        groups_ideal,
        pool_outcome: OutcomeType::WinDrawLoss,
    }
}

/// Tournament in registration with one category of `n` performers named "B-Boy {i}".
pub fn tournament_with_performers(n: usize, quota: usize, groups_ideal: usize) -> (Tournament, CategoryId) {
    let mut t = Tournament::new("Battle-D Open", date());
    let cid = t.add_category(new_category("Breaking", quota, groups_ideal)).unwrap();
    for i in 0..n {
        t.register_performer(cid, &format!("B-Boy {i}")).unwrap();
    }
    (t, cid)
}

pub fn category(t: &Tournament, cid: CategoryId) -> &Category {
    t.category(cid).unwrap()
}

/// Performer ids in registration order.
pub fn performer_ids(t: &Tournament, cid: CategoryId) -> Vec<PerformerId> {
    category(t, cid).performers.iter().map(|p| p.id).collect()
}

pub fn battles_in(t: &Tournament, cid: CategoryId, phase: BattlePhase) -> Vec<Battle> {
    category(t, cid)
        .battles
        .iter()
        .filter(|b| b.phase == phase)
        .cloned()
        .collect()
}

pub fn pending(t: &Tournament, cid: CategoryId, phase: BattlePhase) -> Vec<Battle> {
    battles_in(t, cid, phase)
        .into_iter()
        .filter(|b| b.status == BattleStatus::Pending)
        .collect()
}

/// Start a battle and record its outcome.
pub fn play(t: &mut Tournament, battle_id: BattleId, outcome: Outcome) {
    start_battle(t, battle_id).unwrap();
    record_outcome(t, battle_id, &outcome, &PhaseGenerator).unwrap();
}

/// Judge every preselection battle; `scores[i]` belongs to the i-th registered performer.
pub fn judge_preselection(t: &mut Tournament, cid: CategoryId, scores: &[f64]) {
    for battle in pending(t, cid, BattlePhase::Preselection) {
        let entries: Vec<(PerformerId, f64)> = battle
            .performers
            .iter()
            .map(|&p| {
                let order = category(t, cid).performer(p).unwrap().registration_order;
                (p, scores[order as usize])
            })
            .collect();
        play(t, battle.id, Outcome::scored(entries));
    }
}

/// The first-listed (better seeded) performer wins every pending pool battle.
pub fn play_pools_first_wins(t: &mut Tournament, cid: CategoryId) {
    for battle in pending(t, cid, BattlePhase::Pool) {
        play(t, battle.id, Outcome::win(battle.performers[0]));
    }
}

/// The first-listed performer wins every pending finals battle, round after round.
pub fn play_finals_first_wins(t: &mut Tournament, cid: CategoryId) {
    loop {
        let open = pending(t, cid, BattlePhase::Finals);
        if open.is_empty() {
            break;
        }
        for battle in open {
            play(t, battle.id, Outcome::knockout(battle.performers[0]));
        }
    }
}

/// Descending distinct scores: 9.0, 8.5, 8.0, ...
pub fn descending_scores(n: usize) -> Vec<f64> {
    (0..n).map(|i| 9.0 - 0.5 * i as f64).collect()
}
