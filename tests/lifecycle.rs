//! Integration tests for the tournament lifecycle: registration, phase advance, cancellation.

mod common;

use battle_tournament::logic::cancel;
use battle_tournament::{
    advance_phase, phase_validation, start_battle, BattlePhase, Tournament, TournamentError,
    TournamentPhase, TournamentStatus,
};
use common::*;

#[test]
fn new_tournament_starts_in_registration() {
    let t = Tournament::new("Battle-D Open", date());
    assert_eq!(t.status, TournamentStatus::Created);
    assert_eq!(t.phase, TournamentPhase::Registration);
    assert!(t.categories.is_empty());
}

#[test]
fn category_parameters_are_validated() {
    let mut t = Tournament::new("Battle-D Open", date());
    let err = t.add_category(new_category("Breaking", 3, 2)).unwrap_err();
    assert!(matches!(err, TournamentError::Validation(_)));
    let err = t.add_category(new_category("  ", 4, 0)).unwrap_err();
    match err {
        TournamentError::Validation(problems) => assert_eq!(problems.len(), 2),
        other => panic!("unexpected error: {other:?}"),
    }

    // a single pool would leave the finals without a battle
    let err = t.add_category(new_category("Breaking", 3, 1)).unwrap_err();
    match err {
        TournamentError::Validation(problems) => {
            assert_eq!(problems, vec!["groups_ideal must be at least 2".to_string()]);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    t.add_category(new_category("Breaking", 4, 2)).unwrap();
    let err = t.add_category(new_category("breaking", 4, 2)).unwrap_err();
    assert!(matches!(err, TournamentError::Validation(_)));
    assert_eq!(t.categories.len(), 1);
}

#[test]
fn duplicate_performer_names_are_rejected() {
    let (mut t, cid) = tournament_with_performers(2, 4, 2);
    let err = t.register_performer(cid, "b-boy 0").unwrap_err();
    assert!(matches!(err, TournamentError::Validation(_)));
    assert_eq!(category(&t, cid).performers.len(), 2);
}

#[test]
fn advance_needs_categories() {
    let mut t = Tournament::new("Battle-D Open", date());
    let validation = phase_validation(&t);
    assert!(!validation.ready);
    assert_eq!(validation.next_phase, Some(TournamentPhase::Preselection));
    assert_eq!(validation.blockers, vec!["tournament has no categories".to_string()]);
    assert!(matches!(advance_phase(&mut t), Err(TournamentError::Validation(_))));
}

#[test]
fn advance_needs_minimum_performers() {
    // two pools need 2 * 2 + 1 performers
    let (mut t, cid) = tournament_with_performers(4, 4, 2);
    let before = t.clone();
    let err = advance_phase(&mut t).unwrap_err();
    match err {
        TournamentError::Validation(blockers) => {
            assert_eq!(blockers.len(), 1);
            assert!(blockers[0].contains("at least 5"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(t, before);

    t.register_performer(cid, "B-Girl Last").unwrap();
    assert!(phase_validation(&t).ready);
    assert_eq!(advance_phase(&mut t).unwrap(), TournamentPhase::Preselection);
}

#[test]
fn first_advance_activates_the_tournament() {
    let (mut t, _) = tournament_with_performers(5, 4, 2);
    advance_phase(&mut t).unwrap();
    assert_eq!(t.status, TournamentStatus::Active);
    assert_eq!(t.phase, TournamentPhase::Preselection);
}

#[test]
fn registration_closes_after_first_advance() {
    let (mut t, cid) = tournament_with_performers(5, 4, 2);
    advance_phase(&mut t).unwrap();
    let err = t.register_performer(cid, "Latecomer").unwrap_err();
    assert!(matches!(err, TournamentError::InvalidTransition { .. }));
    let err = t.add_category(new_category("Popping", 4, 2)).unwrap_err();
    assert!(matches!(err, TournamentError::InvalidTransition { .. }));
}

#[test]
fn pools_wait_for_every_preselection_score() {
    let (mut t, cid) = tournament_with_performers(5, 4, 2);
    advance_phase(&mut t).unwrap();
    let first = pending(&t, cid, BattlePhase::Preselection)[0].clone();
    let entries: Vec<_> = first.performers.iter().map(|&p| (p, 8.0)).collect();
    play(&mut t, first.id, battle_tournament::Outcome::scored(entries));

    let validation = phase_validation(&t);
    assert!(!validation.ready);
    assert_eq!(validation.blockers.len(), 3);
    assert!(validation.blockers.iter().all(|b| b.contains("no preselection score")));

    let before = t.clone();
    assert!(matches!(advance_phase(&mut t), Err(TournamentError::Validation(_))));
    assert_eq!(t, before);
}

#[test]
fn an_active_battle_blocks_the_advance() {
    let (mut t, cid) = tournament_with_performers(5, 4, 2);
    advance_phase(&mut t).unwrap();
    let battles = pending(&t, cid, BattlePhase::Preselection);
    start_battle(&mut t, battles[0].id).unwrap();

    let validation = phase_validation(&t);
    assert!(validation.blockers.iter().any(|b| b.contains("still active")));
    assert!(advance_phase(&mut t).is_err());
    assert_eq!(t.phase, TournamentPhase::Preselection);
}

#[test]
fn completed_tournament_cannot_advance_again() {
    let (mut t, cid) = tournament_with_performers(5, 4, 2);
    advance_phase(&mut t).unwrap();
    judge_preselection(&mut t, cid, &descending_scores(5));
    advance_phase(&mut t).unwrap();
    play_pools_first_wins(&mut t, cid);
    advance_phase(&mut t).unwrap();
    play_finals_first_wins(&mut t, cid);
    assert_eq!(advance_phase(&mut t).unwrap(), TournamentPhase::Completed);
    assert_eq!(t.status, TournamentStatus::Completed);

    let before = t.clone();
    let battle_count = t.battles().count();
    for _ in 0..2 {
        let err = advance_phase(&mut t).unwrap_err();
        assert!(matches!(err, TournamentError::InvalidTransition { .. }));
        assert_eq!(t.battles().count(), battle_count);
    }
    assert_eq!(t, before);

    let validation = phase_validation(&t);
    assert!(!validation.ready);
    assert_eq!(validation.next_phase, None);
}

#[test]
fn finals_wait_for_a_champion() {
    let (mut t, cid) = tournament_with_performers(5, 4, 2);
    advance_phase(&mut t).unwrap();
    judge_preselection(&mut t, cid, &descending_scores(5));
    advance_phase(&mut t).unwrap();
    play_pools_first_wins(&mut t, cid);
    advance_phase(&mut t).unwrap();

    let validation = phase_validation(&t);
    assert_eq!(validation.next_phase, Some(TournamentPhase::Completed));
    assert!(validation.blockers.iter().any(|b| b.contains("not decided")));
}

#[test]
fn cancel_is_terminal() {
    let (mut t, _) = tournament_with_performers(5, 4, 2);
    cancel(&mut t).unwrap();
    assert_eq!(t.status, TournamentStatus::Cancelled);

    assert!(matches!(cancel(&mut t), Err(TournamentError::InvalidTransition { .. })));
    assert!(matches!(advance_phase(&mut t), Err(TournamentError::InvalidTransition { .. })));
    assert!(!phase_validation(&t).ready);
}

#[test]
fn cancel_refused_while_a_battle_runs() {
    let (mut t, cid) = tournament_with_performers(5, 4, 2);
    advance_phase(&mut t).unwrap();
    let battle = pending(&t, cid, BattlePhase::Preselection)[0].clone();
    start_battle(&mut t, battle.id).unwrap();

    assert!(matches!(cancel(&mut t), Err(TournamentError::InvalidTransition { .. })));
    assert_eq!(t.status, TournamentStatus::Active);
}

#[test]
fn finals_wait_for_every_pool_battle() {
    let (mut t, cid) = tournament_with_performers(5, 5, 2);
    advance_phase(&mut t).unwrap();
    judge_preselection(&mut t, cid, &descending_scores(5));
    advance_phase(&mut t).unwrap();

    // leave the last pool battle of Pool A open
    let open = pending(&t, cid, BattlePhase::Pool);
    for battle in &open[1..] {
        play(&mut t, battle.id, battle_tournament::Outcome::win(battle.performers[0]));
    }

    let validation = phase_validation(&t);
    assert!(!validation.ready);
    assert_eq!(validation.next_phase, Some(TournamentPhase::Finals));
    assert_eq!(
        validation.blockers,
        vec!["Pool A in 'Breaking' has 1 battles not completed".to_string()]
    );

    let before = t.clone();
    match advance_phase(&mut t) {
        Err(TournamentError::Validation(blockers)) => assert_eq!(blockers, validation.blockers),
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(t, before);
    assert!(battles_in(&t, cid, BattlePhase::Finals).is_empty());
}

#[test]
fn finals_always_start_with_a_battle() {
    let (mut t, cid) = tournament_with_performers(5, 4, 2);
    advance_phase(&mut t).unwrap();
    judge_preselection(&mut t, cid, &descending_scores(5));
    advance_phase(&mut t).unwrap();
    play_pools_first_wins(&mut t, cid);
    advance_phase(&mut t).unwrap();

    assert_eq!(pending(&t, cid, BattlePhase::Finals).len(), 1);
    assert_eq!(category(&t, cid).bracket.as_ref().unwrap().champion, None);
    assert!(matches!(advance_phase(&mut t), Err(TournamentError::Validation(_))));
}
