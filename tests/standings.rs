//! Integration tests for standings: points, tie-breaks, preselection order, bracket seeding.

use battle_tournament::logic::{points_for, rank_by_preselection};
use battle_tournament::models::{BattleResult, PerformerScore};
use battle_tournament::{
    rank, seed_bracket, Battle, BattlePhase, BattleStatus, Category, Format, NewCategory,
    OutcomeType, PerformerId, Pool, Score, Seeding,
};
use uuid::Uuid;

fn pool_category(names: &[&str], pool_outcome: OutcomeType) -> (Category, Pool) {
    let mut c = Category::new(
        Uuid::new_v4(),
        NewCategory {
            name: "Popping".to_string(),
            format: Format::OneVOne,
            quota: 4,
            groups_ideal: 2,
            pool_outcome,
        },
    )
    .unwrap();
    for name in names {
        c.register(name).unwrap();
    }
    let members = c.performers.iter().map(|p| p.id).collect();
    let pool = Pool::new(c.id, 0, members);
    c.pools.push(pool.clone());
    (c, pool)
}

fn id(c: &Category, name: &str) -> PerformerId {
    c.performers.iter().find(|p| p.name == name).unwrap().id
}

fn completed(c: &mut Category, pool: &Pool, phase: BattlePhase, performers: Vec<PerformerId>, result: BattleResult) {
    let seq = c.next_sequence_order();
    let outcome_type = match phase {
        BattlePhase::Tiebreak => OutcomeType::Tiebreak,
        _ => c.pool_outcome,
    };
    let mut battle = Battle::new(c.id, phase, outcome_type, performers, seq).in_pool(pool.id);
    battle.status = BattleStatus::Completed;
    battle.result = Some(result);
    c.battles.push(battle);
}

/// Win/draw pool battle between `a` and `b`; `winner = None` is a draw.
fn decided(c: &mut Category, pool: &Pool, a: PerformerId, b: PerformerId, winner: Option<PerformerId>) {
    let result = BattleResult {
        winner,
        draw: winner.is_none(),
        scores: Vec::new(),
    };
    completed(c, pool, BattlePhase::Pool, vec![a, b], result);
}

fn scored(c: &mut Category, pool: &Pool, a: (PerformerId, f64), b: (PerformerId, f64)) {
    let winner = if a.1 > b.1 {
        Some(a.0)
    } else if b.1 > a.1 {
        Some(b.0)
    } else {
        None
    };
    let result = BattleResult {
        winner,
        draw: winner.is_none(),
        scores: vec![
            PerformerScore {
                performer: a.0,
                score: Score::new(a.1).unwrap(),
            },
            PerformerScore {
                performer: b.0,
                score: Score::new(b.1).unwrap(),
            },
        ],
    };
    completed(c, pool, BattlePhase::Pool, vec![a.0, b.0], result);
}

#[test]
fn more_points_rank_higher() {
    // Y registers first so only points can put X ahead.
    let (mut c, pool) = pool_category(&["Y", "X", "Z", "W"], OutcomeType::WinDrawLoss);
    let (x, y, z, w) = (id(&c, "X"), id(&c, "Y"), id(&c, "Z"), id(&c, "W"));
    decided(&mut c, &pool, x, z, Some(x));
    decided(&mut c, &pool, x, w, Some(x));
    decided(&mut c, &pool, y, z, Some(y));
    decided(&mut c, &pool, y, w, None);

    assert_eq!(points_for(x, &pool, &c.battles), 6);
    assert_eq!(points_for(y, &pool, &c.battles), 4);
    let standings = rank(&c, &pool);
    assert_eq!(standings.order()[..2], [x, y]);
    assert_eq!(standings.entries[0].record.wins, 2);
    assert_eq!(standings.entries[1].record.draws, 1);
    assert_eq!(standings.leader(), Some(x));
}

#[test]
fn unresolved_ties_keep_registration_order() {
    let (mut c, pool) = pool_category(&["A", "B", "C", "D"], OutcomeType::WinDrawLoss);
    let (a, b, cc, d) = (id(&c, "A"), id(&c, "B"), id(&c, "C"), id(&c, "D"));
    decided(&mut c, &pool, b, d, Some(b));
    decided(&mut c, &pool, a, cc, Some(a));

    let standings = rank(&c, &pool);
    assert_eq!(standings.order(), vec![a, b, cc, d]);
    assert!(standings.entries.iter().all(|s| s.tied));
    assert_eq!(standings.unresolved, vec![vec![a, b], vec![cc, d]]);
    assert_eq!(standings.leader(), None);
    assert_eq!(standings.tied_leaders(), Some(&[a, b][..]));
}

#[test]
fn head_to_head_breaks_a_points_tie() {
    let (mut c, pool) = pool_category(&["A", "B", "C", "D"], OutcomeType::WinDrawLoss);
    let (a, b, cc, d) = (id(&c, "A"), id(&c, "B"), id(&c, "C"), id(&c, "D"));
    decided(&mut c, &pool, a, b, Some(b));
    decided(&mut c, &pool, a, cc, Some(a));
    decided(&mut c, &pool, a, d, Some(a));
    decided(&mut c, &pool, b, cc, Some(cc));
    decided(&mut c, &pool, b, d, Some(b));

    let standings = rank(&c, &pool);
    assert_eq!(standings.entries[0].points, 6);
    assert_eq!(standings.entries[1].points, 6);
    assert_eq!(standings.order()[..2], [b, a]);
    assert!(!standings.entries[0].tied);
    assert_eq!(standings.leader(), Some(b));
}

#[test]
fn cyclic_head_to_head_stays_unresolved() {
    let (mut c, pool) = pool_category(&["A", "B", "C"], OutcomeType::WinDrawLoss);
    let (a, b, cc) = (id(&c, "A"), id(&c, "B"), id(&c, "C"));
    decided(&mut c, &pool, a, b, Some(a));
    decided(&mut c, &pool, b, cc, Some(b));
    decided(&mut c, &pool, a, cc, Some(cc));

    let standings = rank(&c, &pool);
    assert_eq!(standings.order(), vec![a, b, cc]);
    assert_eq!(standings.unresolved, vec![vec![a, b, cc]]);
    assert_eq!(standings.tied_leaders(), Some(&[a, b, cc][..]));
}

#[test]
fn tiebreak_winner_moves_to_front_of_tied_group() {
    let (mut c, pool) = pool_category(&["A", "B", "C"], OutcomeType::WinDrawLoss);
    let (a, b, cc) = (id(&c, "A"), id(&c, "B"), id(&c, "C"));
    decided(&mut c, &pool, a, b, Some(a));
    decided(&mut c, &pool, b, cc, Some(b));
    decided(&mut c, &pool, a, cc, Some(cc));
    let result = BattleResult {
        winner: Some(cc),
        draw: false,
        scores: Vec::new(),
    };
    completed(&mut c, &pool, BattlePhase::Tiebreak, vec![a, b, cc], result);

    let standings = rank(&c, &pool);
    assert_eq!(standings.order(), vec![cc, a, b]);
    assert_eq!(standings.leader(), Some(cc));
    // points are untouched by the tiebreak
    assert!(standings.entries.iter().all(|s| s.points == 3));
    assert_eq!(standings.unresolved, vec![vec![a, b]]);
}

#[test]
fn scored_margin_breaks_tie_without_head_to_head() {
    let (mut c, pool) = pool_category(&["B", "A", "C", "D"], OutcomeType::Scored);
    let (a, b, cc, d) = (id(&c, "A"), id(&c, "B"), id(&c, "C"), id(&c, "D"));
    scored(&mut c, &pool, (b, 7.0), (d, 6.5));
    scored(&mut c, &pool, (a, 8.0), (cc, 6.0));

    let standings = rank(&c, &pool);
    assert_eq!(standings.order()[..2], [a, b]);
    assert_eq!(standings.entries[0].margin, 20);
    assert_eq!(standings.entries[1].margin, 5);
    assert!(!standings.entries[0].tied);
}

#[test]
fn margin_is_ignored_for_win_draw_loss_pools() {
    let (mut c, pool) = pool_category(&["B", "A", "C", "D"], OutcomeType::WinDrawLoss);
    let (a, b, cc, d) = (id(&c, "A"), id(&c, "B"), id(&c, "C"), id(&c, "D"));
    decided(&mut c, &pool, b, d, Some(b));
    decided(&mut c, &pool, a, cc, Some(a));

    let standings = rank(&c, &pool);
    assert_eq!(standings.order()[..2], [b, a]);
    assert!(standings.entries[0].tied);
}

#[test]
fn preselection_ranking_breaks_score_ties_by_registration() {
    let (mut c, _) = pool_category(&["A", "B", "C", "D"], OutcomeType::WinDrawLoss);
    let scores = [7.5, 9.0, 7.5, 8.0];
    for (p, s) in c.performers.iter_mut().zip(scores) {
        p.preselection_score = Some(Score::new(s).unwrap());
    }
    let (a, b, cc, d) = (id(&c, "A"), id(&c, "B"), id(&c, "C"), id(&c, "D"));
    assert_eq!(rank_by_preselection(&c.performers), vec![b, d, a, cc]);
}

#[test]
fn eight_seeds_fill_the_bracket() {
    let seeds: Vec<PerformerId> = (0..8).map(|_| Uuid::new_v4()).collect();
    let first_round = seed_bracket(&seeds);
    assert_eq!(
        first_round,
        vec![
            Seeding::Pair(seeds[0], seeds[7]),
            Seeding::Pair(seeds[3], seeds[4]),
            Seeding::Pair(seeds[1], seeds[6]),
            Seeding::Pair(seeds[2], seeds[5]),
        ]
    );
}

#[test]
fn five_seeds_give_byes_to_the_top_three() {
    let seeds: Vec<PerformerId> = (0..5).map(|_| Uuid::new_v4()).collect();
    let first_round = seed_bracket(&seeds);
    assert_eq!(
        first_round,
        vec![
            Seeding::Bye(seeds[0]),
            Seeding::Pair(seeds[3], seeds[4]),
            Seeding::Bye(seeds[1]),
            Seeding::Bye(seeds[2]),
        ]
    );
    let battles = first_round.iter().filter(|s| matches!(s, Seeding::Pair(..))).count();
    assert_eq!(battles, 1);
}

#[test]
fn small_brackets() {
    let seeds: Vec<PerformerId> = (0..3).map(|_| Uuid::new_v4()).collect();
    assert_eq!(seed_bracket(&seeds[..1]), vec![Seeding::Bye(seeds[0])]);
    assert_eq!(seed_bracket(&seeds[..2]), vec![Seeding::Pair(seeds[0], seeds[1])]);
    assert_eq!(
        seed_bracket(&seeds),
        vec![Seeding::Bye(seeds[0]), Seeding::Pair(seeds[1], seeds[2])]
    );
    assert!(seed_bracket(&[]).is_empty());
}
