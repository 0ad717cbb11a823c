use super::*;
use crate::error::AnalysisError;

fn baseline() -> Analysis {
    Analysis::compute(CardDistribution::single_deck())
}

#[test]
fn test_baseline_ev_is_small_house_edge() {
    let analysis = baseline();
    let ev = analysis.ev();
    assert!(
        ev < -0.001 && ev > -0.015,
        "single-deck basic strategy EV {:.5} out of expected range",
        ev
    );
}

#[test]
fn test_baseline_variance() {
    let analysis = baseline();
    let v = analysis.variance();
    // per-hand outcome variance for blackjack sits near 1.3
    assert!(v > 1.0 && v < 1.5, "variance {:.4} out of range", v);
}

#[test]
fn test_textbook_hit_decisions() {
    let strategy = baseline().strategy().clone();
    // hard 16 hits against a ten, stands against a six
    assert!(strategy.should_hit("16,0", "10,0").unwrap());
    assert!(!strategy.should_hit("16,0", "6,0").unwrap());
    // hard 12 hits a two, stands a five
    assert!(strategy.should_hit("12,0", "2,0").unwrap());
    assert!(!strategy.should_hit("12,0", "5,0").unwrap());
    // soft 17 always hits; soft 19 stands
    assert!(strategy.should_hit("7,1", "6,0").unwrap());
    assert!(!strategy.should_hit("9,1", "6,0").unwrap());
    // hard 17 stands even against an ace
    assert!(!strategy.should_hit("17,0", "1,1").unwrap());
}

#[test]
fn test_textbook_double_decisions() {
    let strategy = baseline().strategy().clone();
    // 11 doubles against a six, 10 against a nine
    assert!(strategy.should_double("11,0", "6,0").unwrap());
    assert!(strategy.should_double("10,0", "9,0").unwrap());
    // 10 does not double into a ten or an ace
    assert!(!strategy.should_double("10,0", "10,0").unwrap());
    assert!(!strategy.should_double("10,0", "1,1").unwrap());
    // hard 20 never doubles
    assert!(!strategy.should_double("20,0", "6,0").unwrap());
}

#[test]
fn test_textbook_split_decisions() {
    let strategy = baseline().strategy().clone();
    // aces and eights
    assert!(strategy.should_split("2,1", "6,0").unwrap());
    assert!(strategy.should_split("2,1", "10,0").unwrap());
    assert!(strategy.should_split("16,0", "7,0").unwrap());
    // never split tens or fives
    assert!(!strategy.should_split("20,0", "6,0").unwrap());
    assert!(!strategy.should_split("10,0", "6,0").unwrap());
}

#[test]
fn test_strategy_lookup_errors() {
    let strategy = baseline().strategy().clone();
    assert_eq!(
        strategy.should_hit("16;0", "10,0"),
        Err(AnalysisError::MalformedKey("16;0".to_string()))
    );
    assert_eq!(
        strategy.should_hit("16,0", "12,0"),
        Err(AnalysisError::NotAnUpcard("12,0".to_string()))
    );
    assert_eq!(
        strategy.should_split("15,0", "6,0"),
        Err(AnalysisError::NotAPair("15,0".to_string()))
    );
}

#[test]
fn test_double_decision_round_trip() {
    let analysis = baseline();
    let values = analysis.values();
    let strategy = analysis.strategy();
    for state in HandState::all() {
        for u in 0..NUM_UPCARDS {
            let doubled = strategy.double_down.get(state, u);
            let strictly_better =
                values.double_down.get(state, u) > values.optimal.get(state, u);
            assert_eq!(
                doubled, strictly_better,
                "state {} upcard {} decision disagrees with values",
                state, u
            );
        }
    }
}

#[test]
fn test_value_tables_bounded() {
    let analysis = baseline();
    let values = analysis.values();
    let state_tables = [
        ("hold", &values.hold),
        ("hit", &values.hit),
        ("policy", &values.optimal),
        ("double", &values.double_down),
    ];
    for (name, table) in state_tables {
        for state in HandState::all() {
            for u in 0..NUM_UPCARDS {
                let v = table.get(state, u);
                assert!(
                    (-2.0..=2.5).contains(&v),
                    "{} value {} at {} upcard {}",
                    name,
                    v,
                    state,
                    u
                );
            }
        }
    }
    for pi in 0..NUM_PAIRS {
        for u in 0..NUM_UPCARDS {
            let s = values.split.get(pi, u);
            let n = values.no_split.get(pi, u);
            assert!((-2.0..=2.5).contains(&s), "split value {} at {},{}", s, pi, u);
            assert!((-2.0..=2.5).contains(&n), "no-split value {} at {},{}", n, pi, u);
        }
    }
}

#[test]
fn test_hold_values_on_bust_and_21() {
    let analysis = baseline();
    let bust = HandState::decode("22,0").unwrap();
    let twenty_one = HandState::decode("21,0").unwrap();
    for u in 0..NUM_UPCARDS {
        assert_eq!(analysis.values().hold.get(bust, u), -1.0);
        assert_eq!(analysis.squared_values().hold.get(bust, u), 1.0);
        // a made 21 only loses to nothing and pushes the dealer's non-natural 21
        assert!(analysis.values().hold.get(twenty_one, u) > 0.85);
    }
}

#[test]
fn test_split_aces_squared_identity() {
    // EX2 for split aces must follow E[(X+Y)^2] = 2E[X^2] + 4E[X] over the
    // one-card hands X each ace becomes, not 4E[X^2].
    let analysis = baseline();
    let aces = HandState::decode("2,1").unwrap();
    let half = HandState::decode("1,1").unwrap();
    let pi = aces.pair_index().unwrap();
    for u in 0..NUM_UPCARDS {
        let mut expected = 0.0;
        let mut wrong = 0.0;
        for (next, p) in analysis.transitions().successors(half) {
            let e = analysis.values().hold.get(next, u);
            let e2 = analysis.squared_values().hold.get(next, u);
            expected += p * (2.0 * e2 + 4.0 * e);
            wrong += p * 4.0 * e2;
        }
        let got = analysis.squared_values().split.get(pi, u);
        assert!(
            (got - expected).abs() < 1e-12,
            "upcard {}: {} vs {}",
            u,
            got,
            expected
        );
        if u == 9 {
            // against a ten the two formulas are far apart; make sure the
            // wrong one would actually have been caught
            assert!((got - wrong).abs() > 0.1);
        }
    }
}

#[test]
fn test_hole_distribution_accounts_for_everything() {
    let analysis = baseline();
    let hole = analysis.hole();
    let total: f64 = hole.natural
        + hole.pairs.iter().sum::<f64>()
        + hole.hands.iter().sum::<f64>();
    assert!((total - 1.0).abs() < 1e-12, "total hole mass {}", total);
    // two aces are a pair, not a natural
    assert!((hole.pairs[0] - (4.0 / 52.0) * (4.0 / 52.0)).abs() < 1e-12);
    // ace-ten both ways round
    assert!((hole.natural - 2.0 * (4.0 / 52.0) * (16.0 / 52.0)).abs() < 1e-12);
}

#[test]
fn test_recompute_is_deterministic() {
    let a = Analysis::compute(CardDistribution::single_deck());
    let b = Analysis::compute(CardDistribution::single_deck());
    assert_eq!(a.ev(), b.ev());
    assert_eq!(a.variance(), b.variance());
    assert_eq!(a.strategy(), b.strategy());
    assert_eq!(a.values(), b.values());
}

#[test]
fn test_fixed_strategy_reproduces_derived_one() {
    let derived = baseline();
    let replayed = Analysis::compute_with_strategy(
        CardDistribution::single_deck(),
        derived.strategy(),
    );
    assert_eq!(derived.ev(), replayed.ev());
    assert_eq!(derived.values(), replayed.values());
    assert_eq!(derived.strategy(), replayed.strategy());
}

#[test]
fn test_ev_by_upcard_shape() {
    let analysis = baseline();
    let evd = analysis.ev_by_upcard();
    // a dealer six is the best spot for the player, a dealer ace the worst
    assert!(evd[5] > evd[0]);
    assert!(evd[5] > 0.0);
    assert!(evd[0] < 0.0);
    // the scalar EV is the up-card-weighted mix
    let mixed: f64 = (0..NUM_UPCARDS)
        .map(|u| analysis.cards().prob((u + 1) as u8) * evd[u])
        .sum();
    assert!((mixed - analysis.ev()).abs() < 1e-15);
}

#[test]
fn test_results_json_bundle() {
    let analysis = baseline();
    let bundle = analysis.results_json();
    assert!(bundle["hit_transition_matrix"]["16,0"]["22,0"].is_number());
    assert!(bundle["strategy"]["hit_matrix"]["16,0"]["10,0"].as_bool().unwrap());
    assert!(bundle["ev"].is_number());
    assert_eq!(
        bundle["dealer"]["natural"]["1,1"].as_f64().unwrap(),
        16.0 / 52.0
    );
}
