//! Bounds and monotonicity of a carving session over every short press sequence.

use dalgona::game::{
    CarveRules, DalgonaSession, HeavyMode, Intensity, SessionState, Shape, Transition,
    CATALOG, MAX_INTEGRITY, MAX_PROGRESS,
};
use tokio::time::Instant;

const MAX_LEN: u32 = 8;

fn rule_sets() -> Vec<CarveRules> {
    vec![
        CarveRules::classic(),
        CarveRules::timed(),
        CarveRules {
            medium_integrity_loss: 60,
            heavy: HeavyMode::Fixed,
            timed: false,
        },
        CarveRules {
            medium_integrity_loss: 60,
            heavy: HeavyMode::Halve,
            timed: true,
        },
    ]
}

/// Every sequence of exactly `len` presses, in base-3 order.
fn sequences(len: u32) -> impl Iterator<Item = Vec<Intensity>> {
    (0..3usize.pow(len)).map(move |mut n| {
        (0..len)
            .map(|_| {
                let press = Intensity::ALL[n % 3];
                n /= 3;
                press
            })
            .collect()
    })
}

fn play(rules: CarveRules, shape: Shape, presses: &[Intensity], now: Instant) {
    let mut session = DalgonaSession::new("alice", rules);
    assert!(matches!(
        session.select_shape("alice", shape, now),
        Transition::Started { .. }
    ));
    let (mut progress, mut integrity) = (0u8, MAX_INTEGRITY);

    for (step, &press) in presses.iter().enumerate() {
        let before = session.state().clone();
        let transition = session.carve("alice", press, now);
        let ctx = format!("{:?} {:?} step {} of {:?}", rules, shape, step, presses);

        if before.is_terminal() {
            assert_eq!(transition, Transition::Ignored, "{}", ctx);
            assert_eq!(session.state(), &before, "{}", ctx);
            continue;
        }

        match (transition, session.state()) {
            (
                Transition::Carved {
                    progress: p,
                    integrity: i,
                },
                SessionState::Carving {
                    progress: sp,
                    integrity: si,
                    ..
                },
            ) => {
                assert_eq!((p, i), (*sp, *si), "{}", ctx);
                assert!(p >= progress && p < MAX_PROGRESS, "progress {} -> {}: {}", progress, p, ctx);
                assert!(i <= integrity && i > 0, "integrity {} -> {}: {}", integrity, i, ctx);
                progress = p;
                integrity = i;
            }
            (Transition::Completed { shape: s }, SessionState::Completed { shape: ss }) => {
                assert_eq!((s, *ss), (shape, shape), "{}", ctx);
            }
            (Transition::Broken { shape: s }, SessionState::Broken { shape: ss, progress: bp }) => {
                assert_eq!((s, *ss), (shape, shape), "{}", ctx);
                assert!(*bp >= progress && *bp < MAX_PROGRESS, "{}", ctx);
            }
            (other, state) => panic!("unexpected {:?} / {:?}: {}", other, state, ctx),
        }
    }
}

#[test]
fn progress_never_drops_and_integrity_never_rises() {
    let now = Instant::now();
    for rules in rule_sets() {
        for shape in CATALOG {
            for len in 1..=MAX_LEN {
                for presses in sequences(len) {
                    play(rules, shape, &presses, now);
                }
            }
        }
    }
}

#[test]
fn default_presets_never_break_a_cookie() {
    let now = Instant::now();
    for rules in [CarveRules::classic(), CarveRules::timed()] {
        for presses in sequences(MAX_LEN) {
            let mut session = DalgonaSession::new("alice", rules);
            session.select_shape("alice", CATALOG[0], now);
            for press in presses {
                session.carve("alice", press, now);
            }
            assert!(
                !matches!(session.state(), SessionState::Broken { .. }),
                "{:?} broke under {:?}",
                rules,
                session.state()
            );
        }
    }
}

#[test]
fn harsh_medium_breaks_before_completion() {
    let now = Instant::now();
    let rules = CarveRules {
        medium_integrity_loss: 60,
        heavy: HeavyMode::Fixed,
        timed: false,
    };
    let mut session = DalgonaSession::new("alice", rules);
    session.select_shape("alice", CATALOG[0], now);
    assert!(matches!(
        session.carve("alice", Intensity::Medium, now),
        Transition::Carved {
            progress: 2,
            integrity: 40
        }
    ));
    assert!(matches!(
        session.carve("alice", Intensity::Medium, now),
        Transition::Broken { .. }
    ));
    assert_eq!(
        session.state(),
        &SessionState::Broken {
            shape: CATALOG[0],
            progress: 4
        }
    );
}
