mod common;

use std::rc::Rc;

use ai_behavior::selector::{pick, Candidate, Pick};
use ai_behavior::{
    BehaviorDef, BehaviorKey, BehaviorRegistry, BehaviorResult, BehaviorRuntime, CandidateDef,
};
use ai_core::SplitMix64;
use common::{ctx, init_tracing, register_recorder, RecordingWorld, ScriptedRng};

const IDLE: BehaviorKey = BehaviorKey("idle");
const WANDER: BehaviorKey = BehaviorKey("wander");
const LOOK: BehaviorKey = BehaviorKey("look");
const ALERT: BehaviorKey = BehaviorKey("alert");

fn registry(candidates: Vec<CandidateDef>) -> BehaviorRegistry<RecordingWorld> {
    let mut registry = BehaviorRegistry::new();
    registry.register_def(BehaviorDef::selector(IDLE, candidates));
    register_recorder(&mut registry, BehaviorDef::standalone(WANDER));
    register_recorder(&mut registry, BehaviorDef::standalone(LOOK));
    register_recorder(&mut registry, BehaviorDef::standalone(ALERT).with_priority(10));
    registry
}

fn scripted(
    candidates: Vec<CandidateDef>,
    floats: &[f32],
    ints: &[u32],
) -> BehaviorRuntime<RecordingWorld> {
    init_tracing();
    BehaviorRuntime::new(1, Rc::new(registry(candidates)))
        .with_rng(Box::new(ScriptedRng::new(floats, ints)))
}

fn candidate(behavior: BehaviorKey, weight: f32) -> Candidate {
    Candidate::new(CandidateDef::new(behavior, weight))
}

#[test]
fn repeats_the_same_candidate_then_applies_cooldown() {
    let mut world = RecordingWorld::new();
    let candidates = vec![
        CandidateDef::new(WANDER, 1.0)
            .with_cooldown(5.0)
            .with_max_rand_repeat(2),
    ];
    let mut rt = scripted(candidates, &[0.5], &[2]);
    let idle = rt.start(&mut world, IDLE).unwrap();

    rt.tick(&ctx(1, 0.1), &mut world);
    let selector = rt.selector(idle).unwrap();
    assert_eq!(selector.selected(), Some(0));
    assert_eq!(selector.repeat_limit(), 2);
    assert_eq!(selector.candidates()[0].per_stage_count, 1);

    let mut spawned = Vec::new();
    for round in 0..3 {
        let child = rt.active_child(idle).expect("candidate running");
        assert!(!spawned.contains(&child), "each run is a fresh node");
        spawned.push(child);
        assert_eq!(rt.selector(idle).unwrap().repeat_count(), round);
        rt.request_finish(&mut world, child, BehaviorResult::Success, None)
            .unwrap();
    }

    let selector = rt.selector(idle).unwrap();
    assert_eq!(rt.active_child(idle), None);
    assert_eq!(selector.candidates()[0].cooldown_remaining, 5.0);
    assert_eq!(selector.candidates()[0].per_stage_count, 1, "repeats do not count");
    assert_eq!(world.entries("start:wander").len(), 3);

    rt.tick(&ctx(2, 1.0), &mut world);
    rt.tick(&ctx(3, 1.0), &mut world);
    assert_eq!(rt.active_child(idle), None);
    assert_eq!(rt.selector(idle).unwrap().candidates()[0].cooldown_remaining, 3.0);
    assert_eq!(rt.diagnostics().count("selector.starved"), 1);

    rt.tick(&ctx(4, 3.0), &mut world);
    assert!(rt.active_child(idle).is_some(), "weighted draw resumes");
    assert_eq!(rt.selector(idle).unwrap().candidates()[0].per_stage_count, 2);
}

#[test]
fn displaced_candidate_does_not_repeat() {
    let mut world = RecordingWorld::new();
    let candidates = vec![
        CandidateDef::new(WANDER, 1.0)
            .with_cooldown(2.0)
            .with_max_rand_repeat(3),
    ];
    let mut rt = scripted(candidates, &[0.0], &[3]);
    let idle = rt.start(&mut world, IDLE).unwrap();
    rt.tick(&ctx(1, 0.1), &mut world);
    let wander = rt.active_child(idle).unwrap();

    let alert = rt.run_behavior(&mut world, Some(idle), ALERT).unwrap();

    assert!(!rt.is_live(wander));
    assert_eq!(rt.active_child(idle), Some(alert));
    let selector = rt.selector(idle).unwrap();
    assert_eq!(selector.repeat_count(), 0);
    assert_eq!(selector.candidates()[0].cooldown_remaining, 2.0);
    assert_eq!(world.entries("start:wander").len(), 1);
}

#[test]
fn selector_does_not_pick_while_a_child_runs() {
    let mut world = RecordingWorld::new();
    let candidates = vec![
        CandidateDef::new(WANDER, 1.0).with_cooldown(1.0),
        CandidateDef::new(LOOK, 1.0),
    ];
    let mut rt = scripted(candidates, &[0.0], &[]);
    let idle = rt.start(&mut world, IDLE).unwrap();

    rt.tick(&ctx(1, 0.1), &mut world);
    rt.tick(&ctx(2, 0.1), &mut world);
    rt.tick(&ctx(3, 0.1), &mut world);

    assert_eq!(world.entries("start:"), vec!["start:wander"]);
    assert_eq!(rt.debug_hierarchy(), vec!["idle", "wander"]);
}

#[test]
fn per_stage_cap_holds_until_a_new_stage() {
    let mut world = RecordingWorld::new();
    let candidates = vec![CandidateDef::new(LOOK, 1.0).with_max_per_stage(1)];
    let mut rt = scripted(candidates, &[], &[]);
    let idle = rt.start(&mut world, IDLE).unwrap();

    rt.tick(&ctx(1, 0.1), &mut world);
    let look = rt.active_child(idle).unwrap();
    rt.request_finish(&mut world, look, BehaviorResult::Success, None)
        .unwrap();

    rt.tick(&ctx(2, 0.1), &mut world);
    rt.tick(&ctx(3, 0.1), &mut world);
    assert_eq!(rt.active_child(idle), None);
    assert_eq!(rt.diagnostics().count("selector.starved"), 1);

    rt.new_stage(idle).unwrap();
    rt.tick(&ctx(4, 0.1), &mut world);
    assert!(rt.active_child(idle).is_some());
    assert_eq!(world.entries("start:look").len(), 2);
}

#[test]
fn new_stage_all_resets_every_selector() {
    let mut world = RecordingWorld::new();
    let candidates = vec![CandidateDef::new(LOOK, 1.0).with_max_per_stage(1)];
    let mut rt = scripted(candidates, &[], &[]);
    let idle = rt.start(&mut world, IDLE).unwrap();
    rt.tick(&ctx(1, 0.1), &mut world);
    assert_eq!(rt.selector(idle).unwrap().candidates()[0].per_stage_count, 1);

    rt.new_stage_all();

    assert_eq!(rt.selector(idle).unwrap().candidates()[0].per_stage_count, 0);
}

#[test]
fn empty_selector_warns_once() {
    let mut world = RecordingWorld::new();
    let mut rt = scripted(Vec::new(), &[], &[]);
    rt.start(&mut world, IDLE).unwrap();
    assert_eq!(rt.diagnostics().count("selector.empty"), 1, "registry validation");

    for tick in 1..=5 {
        rt.tick(&ctx(tick, 0.1), &mut world);
    }

    assert_eq!(rt.diagnostics().count("selector.empty"), 2);
}

#[test]
fn threshold_scan_prefers_the_earlier_candidate_on_ties() {
    let candidates = vec![candidate(WANDER, 1.0), candidate(LOOK, 1.0)];

    let mut rng = ScriptedRng::new(&[1.0, 1.5, 0.0], &[]);
    assert_eq!(pick(&candidates, &mut rng), Pick::Selected(0));
    assert_eq!(pick(&candidates, &mut rng), Pick::Selected(1));
    assert_eq!(pick(&candidates, &mut rng), Pick::Selected(0));
}

#[test]
fn zero_weight_candidates_are_never_selected() {
    let candidates = vec![candidate(WANDER, 0.0), candidate(LOOK, 2.0)];

    let mut rng = ScriptedRng::new(&[0.0], &[]);
    assert_eq!(pick(&candidates, &mut rng), Pick::Selected(1));

    let starved = vec![candidate(WANDER, 0.0), candidate(LOOK, -1.0)];
    assert_eq!(pick(&starved, &mut rng), Pick::Starved);
    assert_eq!(pick(&[], &mut rng), Pick::Empty);
}

#[test]
fn selection_frequency_converges_to_weight_share() {
    let mut cooling = candidate(ALERT, 10.0);
    cooling.cooldown_remaining = 1.0;
    let mut exhausted = Candidate::new(CandidateDef::new(IDLE, 10.0).with_max_per_stage(2));
    exhausted.per_stage_count = 2;
    let candidates = vec![
        candidate(WANDER, 1.0),
        cooling,
        candidate(LOOK, 3.0),
        exhausted,
    ];

    let mut rng = SplitMix64::new(42);
    let mut counts = [0u32; 4];
    let trials = 20_000;
    for _ in 0..trials {
        match pick(&candidates, &mut rng) {
            Pick::Selected(i) => counts[i] += 1,
            other => panic!("unexpected {other:?}"),
        }
    }

    assert_eq!(counts[1], 0);
    assert_eq!(counts[3], 0);
    let wander = counts[0] as f64 / trials as f64;
    let look = counts[2] as f64 / trials as f64;
    assert!((wander - 0.25).abs() < 0.02, "wander share {wander}");
    assert!((look - 0.75).abs() < 0.02, "look share {look}");
}

#[test]
fn seeded_runtimes_select_identically() {
    let candidates = vec![
        CandidateDef::new(WANDER, 1.0),
        CandidateDef::new(LOOK, 1.0),
    ];
    let mut picks = Vec::new();
    for _ in 0..2 {
        let mut world = RecordingWorld::new();
        let mut rt = BehaviorRuntime::new(9, Rc::new(registry(candidates.clone()))).with_seed(1234);
        let idle = rt.start(&mut world, IDLE).unwrap();
        for tick in 1..=20 {
            rt.tick(&ctx(tick, 0.1), &mut world);
            if let Some(child) = rt.active_child(idle) {
                rt.request_finish(&mut world, child, BehaviorResult::Success, None)
                    .unwrap();
            }
        }
        picks.push(world.entries("start:").join(","));
    }
    assert_eq!(picks[0], picks[1]);
}
