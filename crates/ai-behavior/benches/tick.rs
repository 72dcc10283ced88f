use std::rc::Rc;

use ai_behavior::{
    tick_runtimes, Behavior, BehaviorCx, BehaviorDef, BehaviorKey, BehaviorRegistry,
    BehaviorRuntime, CandidateDef,
};
use ai_core::{TickContext, WorldMut, WorldView};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

#[derive(Default)]
struct World;

impl WorldView for World {
    type Agent = u64;
}

impl WorldMut for World {}

const IDLE: BehaviorKey = BehaviorKey("idle");
const CANDIDATES: [BehaviorKey; 4] = [
    BehaviorKey("wander"),
    BehaviorKey("look_around"),
    BehaviorKey("stretch"),
    BehaviorKey("sit"),
];

struct FinishOnTick;

impl Behavior<World> for FinishOnTick {
    fn on_tick(&mut self, cx: &mut BehaviorCx<'_, World>, _dt: f32) {
        let _ = cx.succeed();
    }
}

fn registry() -> BehaviorRegistry<World> {
    let mut registry = BehaviorRegistry::new();
    let candidates = CANDIDATES
        .iter()
        .enumerate()
        .map(|(i, key)| {
            CandidateDef::new(*key, 1.0 + i as f32)
                .with_cooldown(0.3)
                .with_max_rand_repeat(2)
        })
        .collect();
    registry.register_def(BehaviorDef::selector(IDLE, candidates));
    for key in CANDIDATES {
        registry.register(BehaviorDef::standalone(key), || Box::new(FinishOnTick));
    }
    registry
}

fn bench_selector_tick(c: &mut Criterion) {
    let registry = Rc::new(registry());
    let mut world = World;
    let mut runtimes: Vec<_> = (0..64u64)
        .map(|agent| BehaviorRuntime::new(agent, Rc::clone(&registry)).with_seed(7))
        .collect();
    for rt in &mut runtimes {
        let _ = rt.start(&mut world, IDLE);
    }

    let mut tick: u64 = 0;
    c.bench_function("ai-behavior/tick(selector agents=64)", |b| {
        b.iter(|| {
            let ctx = TickContext::new(tick, 0.1, 0);
            tick_runtimes(&ctx, &mut world, &mut runtimes);
            for rt in &mut runtimes {
                black_box(rt.take_finished());
            }
            tick = tick.wrapping_add(1);
        })
    });
}

criterion_group!(benches, bench_selector_tick);
criterion_main!(benches);
