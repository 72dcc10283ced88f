use ai_core::{AgentId, TickContext, WorldMut};

use crate::BehaviorRuntime;

/// Tick every agent's runtime once, in stable agent order.
pub fn tick_runtimes<W>(ctx: &TickContext, world: &mut W, runtimes: &mut [BehaviorRuntime<W>])
where
    W: WorldMut + 'static,
{
    runtimes.sort_by_key(|rt| rt.agent().stable_id());
    for runtime in runtimes.iter_mut() {
        runtime.tick(ctx, world);
    }
}
