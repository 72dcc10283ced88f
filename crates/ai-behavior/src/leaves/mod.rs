//! Leaf behaviors built on the host capability traits.

mod anim;
mod move_to;
mod wait;

pub use anim::{PlayAnimation, PLAY_ANIMATION};
pub use move_to::{MoveTo, MOVEMENT_GROUP, MOVE_TO};
pub use wait::{Wait, WAIT};

use ai_core::WorldMut;

use crate::{AnimationProvider, BehaviorRegistry, MovementProvider};

/// Register [`Wait`], available to every world.
pub fn register_wait<W>(registry: &mut BehaviorRegistry<W>)
where
    W: WorldMut + 'static,
{
    registry.register(wait::def(), || Box::new(Wait::new(0.0)));
}

pub fn register_move_to<W>(registry: &mut BehaviorRegistry<W>)
where
    W: MovementProvider + 'static,
{
    registry.register(move_to::def(), || Box::new(MoveTo::default()));
}

pub fn register_play_animation<W>(registry: &mut BehaviorRegistry<W>)
where
    W: AnimationProvider + 'static,
{
    registry.register(anim::def(), || Box::new(PlayAnimation::default()));
}

/// Register every leaf behavior.
pub fn register_all<W>(registry: &mut BehaviorRegistry<W>)
where
    W: MovementProvider + AnimationProvider + 'static,
{
    register_wait(registry);
    register_move_to(registry);
    register_play_animation(registry);
}
