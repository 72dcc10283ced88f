use crate::{
    AnimationError, AnimationId, AnimationProvider, Behavior, BehaviorCx, BehaviorDef, BehaviorKey,
    BehaviorResult,
};

pub const PLAY_ANIMATION: BehaviorKey = BehaviorKey("play_animation");

pub(super) fn def() -> BehaviorDef {
    BehaviorDef::standalone(PLAY_ANIMATION)
}

/// Plays an animation; non-looping playback succeeds once its duration elapses.
///
/// Looping playback runs until something else finishes the node.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayAnimation {
    animation: Option<AnimationId>,
    looping: bool,
    reset_pose: bool,
    started: bool,
    played: bool,
}

impl PlayAnimation {
    pub fn new(animation: Option<AnimationId>, looping: bool, reset_pose: bool) -> Self {
        Self {
            animation,
            looping,
            reset_pose,
            started: false,
            played: false,
        }
    }
}

impl<W> Behavior<W> for PlayAnimation
where
    W: AnimationProvider + 'static,
{
    fn on_start(&mut self, cx: &mut BehaviorCx<'_, W>) {
        let Some(animation) = self.animation else {
            let _ = cx.fail("anim_not_selected");
            return;
        };

        let agent = cx.agent();
        match cx.world().play_animation(agent, animation, self.looping) {
            Ok(duration) => {
                self.started = true;
                if !self.looping {
                    cx.delay(duration, 0);
                }
            }
            Err(AnimationError::NoCharacter) => {
                let _ = cx.fail("no_character");
            }
            Err(AnimationError::UnknownAnimation) => {
                tracing::warn!(animation = animation.0, "host does not know animation");
                let _ = cx.fail("anim_not_selected");
            }
        }
    }

    fn on_timer(&mut self, cx: &mut BehaviorCx<'_, W>, _tag: u64) {
        self.played = true;
        let _ = cx.succeed();
    }

    fn on_finish(&mut self, cx: &mut BehaviorCx<'_, W>, _result: BehaviorResult, _reason: Option<&str>) {
        let Some(animation) = self.animation.filter(|_| self.started) else {
            return;
        };
        let agent = cx.agent();
        if self.reset_pose {
            cx.world().reset_animation(agent);
        }
        cx.world().animation_finished(agent, animation, self.played);
    }
}
