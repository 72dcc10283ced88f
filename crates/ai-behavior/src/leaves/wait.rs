use ai_core::{TimerToken, WorldMut};

use crate::{Behavior, BehaviorCx, BehaviorDef, BehaviorKey, BehaviorResult};

pub const WAIT: BehaviorKey = BehaviorKey("wait");

pub(super) fn def() -> BehaviorDef {
    BehaviorDef::standalone(WAIT)
}

/// Finishes with `Success` after a fixed delay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wait {
    seconds: f32,
    token: Option<TimerToken>,
}

impl Wait {
    pub fn new(seconds: f32) -> Self {
        Self {
            seconds,
            token: None,
        }
    }
}

impl<W> Behavior<W> for Wait
where
    W: WorldMut + 'static,
{
    fn on_start(&mut self, cx: &mut BehaviorCx<'_, W>) {
        self.token = Some(cx.delay(self.seconds, 0));
    }

    fn on_timer(&mut self, cx: &mut BehaviorCx<'_, W>, _tag: u64) {
        self.token = None;
        let _ = cx.succeed();
    }

    fn on_finish(&mut self, cx: &mut BehaviorCx<'_, W>, _result: BehaviorResult, _reason: Option<&str>) {
        if let Some(token) = self.token.take() {
            cx.cancel_delay(token);
        }
    }
}
