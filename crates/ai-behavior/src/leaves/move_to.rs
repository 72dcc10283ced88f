use crate::{
    Behavior, BehaviorCx, BehaviorDef, BehaviorKey, BehaviorResult, MoveOutcome, MoveRequest,
    MoveStartError, MovementProvider, Vec3,
};

pub const MOVE_TO: BehaviorKey = BehaviorKey("move_to");

/// Exclusive group shared by movement behaviors; they cannot nest.
pub const MOVEMENT_GROUP: &str = "movement";

pub(super) fn def() -> BehaviorDef {
    BehaviorDef::standalone(MOVE_TO).with_exclusive(MOVEMENT_GROUP)
}

/// Drives the host's movement controller toward a target.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MoveTo {
    target: Vec3,
    acceptance_radius: f32,
    moving: bool,
}

impl MoveTo {
    pub fn new(target: Vec3, acceptance_radius: f32) -> Self {
        Self {
            target,
            acceptance_radius,
            moving: false,
        }
    }
}

impl<W> Behavior<W> for MoveTo
where
    W: MovementProvider + 'static,
{
    fn on_start(&mut self, cx: &mut BehaviorCx<'_, W>) {
        let agent = cx.agent();
        let request = MoveRequest {
            requester: cx.node(),
            target: self.target,
            acceptance_radius: self.acceptance_radius,
        };

        match cx.world().start_move(agent, request) {
            Ok(()) => self.moving = true,
            Err(MoveStartError::NoController) => {
                tracing::error!(node = ?cx.node(), "move_to needs a movement controller");
                let _ = cx.fail("no_controller");
            }
            Err(MoveStartError::Rejected(MoveOutcome::Success)) => {
                let _ = cx.succeed();
            }
            Err(MoveStartError::Rejected(outcome)) => {
                tracing::warn!(node = ?cx.node(), ?outcome, "move request failed immediately");
                let _ = cx.fail("cant_move");
            }
        }
    }

    fn on_move_complete(&mut self, cx: &mut BehaviorCx<'_, W>, outcome: MoveOutcome) {
        self.moving = false;
        let (result, reason) = outcome.finish();
        let _ = cx.finish(result, reason);
    }

    fn on_finish(&mut self, cx: &mut BehaviorCx<'_, W>, _result: BehaviorResult, _reason: Option<&str>) {
        if self.moving {
            self.moving = false;
            let agent = cx.agent();
            let node = cx.node();
            cx.world().stop_move(agent, node);
        }
    }
}
