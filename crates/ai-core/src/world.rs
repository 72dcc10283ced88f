//! Host-facing traits: who an agent is and what a behavior may touch.

use core::fmt::Debug;

/// Identity of the agent that owns a behavior runtime.
///
/// `Ord` fixes the order in which the driver visits agents; `stable_id` feeds RNG
/// seeding and diagnostics and must not change for the agent's lifetime.
pub trait AgentId: Copy + Ord + Eq + Debug + 'static {
    fn stable_id(self) -> u64;
}

macro_rules! impl_integer_agent_id {
    ($($ty:ty),* $(,)?) => {
        $(
            impl AgentId for $ty {
                fn stable_id(self) -> u64 {
                    self as u64
                }
            }
        )*
    };
}

impl_integer_agent_id!(u16, u32, u64, usize);

/// Read-only host access.
///
/// No queries are prescribed here; movement and animation are extension traits
/// defined next to the leaf behaviors that need them.
pub trait WorldView {
    type Agent: AgentId;
}

/// Mutable host access handed to behavior hooks.
pub trait WorldMut: WorldView {}
