use thiserror::Error;

use crate::{BehaviorKey, LifecycleState, NodeId};

#[derive(Debug, Error)]
pub enum BehaviorError {
    #[error("behavior `{0}` is not registered")]
    Unregistered(BehaviorKey),

    #[error("behavior `{child}` cannot run under `{ancestor}`: both claim exclusive group `{group}`")]
    NestedExclusive {
        child: BehaviorKey,
        ancestor: BehaviorKey,
        group: &'static str,
    },

    #[error("node {0:?} has been released")]
    NodeReleased(NodeId),

    #[error("node {0:?} is finishing and cannot accept children")]
    ParentFinishing(NodeId),

    #[error("node {0:?} is already finishing or finished")]
    AlreadyFinishing(NodeId),

    #[error("node {node:?} is {actual:?}, expected {expected:?}")]
    InvalidState {
        node: NodeId,
        actual: LifecycleState,
        expected: LifecycleState,
    },

    #[error("node {0:?} is interrupted")]
    Interrupted(NodeId),

    #[error("configuration error: {0}")]
    Config(String),

    #[cfg(feature = "serde")]
    #[error("failed to parse behavior config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, BehaviorError>;
