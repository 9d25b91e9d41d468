use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::NodeId;

/// Coarse lifecycle state of a mounted chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartPhase {
    /// Layout ticks and pointer interaction are applied.
    Live,
    /// Fading out; no further layout ticks.
    Removing,
    /// Nothing of the chart remains on the surface.
    Detached,
}

/// Completion signal of a chart removal.
///
/// Clones share state, so a refresh coordinator can hold one while the chart
/// handle finishes the fade.
#[derive(Debug, Clone, Default)]
pub struct RemovalToken {
    done: Rc<Cell<bool>>,
}

impl RemovalToken {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.done.get()
    }

    pub(crate) fn complete(&self) {
        self.done.set(true);
    }
}

/// Called once per bubble when its fade-out has finished and it is detached.
pub type NodeRemovedCallback = Box<dyn FnMut(NodeId)>;

pub(crate) struct Removal {
    elapsed: Duration,
    duration: Duration,
    token: RemovalToken,
    callbacks: Vec<NodeRemovedCallback>,
}

impl Removal {
    pub(crate) fn new(duration: Duration) -> Self {
        Self {
            elapsed: Duration::ZERO,
            duration,
            token: RemovalToken::default(),
            callbacks: Vec::new(),
        }
    }

    pub(crate) fn token(&self) -> RemovalToken {
        self.token.clone()
    }

    pub(crate) fn add_callback(&mut self, callback: Option<NodeRemovedCallback>) {
        self.callbacks.extend(callback);
    }

    /// Returns `true` once the fade has run its full duration.
    pub(crate) fn advance(&mut self, dt: Duration) -> bool {
        self.elapsed = self.elapsed.saturating_add(dt);
        self.is_finished()
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub(crate) fn opacity(&self) -> f64 {
        if self.duration.is_zero() {
            return 0.0;
        }
        (1.0 - self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// Fires the per-node callbacks in node order and completes the token.
    pub(crate) fn finish(mut self, nodes: impl Iterator<Item = NodeId> + Clone) -> RemovalToken {
        for callback in &mut self.callbacks {
            for node in nodes.clone() {
                callback(node);
            }
        }
        self.token.complete();
        self.token
    }
}

impl fmt::Debug for Removal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Removal")
            .field("elapsed", &self.elapsed)
            .field("duration", &self.duration)
            .field("complete", &self.token.is_complete())
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}
