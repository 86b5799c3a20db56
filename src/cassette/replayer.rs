//! Serves recorded interactions back in order.

use std::collections::{HashMap, VecDeque};

use super::format::{Cassette, Interaction};

/// Replays a cassette, one queue per port/method pair.
#[derive(Debug)]
pub struct CassetteReplayer {
    queues: HashMap<(String, String), VecDeque<Interaction>>,
}

impl CassetteReplayer {
    /// Indexes a loaded cassette.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        let mut queues: HashMap<(String, String), VecDeque<Interaction>> = HashMap::new();
        for interaction in &cassette.interactions {
            queues
                .entry((interaction.port.clone(), interaction.method.clone()))
                .or_default()
                .push_back(interaction.clone());
        }
        Self { queues }
    }

    /// Pops the next interaction recorded for `port`/`method`, or `None`
    /// once that pair is exhausted.
    pub fn next_interaction(&mut self, port: &str, method: &str) -> Option<Interaction> {
        self.queues.get_mut(&(port.to_string(), method.to_string())).and_then(VecDeque::pop_front)
    }

    /// Returns `true` once every interaction has been served.
    #[must_use]
    pub fn is_drained(&self) -> bool {
        self.queues.values().all(VecDeque::is_empty)
    }
}
