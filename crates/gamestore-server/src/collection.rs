use std::sync::Arc;

use gamestore_core::game::{GameDoc, GameFields, GameId};
use gamestore_core::snapshot::Snapshot;
use tokio::sync::broadcast;

/// Default maximum number of games held by the collection.
const DEFAULT_MAX_GAMES: usize = 1000;

/// Default broadcast channel capacity for snapshot fan-out.
const DEFAULT_BROADCAST_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    Full(usize),
}

impl std::fmt::Display for CollectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full(max) => write!(f, "catalog is full ({max} games)"),
        }
    }
}

impl std::error::Error for CollectionError {}

/// In-memory, ordered game collection. Every mutation publishes a full
/// snapshot to all subscribers.
pub struct GameCollection {
    games: Vec<GameDoc>,
    version: u64,
    broadcast_tx: broadcast::Sender<Arc<Snapshot>>,
    max_games: usize,
}

impl Default for GameCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl GameCollection {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_GAMES, DEFAULT_BROADCAST_CAPACITY)
    }

    /// Create a collection with configurable capacity limits.
    pub fn with_capacity(max_games: usize, broadcast_capacity: usize) -> Self {
        let (broadcast_tx, _) = broadcast::channel(broadcast_capacity);
        Self {
            games: Vec::new(),
            version: 0,
            broadcast_tx,
            max_games,
        }
    }

    /// Append a new game and return its assigned id.
    pub fn insert(&mut self, fields: GameFields) -> Result<GameId, CollectionError> {
        if self.games.len() >= self.max_games {
            return Err(CollectionError::Full(self.max_games));
        }
        let id = uuid::Uuid::new_v4().simple().to_string();
        self.games.push(GameDoc {
            id: id.clone(),
            fields,
        });
        self.publish();
        Ok(id)
    }

    pub fn get(&self, id: &str) -> Option<&GameDoc> {
        self.games.iter().find(|g| g.id == id)
    }

    /// Replace the four mutable fields of an existing game. Returns false if
    /// no game has that id.
    pub fn update(&mut self, id: &str, fields: GameFields) -> bool {
        let Some(doc) = self.games.iter_mut().find(|g| g.id == id) else {
            return false;
        };
        doc.fields = fields;
        self.publish();
        true
    }

    /// Remove a game. Returns false if no game has that id.
    pub fn delete(&mut self, id: &str) -> bool {
        let Some(pos) = self.games.iter().position(|g| g.id == id) else {
            return false;
        };
        self.games.remove(pos);
        self.publish();
        true
    }

    /// The current state, in insertion order.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: self.version,
            games: self.games.clone(),
        }
    }

    /// Subscribe to snapshots published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Snapshot>> {
        self.broadcast_tx.subscribe()
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    fn publish(&mut self) {
        self.version += 1;
        // No receivers is fine: nobody is watching.
        let _ = self.broadcast_tx.send(Arc::new(self.snapshot()));
    }
}
