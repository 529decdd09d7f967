//! Incremental re-scanning driven by document mutations
//!
//! The tracker owns the current `ScanContext` and the observer state. It is
//! fed discrete host events one at a time, either directly or through the
//! channel consumed by [`PriceTracker::run`], so no two scans ever overlap.

use log::{debug, info, warn};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use crate::config::EngineConfig;
use crate::context::{Preferences, ScanContext};
use crate::document::{parent, Document, MutationRecord, NodeId};
use crate::errors::{Error, Result};
use crate::pricing::{ScanStats, TreeScanner};

/// Events a host may queue before `send` waits for the tracker to catch up
pub const EVENT_QUEUE_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverState {
    Disconnected,
    Observing,
}

/// Something the hosting environment reports to the engine
#[derive(Debug, Clone)]
pub enum HostEvent {
    /// Full replacement of the user's preferences and the latest rate
    Preferences(Preferences),
    /// Host edits journaled since the previous batch
    Mutations(Vec<MutationRecord>),
}

#[derive(Debug)]
pub struct PriceTracker {
    config: EngineConfig,
    unit_suffix: String,
    preferences: Option<Preferences>,
    context: Option<ScanContext>,
    state: ObserverState,
}

impl PriceTracker {
    pub fn new(config: EngineConfig) -> Self {
        let unit_suffix = config.unit_suffix();
        PriceTracker {
            config,
            unit_suffix,
            preferences: None,
            context: None,
            state: ObserverState::Disconnected,
        }
    }

    /// Bounded event channel to feed [`PriceTracker::run`]
    pub fn channel() -> (mpsc::Sender<HostEvent>, mpsc::Receiver<HostEvent>) {
        mpsc::channel(EVENT_QUEUE_CAPACITY)
    }

    pub fn state(&self) -> ObserverState {
        self.state
    }

    /// Current context, absent until a valid rate has arrived
    pub fn context(&self) -> Option<&ScanContext> {
        self.context.as_ref()
    }

    pub fn preferences(&self) -> Option<&Preferences> {
        self.preferences.as_ref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn handle(&mut self, document: &mut Document, event: HostEvent) -> ScanStats {
        match event {
            HostEvent::Preferences(preferences) => self.apply_preferences(document, preferences),
            HostEvent::Mutations(records) => self.on_mutations(document, records),
        }
    }

    /// Replace the context wholesale, then act on the enabled flag.
    ///
    /// Turning on scans the whole document before observing; turning off (or
    /// receiving preferences without a usable rate) stops observing.
    pub fn apply_preferences(&mut self, document: &mut Document, preferences: Preferences) -> ScanStats {
        let preferences = preferences.clamped();
        self.context = match ScanContext::try_from(&preferences) {
            Ok(context) => Some(context),
            Err(e) => {
                warn!("Price conversion suppressed: {e}");
                None
            }
        };
        self.preferences = Some(preferences);

        let active = self.context.is_some_and(|context| context.enabled());
        match (self.state, active) {
            (ObserverState::Disconnected, true) => {
                let root = document.root();
                let stats = self.scan(document, &[root]);
                self.connect(document);
                stats
            }
            (ObserverState::Observing, false) => {
                self.disconnect(document);
                ScanStats::default()
            }
            _ => ScanStats::default(),
        }
    }

    /// Re-scan the parent element of every changed or inserted node
    pub fn on_mutations(&mut self, document: &mut Document, records: Vec<MutationRecord>) -> ScanStats {
        if self.state == ObserverState::Disconnected {
            return ScanStats::default();
        }

        let mut roots: Vec<NodeId> = Vec::new();
        for record in records {
            let changed = match record {
                MutationRecord::CharacterData { target } => vec![target],
                MutationRecord::ChildList { added, .. } => added,
            };
            for node in changed {
                if let Some(root) = parent(document, node) {
                    if !roots.contains(&root) {
                        roots.push(root);
                    }
                }
            }
        }

        self.scan(document, &roots)
    }

    /// Process host events strictly in order until every sender is dropped
    pub async fn run(
        mut self,
        document: Arc<Mutex<Document>>,
        mut events: mpsc::Receiver<HostEvent>,
    ) -> Result<Self> {
        while let Some(event) = events.recv().await {
            let mut guard = document
                .lock()
                .map_err(|e| Error::DocumentUnavailable(e.to_string()))?;
            let stats = self.handle(&mut guard, event);
            debug!("Host event handled: {stats:?}");
        }

        Ok(self)
    }

    fn scan(&self, document: &mut Document, roots: &[NodeId]) -> ScanStats {
        // Every root in this pass sees the same context snapshot
        let Some(context) = self.context else {
            return ScanStats::default();
        };
        let scanner = TreeScanner::new(&context, &self.config.excluded_tags, &self.unit_suffix);

        let mut stats = ScanStats::default();
        for &root in roots {
            stats += scanner.scan(document, root);
        }
        stats
    }

    fn connect(&mut self, document: &mut Document) {
        document.observe();
        self.state = ObserverState::Observing;
        info!("Observing document for new prices");
    }

    fn disconnect(&mut self, document: &mut Document) {
        document.disconnect();
        self.state = ObserverState::Disconnected;
        info!("Stopped observing document");
    }
}
