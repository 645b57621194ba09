//! Change notifications for chart observers.
//!
//! An undo button only needs to know whether history is non-empty, but a
//! renderer wants to know which row changed. Both subscribe to the same
//! ordered listener list. A listener that panics is logged and skipped; it
//! never aborts the mutation that fired it or starves later listeners.

use std::panic::{self, AssertUnwindSafe};

use crate::cell::TokenId;
use crate::cell_id::CellRef;

/// Events emitted by a `Chart` after a mutation completes.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartEvent {
    /// A token was requested for a cell and recorded in history.
    TokenPlaced { token: TokenId, cell: CellRef },

    /// A landing token attached to its cell.
    TokenSettled { token: TokenId, cell: CellRef },

    /// The most recent placement was undone.
    TokenUndone { token: TokenId, cell: CellRef },

    /// A column was appended at `index`; every row gained an empty cell.
    ColumnAdded { index: usize },

    /// A row was appended at `index`.
    RowAdded { index: usize },

    /// The title or a row/column label was set.
    LabelChanged { target: LabelTarget },

    /// A row or column was removed; `purged` history entries went with it.
    StructureRemoved { purged: usize },

    /// All tokens and history were cleared (structure kept).
    StarsCleared,

    /// Chart contents were replaced by a load or a full reset.
    Reset,

    /// History length changed. Fired after every event above that touches
    /// history, so an undo control can refresh from this one alone.
    HistoryChanged { pending: usize },
}

/// Which piece of text a `LabelChanged` event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelTarget {
    Title,
    Row(usize),
    Column(usize),
}

/// Callback type for receiving chart events.
pub type EventCallback = Box<dyn FnMut(&ChartEvent)>;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Ordered list of chart listeners.
#[derive(Default)]
pub struct Listeners {
    callbacks: Vec<(SubscriptionId, EventCallback)>,
    next_id: u64,
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.callbacks.len())
            .finish()
    }
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, callback: EventCallback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, callback));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(sid, _)| *sid != id);
        self.callbacks.len() != before
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Deliver an event to every listener in subscription order.
    pub fn emit(&mut self, event: &ChartEvent) {
        for (id, callback) in self.callbacks.iter_mut() {
            let result = panic::catch_unwind(AssertUnwindSafe(|| callback(event)));
            if result.is_err() {
                log::warn!("chart listener {:?} panicked on {:?}", id, event);
            }
        }
    }
}

/// Simple event collector for testing.
#[derive(Default)]
pub struct EventCollector {
    events: Vec<ChartEvent>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: ChartEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[ChartEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The `pending` value of the latest HistoryChanged event.
    pub fn last_pending(&self) -> Option<usize> {
        self.events.iter().rev().find_map(|e| match e {
            ChartEvent::HistoryChanged { pending } => Some(*pending),
            _ => None,
        })
    }

    /// Tokens reported undone, in order.
    pub fn undone(&self) -> Vec<TokenId> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ChartEvent::TokenUndone { token, .. } => Some(*token),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_listeners_run_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut listeners = Listeners::new();
        for tag in ["first", "second"] {
            let seen = Rc::clone(&seen);
            listeners.subscribe(Box::new(move |_| seen.borrow_mut().push(tag)));
        }

        listeners.emit(&ChartEvent::StarsCleared);
        assert_eq!(*seen.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn test_panicking_listener_is_isolated() {
        let count = Rc::new(RefCell::new(0));
        let mut listeners = Listeners::new();
        listeners.subscribe(Box::new(|_| panic!("listener failure")));
        let c = Rc::clone(&count);
        listeners.subscribe(Box::new(move |_| *c.borrow_mut() += 1));

        listeners.emit(&ChartEvent::Reset);
        listeners.emit(&ChartEvent::Reset);
        assert_eq!(*count.borrow(), 2);
    }

    #[test]
    fn test_unsubscribe() {
        let mut listeners = Listeners::new();
        let id = listeners.subscribe(Box::new(|_| {}));
        assert_eq!(listeners.len(), 1);
        assert!(listeners.unsubscribe(id));
        assert!(!listeners.unsubscribe(id));
        assert!(listeners.is_empty());
    }

    #[test]
    fn test_collector_filters() {
        let mut collector = EventCollector::new();
        collector.push(ChartEvent::TokenUndone { token: TokenId(4), cell: CellRef::new(0, 0) });
        collector.push(ChartEvent::HistoryChanged { pending: 2 });
        collector.push(ChartEvent::HistoryChanged { pending: 1 });

        assert_eq!(collector.len(), 3);
        assert_eq!(collector.undone(), vec![TokenId(4)]);
        assert_eq!(collector.last_pending(), Some(1));
    }
}
