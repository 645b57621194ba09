//! Presentation hook for token placement.
//!
//! Placing a token is a two-phase commit: the token and its history entry
//! exist as soon as the click is handled, but the token only joins its
//! cell once the presenter reports that the flight animation settled.
//! The presenter gets the token id so it can call `Chart::settle_token`
//! later, from whatever timer or frame callback drives the animation.

use crate::cell::TokenId;
use crate::cell_id::CellRef;

pub trait FlightPresenter {
    /// Opaque visual for one token (a sprite, a DOM node, a terminal glyph).
    type Handle;

    fn render_token(&mut self, color: &str) -> Self::Handle;

    /// Start moving `handle` toward `target`. Must not block.
    fn animate_to_cell(&mut self, handle: Self::Handle, token: TokenId, target: CellRef);
}

/// Presenter with no visuals. Tokens stay in flight until the caller settles them.
#[derive(Debug, Default)]
pub struct QueuedFlights {
    in_flight: Vec<(TokenId, CellRef)>,
}

impl QueuedFlights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flights launched but not yet taken, oldest first.
    pub fn pending(&self) -> &[(TokenId, CellRef)] {
        &self.in_flight
    }

    /// Take every queued flight, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<(TokenId, CellRef)> {
        std::mem::take(&mut self.in_flight)
    }
}

impl FlightPresenter for QueuedFlights {
    type Handle = String;

    fn render_token(&mut self, color: &str) -> String {
        color.to_string()
    }

    fn animate_to_cell(&mut self, _handle: String, token: TokenId, target: CellRef) {
        self.in_flight.push((token, target));
    }
}
