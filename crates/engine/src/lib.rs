pub mod cell;
pub mod cell_id;
pub mod chart;
pub mod events;
pub mod flight;
pub mod history;
pub mod palette;

#[cfg(test)]
pub mod harness;

pub use cell::{Cell, Token, TokenId};
pub use cell_id::CellRef;
pub use chart::{Chart, Column, Row, UndoOutcome};
pub use palette::ColorSelector;
