//! Core types for the character agent.
//!
//! - `alphabet`: symbol ↔ index codec
//! - `recurrent`: GRU cell and stacked GRU
//! - `policy_state`: recurrent state carried between steps

pub mod alphabet;
pub mod policy_state;
pub mod recurrent;

pub use alphabet::{Alphabet, AlphabetError, UnknownSymbolError, DEFAULT_SYMBOLS};
pub use policy_state::PolicyState;
pub use recurrent::{GruCell, GruCellConfig, StackedGru, StackedGruConfig};
