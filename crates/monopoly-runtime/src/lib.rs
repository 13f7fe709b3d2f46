#![deny(warnings)]

//! Game orchestration: turn rotation, avatar steps, cell actions, card
//! effects, bankruptcy and inflation on top of the core and economy crates.

mod event;
mod game;
mod prompt;
mod stats;

pub use event::GameEvent;
pub use game::Game;
pub use prompt::{Prompter, Scripted, TopCard};
pub use stats::{net_worth, GameStats, Highlight};
