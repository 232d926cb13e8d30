//! Storm Gambit - emotional decision core for a turn-based board game

pub mod behavior;
pub mod board;
pub mod core;
pub mod emotion;
pub mod game;
pub mod opponent;
pub mod social;
pub mod storm;
