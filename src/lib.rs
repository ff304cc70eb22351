//! Maze Hunt - pursuit of hidden targets through noisy range readings

pub mod agents;
pub mod core;
pub mod estimation;
pub mod game;
pub mod maze;
pub mod target;
