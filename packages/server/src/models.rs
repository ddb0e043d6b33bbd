pub mod config;
pub mod error;
pub mod game;
pub mod mission;
pub mod player;
pub mod proposal;
pub mod response;
pub mod role;
pub mod role_assignment;
pub mod round;
pub mod rule;
pub mod score;
pub mod vote;
