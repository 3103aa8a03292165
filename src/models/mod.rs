// src/models/mod.rs

pub mod answer;
pub mod group;
pub mod leaderboard;
pub mod question;
pub mod ticket;
