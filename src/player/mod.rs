pub mod models;
pub mod repository;

pub use models::{
    CategoryCounters, NewPlayer, Player, PlayerCounters, PlayerId, PlayerPatch, Position,
};
pub use repository::{InMemoryPlayerRepository, PlayerRepository, PostgresPlayerRepository};
