pub mod game;

pub use game::InMemoryGameRepository;
