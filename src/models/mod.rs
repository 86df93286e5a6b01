pub mod location;
pub mod matching;
pub mod skill;
pub mod vehicle;
