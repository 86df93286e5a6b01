pub mod intents;
pub mod matcher;
pub mod skill;
pub mod speech;
pub mod spoken;
