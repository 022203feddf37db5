mod catalog;
mod profile;

pub use catalog::FIXTURE_USERS;
pub use profile::{generate, FixtureConfig};
