pub mod bridge;
pub mod handlers;

#[cfg(test)]
mod e2e;

pub use bridge::ApiBridge;
