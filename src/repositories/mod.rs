mod attempt;
mod link;

#[cfg(test)]
pub mod memory;

pub use attempt::{AttemptRepository, AttemptRepositoryTrait};
pub use link::{LinkRepository, LinkRepositoryTrait};

#[cfg(test)]
pub use attempt::MockAttemptRepositoryTrait;
#[cfg(test)]
pub use link::MockLinkRepositoryTrait;
