mod attempt;
mod link;

pub use attempt::{AttemptDecision, AttemptRecord, BudgetSnapshot};
pub use link::{Link, LinkMutationDto, LinkOrigin, LinkStats, NewLink, UpsertAction};
