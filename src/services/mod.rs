pub mod restaurant;
pub mod vote;
