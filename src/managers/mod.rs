//! Domain types and the pure filtering/voting logic. Nothing in here talks to
//! actors or storage.

pub mod filter;
pub mod hours;
pub mod locks;
pub mod page;
pub mod restaurant;
pub mod tags;
pub mod text;
pub mod vote;
