//! Zone-based possession value (PxT) for annotated football passes and dribbles.
//! Credits each event to its sender, receiver or dribbler, aggregates per player over a scope of
//! matches, and ranks players against the rest of their roster.

pub mod aggregate;
pub mod classify;
pub mod contribution;
pub mod event;
pub mod print;
pub mod ranking;
pub mod roster;
pub mod scope;
pub mod snapshot;
pub mod xt;
pub mod zone;

#[cfg(test)]
pub(crate) mod testing;

#[doc = include_str!("../README.md")]
#[cfg(doc)]
fn readme() {}
