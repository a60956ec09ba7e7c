//! Play Lounge: a party-game hub with a trivia proxy, a shared player
//! roster, and the Trivia Night and Truth-or-Dare controllers.

pub mod api;
pub mod config;
pub mod games;
pub mod round;
pub mod session;
pub mod trivia;
pub mod truth_or_dare;
pub mod types;
