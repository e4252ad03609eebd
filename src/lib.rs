//! flowbridge: relays chat messages to a remote workflow engine and replies with its result.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
