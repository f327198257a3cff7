//! Core state model for the mendax desktop app: the conversation log, the
//! dual-scope deception counters, the persistence store, and the oracle
//! request client. Everything here is exercised without a UI.

pub mod catalog;
pub mod config;
pub mod export;
pub mod log;
pub mod message;
pub mod oracle;
pub mod session;
pub mod store;
pub mod tracking;
