//! Île-de-France next-departure server.
//!
//! Answers "when is the next metro/bus/tram/train at this stop, on this
//! line, in this direction?" by resolving human names against the IDFM
//! reference tables and matching the live SIRI stop-monitoring feed back
//! to the query.

pub mod config;
pub mod domain;
pub mod matcher;
pub mod realtime;
pub mod reference;
pub mod resolve;
pub mod service;
pub mod web;
