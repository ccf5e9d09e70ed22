//! Cross-component scenario tests
//!
//! Drive the full subsystem against the in-memory change feed: reconnect
//! suppression, the end-to-end read flow, multi-session reconciliation.

mod reconnect;
