//! Inbound adapters that translate external requests into page callbacks
//! while keeping framework details at the edge.

pub mod http;
