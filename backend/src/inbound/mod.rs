//! Inbound adapters that translate external requests into entity store
//! calls while keeping parsing details at the edge.
//!
//! The operator command line lives under [`cli`].

pub mod cli;
