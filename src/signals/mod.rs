//! # Push-signal buffering and synchronization.
//!
//! Remote peers push `{type, event}` messages asynchronously, out of
//! request/response order. This module buffers them per kind and offers two
//! independent access modes under a timeout:
//!
//! - [`SignalHub::wait_for_next`] — block until the next event of a kind
//!   arrives;
//! - [`SignalHub::scan_and_remove`] — poll recent history for an event
//!   matching a predicate and take it out of the buffer.
//!
//! ## Contents
//! - [`SignalEvent`] — a decoded push event with its arrival order
//! - [`SignalQueue`] — per-kind delivery channel + history ring
//! - [`SignalHub`] — the registered-kind routing table and public API
//! - [`spawn_listener`] — the single inbound decoding task

mod event;
mod hub;
mod listener;
mod queue;

pub use event::SignalEvent;
pub use hub::SignalHub;
pub use listener::spawn_listener;
pub use queue::SignalQueue;
