//! # Observers
//!
//! Synchronous change notification for feature flags.
//!
//! ## Overview
//!
//! An [`ObserverRegistry`] holds callbacks that receive `(flag id, new value)` after every
//! effective flag change. Callbacks run on the mutating thread, in subscription order, with
//! no lock held, so a callback may read flags, mutate flags, or subscribe and unsubscribe.
//! A panicking callback is logged and skipped; the remaining callbacks still run.
//!
//! For async consumers, [`ObserverRegistry::subscribe_channel`] bridges the same
//! notifications into a `tokio` broadcast channel.
//!
//! # Example
//!
//! ```rust
//! use flagkit_domain::FlagId;
//! use flagkit_observers::ObserverRegistry;
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let registry = ObserverRegistry::new();
//! let seen = Arc::new(AtomicUsize::new(0));
//!
//! let counter = seen.clone();
//! let sub = registry.subscribe(move |_id, _enabled| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! registry.notify(&FlagId::from("DASHBOARD"), false);
//! assert!(sub.unsubscribe());
//! registry.notify(&FlagId::from("DASHBOARD"), true);
//!
//! assert_eq!(seen.load(Ordering::SeqCst), 1);
//! ```

mod channel;
mod error;
mod receiver;
mod registry;

pub use channel::{FlagChanged, FlagChannel};
pub use error::{ObserverError, ObserverErrorExt};
pub use receiver::EventReceiverExt;
pub use registry::{Observer, ObserverRegistry, SubscriberId, Subscription, SubscriptionGuard};
