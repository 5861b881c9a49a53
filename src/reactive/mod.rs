//! Reactive layer — synchronous push streams with replay-latest semantics.
//!
//! # Modules
//!
//! - [`listeners`] — snapshot-on-emit listener list ([`Listeners<L>`]).
//! - [`observable`] — [`Observer<T>`], [`Observable<T>`] and [`Unsubscribe`].
//! - [`signal`] — level-triggered [`DestroySignal`].
//! - [`gate`] — [`ChangeGatedEmitter<V>`], the equality-gated value holder.

pub mod gate;
pub mod listeners;
pub mod observable;
pub mod signal;

pub use gate::ChangeGatedEmitter;
pub use listeners::{ListenerId, Listeners};
pub use observable::{Observable, Observer, Unsubscribe};
pub use signal::DestroySignal;
