//! Observer<T> / Observable<T> — the push-stream primitive.
//!
//! An [`Observable`] is lazy: nothing happens until something subscribes, and
//! every subscription gets its own per-subscriber state (that is what lets a
//! field selection gate each subscriber against the last value *it* received).
//! Delivery is synchronous; `subscribe` may call `next` before returning.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::signal::DestroySignal;

/// An owned one-shot closure that removes a subscription when called.
pub type Unsubscribe = Box<dyn FnOnce() + Send + Sync>;

/// Closure type for value notifications.
pub type NextFn<T> = dyn Fn(&T) + Send + Sync;

/// Closure type for completion notifications.
pub type CompleteFn = dyn Fn() + Send + Sync;

type SubscribeFn<T> = dyn Fn(Observer<T>) -> Unsubscribe + Send + Sync;

/// The receiving end of a subscription.
pub struct Observer<T> {
    next: Arc<NextFn<T>>,
    complete: Option<Arc<CompleteFn>>,
}

impl<T> Observer<T> {
    pub fn new(next: impl Fn(&T) + Send + Sync + 'static) -> Self {
        Self {
            next: Arc::new(next),
            complete: None,
        }
    }

    /// Attach a completion callback.
    pub fn on_complete(mut self, complete: impl Fn() + Send + Sync + 'static) -> Self {
        self.complete = Some(Arc::new(complete));
        self
    }

    pub fn next(&self, value: &T) {
        (self.next)(value)
    }

    pub fn complete(&self) {
        if let Some(cb) = &self.complete {
            cb();
        }
    }
}

impl<T> Clone for Observer<T> {
    fn clone(&self) -> Self {
        Self {
            next: Arc::clone(&self.next),
            complete: self.complete.clone(),
        }
    }
}

/// A lazy, cloneable stream of `T`.
pub struct Observable<T> {
    subscribe_fn: Arc<SubscribeFn<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            subscribe_fn: Arc::clone(&self.subscribe_fn),
        }
    }
}

impl<T: 'static> Observable<T> {
    /// Build a stream from its subscribe function.
    pub fn new(subscribe: impl Fn(Observer<T>) -> Unsubscribe + Send + Sync + 'static) -> Self {
        Self {
            subscribe_fn: Arc::new(subscribe),
        }
    }

    /// Subscribe with a value callback only.
    pub fn subscribe(&self, next: impl Fn(&T) + Send + Sync + 'static) -> Unsubscribe {
        self.subscribe_observer(Observer::new(next))
    }

    pub fn subscribe_observer(&self, observer: Observer<T>) -> Unsubscribe {
        (self.subscribe_fn)(observer)
    }

    /// Mirror this stream until `signal` fires, then complete.
    ///
    /// Subscribing after the signal has fired completes immediately without
    /// subscribing upstream, so no replayed value is delivered.
    pub fn take_until(&self, signal: &DestroySignal) -> Observable<T> {
        let source = self.clone();
        let signal = signal.clone();

        Observable::new(move |observer: Observer<T>| {
            if signal.is_triggered() {
                observer.complete();
                return Box::new(|| {}) as Unsubscribe;
            }

            let closed = Arc::new(AtomicBool::new(false));
            let upstream: Arc<Mutex<Option<Unsubscribe>>> = Arc::new(Mutex::new(None));

            let listener_id = {
                let closed = Arc::clone(&closed);
                let upstream = Arc::clone(&upstream);
                let observer = observer.clone();
                signal.on_trigger(move || {
                    if closed.swap(true, Ordering::SeqCst) {
                        return;
                    }
                    let taken = upstream.lock().take();
                    if let Some(unsubscribe) = taken {
                        unsubscribe();
                    }
                    observer.complete();
                })
            };

            let gated = {
                let on_next = {
                    let closed = Arc::clone(&closed);
                    let observer = observer.clone();
                    move |value: &T| {
                        if !closed.load(Ordering::SeqCst) {
                            observer.next(value);
                        }
                    }
                };
                let closed = Arc::clone(&closed);
                let signal = signal.clone();
                Observer::new(on_next).on_complete(move || {
                    if !closed.swap(true, Ordering::SeqCst) {
                        signal.off(listener_id);
                        observer.complete();
                    }
                })
            };

            let unsubscribe = source.subscribe_observer(gated);
            if closed.load(Ordering::SeqCst) {
                // Signal fired (or upstream completed) during the initial replay.
                unsubscribe();
            } else {
                *upstream.lock() = Some(unsubscribe);
            }

            let signal = signal.clone();
            Box::new(move || {
                closed.store(true, Ordering::SeqCst);
                signal.off(listener_id);
                let taken = upstream.lock().take();
                if let Some(unsubscribe) = taken {
                    unsubscribe();
                }
            })
        })
    }
}
