//! # Dispatch: synchronous fan-out of accepted records.
//!
//! [`Dispatch`] holds one optional callback plus an ordered list of observers.
//! Every record that passes the filter and lands in the ring store is handed
//! to them **in the caller's context**:
//!
//! ```text
//! Logger::log ──► RingStore::append ──► callback(tag, level, msg)      (if set)
//!                                   └─► observer[0](tag, level, msg)
//!                                   └─► observer[1](tag, level, msg)
//!                                   └─► ...                         (registration order)
//! ```
//!
//! ## Caller obligations
//! - Handlers run synchronously; keep them short and non-blocking.
//! - Panics are **not** caught here and unwind into the logging caller.
//! - Handlers must not log through the same [`Logger`](crate::Logger) or
//!   register new handlers from inside a call.

use std::sync::{Arc, PoisonError, RwLock};

use super::level::Level;

/// Receiver of accepted log records.
///
/// Any `Fn(&str, Level, &str) + Send + Sync` closure implements this trait, so
/// plain closures can be registered directly.
///
/// ## Example
/// ```rust
/// use linkvisor::{Level, Logger};
///
/// let logger = Logger::new();
/// logger.add_observer(|tag: &str, level: Level, msg: &str| {
///     if level >= Level::Error {
///         eprintln!("{tag}: {msg}");
///     }
/// });
/// ```
pub trait Observe: Send + Sync + 'static {
    /// Handles one record.
    fn on_log(&self, tag: &str, level: Level, message: &str);

    /// Returns the observer name used in diagnostics.
    ///
    /// The default uses `type_name::<Self>()`; override it with something short.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<F> Observe for F
where
    F: Fn(&str, Level, &str) + Send + Sync + 'static,
{
    fn on_log(&self, tag: &str, level: Level, message: &str) {
        self(tag, level, message)
    }
}

/// Shared handle to an observer.
pub type ObserverRef = Arc<dyn Observe>;

/// Callback slot plus ordered observer registry.
#[derive(Default)]
pub struct Dispatch {
    callback: RwLock<Option<ObserverRef>>,
    observers: RwLock<Vec<ObserverRef>>,
}

impl Dispatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the single callback, replacing any previous one.
    pub fn set_callback(&self, callback: ObserverRef) {
        *self.callback.write().unwrap_or_else(PoisonError::into_inner) = Some(callback);
    }

    /// Removes the single callback.
    pub fn clear_callback(&self) {
        *self.callback.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Appends an observer; observers are invoked in registration order.
    pub fn add_observer(&self, observer: ObserverRef) {
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    /// Invokes the callback, then every observer.
    pub fn emit(&self, tag: &str, level: Level, message: &str) {
        if let Some(cb) = self
            .callback
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            cb.on_log(tag, level, message);
        }

        let observers = self.observers.read().unwrap_or_else(PoisonError::into_inner);
        for observer in observers.iter() {
            observer.on_log(tag, level, message);
        }
    }

    /// True if a callback is installed.
    #[must_use]
    pub fn has_callback(&self) -> bool {
        self.callback
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Names of the registered observers, in registration order.
    #[must_use]
    pub fn observer_names(&self) -> Vec<&'static str> {
        self.observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|o| o.name())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recorder(label: &'static str, sink: Arc<Mutex<Vec<String>>>) -> ObserverRef {
        Arc::new(move |tag: &str, level: Level, msg: &str| {
            sink.lock()
                .unwrap()
                .push(format!("{label}:{tag}:{level}:{msg}"));
        })
    }

    #[test]
    fn test_callback_runs_before_observers_in_order() {
        let sink = Arc::new(Mutex::new(Vec::new()));
        let dispatch = Dispatch::new();
        dispatch.add_observer(recorder("o1", sink.clone()));
        dispatch.add_observer(recorder("o2", sink.clone()));
        dispatch.set_callback(recorder("cb", sink.clone()));

        dispatch.emit("NET", Level::Info, "up");

        assert_eq!(
            *sink.lock().unwrap(),
            vec!["cb:NET:INFO:up", "o1:NET:INFO:up", "o2:NET:INFO:up"]
        );
    }

    #[test]
    fn test_set_callback_replaces_previous() {
        let sink = Arc::new(Mutex::new(Vec::new()));
        let dispatch = Dispatch::new();
        dispatch.set_callback(recorder("first", sink.clone()));
        dispatch.set_callback(recorder("second", sink.clone()));

        dispatch.emit("T", Level::Debug, "m");

        assert_eq!(*sink.lock().unwrap(), vec!["second:T:DEBUG:m"]);
    }

    #[test]
    fn test_clear_callback() {
        let sink = Arc::new(Mutex::new(Vec::new()));
        let dispatch = Dispatch::new();
        dispatch.set_callback(recorder("cb", sink.clone()));
        assert!(dispatch.has_callback());

        dispatch.clear_callback();
        dispatch.emit("T", Level::Error, "m");

        assert!(!dispatch.has_callback());
        assert!(sink.lock().unwrap().is_empty());
    }

    #[test]
    fn test_custom_observer_name() {
        struct Audit;
        impl Observe for Audit {
            fn on_log(&self, _tag: &str, _level: Level, _message: &str) {}
            fn name(&self) -> &'static str {
                "audit"
            }
        }

        let dispatch = Dispatch::new();
        dispatch.add_observer(Arc::new(Audit));
        assert_eq!(dispatch.observer_names(), vec!["audit"]);
    }
}
