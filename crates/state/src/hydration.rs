//! Two-state lifecycle for persisted slices.
//!
//! A persisted value starts [`Hydration::Uninitialized`] holding its default,
//! which is what server-rendered output and the first client frame must use.
//! Once the client has read storage the value becomes [`Hydration::Loaded`]
//! and stays there for the rest of the session.

/// 持久化值的生命週期。 / Lifecycle of one persisted value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hydration<T> {
    /// Storage has not been read; the value is an untrusted default.
    Uninitialized(T),
    /// Storage has been read; the value is the confirmed preference.
    Loaded(T),
}

impl<T> Hydration<T> {
    /// 目前值。 / Returns the current value regardless of lifecycle state.
    pub fn value(&self) -> &T {
        match self {
            Hydration::Uninitialized(value) | Hydration::Loaded(value) => value,
        }
    }

    /// 可變的目前值。 / Mutable access regardless of lifecycle state.
    pub fn value_mut(&mut self) -> &mut T {
        match self {
            Hydration::Uninitialized(value) | Hydration::Loaded(value) => value,
        }
    }

    /// 已確認的值。 / Returns the value only once it has been confirmed by storage.
    pub fn confirmed(&self) -> Option<&T> {
        match self {
            Hydration::Uninitialized(_) => None,
            Hydration::Loaded(value) => Some(value),
        }
    }

    /// 是否已載入。 / Whether storage has been read.
    pub fn is_loaded(&self) -> bool {
        matches!(self, Hydration::Loaded(_))
    }

    /// 完成水合。 / Moves to `Loaded`, preferring the stored value over the default.
    ///
    /// A slice that is already loaded is left untouched.
    pub fn hydrate_with(self, stored: Option<T>) -> Self {
        match self {
            Hydration::Uninitialized(default) => Hydration::Loaded(stored.unwrap_or(default)),
            loaded @ Hydration::Loaded(_) => loaded,
        }
    }

    /// 取出值。 / Consumes the wrapper.
    pub fn into_inner(self) -> T {
        match self {
            Hydration::Uninitialized(value) | Hydration::Loaded(value) => value,
        }
    }
}

/// 可水合的狀態。 / Store that participates in client hydration.
pub trait Hydrate {
    /// Reads the persisted slice and marks the store as loaded.
    fn hydrate(&mut self);

    fn is_hydrated(&self) -> bool;
}

/// 一次性水合協調器。 / One-shot coordinator run once per mounted root.
#[derive(Debug, Default)]
pub struct HydrationCoordinator {
    done: bool,
}

impl HydrationCoordinator {
    /// 建立協調器。 / Coordinator that has not run yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// 是否完成。 / Whether hydration has already run.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// 水合所有狀態。 / Hydrates every participant the first time it is called.
    ///
    /// Returns `true` when this call performed the transition; later calls are
    /// no-ops and return `false`.
    pub fn hydrate(&mut self, participants: &mut [&mut dyn Hydrate]) -> bool {
        if self.done {
            return false;
        }
        for participant in participants.iter_mut() {
            participant.hydrate();
        }
        self.done = true;
        tracing::debug!(participants = participants.len(), "client hydration complete");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        calls: usize,
        value: Option<Hydration<u8>>,
    }

    impl Hydrate for Counter {
        fn hydrate(&mut self) {
            self.calls += 1;
            let current = self.value.take().unwrap_or(Hydration::Uninitialized(0));
            self.value = Some(current.hydrate_with(Some(7)));
        }

        fn is_hydrated(&self) -> bool {
            self.value.as_ref().is_some_and(Hydration::is_loaded)
        }
    }

    #[test]
    fn stored_value_replaces_default_once() {
        let state = Hydration::Uninitialized("en").hydrate_with(Some("ja"));
        assert_eq!(state, Hydration::Loaded("ja"));
        let state = state.hydrate_with(Some("en"));
        assert_eq!(state.confirmed(), Some(&"ja"));
    }

    #[test]
    fn missing_entry_confirms_the_default() {
        let state: Hydration<&str> = Hydration::Uninitialized("en");
        assert_eq!(state.confirmed(), None);
        let state = state.hydrate_with(None);
        assert_eq!(state, Hydration::Loaded("en"));
    }

    #[test]
    fn coordinator_runs_only_once() {
        let mut first = Counter::default();
        let mut second = Counter::default();
        let mut coordinator = HydrationCoordinator::new();

        assert!(coordinator.hydrate(&mut [&mut first, &mut second]));
        assert!(!coordinator.hydrate(&mut [&mut first, &mut second]));

        assert!(coordinator.is_done());
        assert_eq!(first.calls, 1);
        assert_eq!(second.calls, 1);
        assert!(first.is_hydrated() && second.is_hydrated());
    }
}
