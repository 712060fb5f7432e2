//! Scoped modification of process environment variables.
//!
//! The process environment is global, while tests run on many threads. Every test that
//! touches a variable should hold the lock returned by [`lock_env`] for as long as its
//! [`EnvVarGuard`]s are alive.

use std::{
    ffi::{OsStr, OsString},
    sync::{Mutex, MutexGuard, PoisonError},
};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Serializes access to the process environment between tests.
pub fn lock_env() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Captures the value of an environment variable and restores it when dropped,
/// whether the scope ends normally, early, or by unwinding.
#[derive(Debug)]
pub struct EnvVarGuard {
    name: String,
    previous: Option<OsString>,
}

impl EnvVarGuard {
    /// Captures the current value of `name` without changing it.
    pub fn capture(name: impl Into<String>) -> EnvVarGuard {
        let name = name.into();
        let previous = std::env::var_os(&name);
        EnvVarGuard { name, previous }
    }

    /// Captures `name`, then sets it to `value`.
    pub fn set(name: impl Into<String>, value: impl AsRef<OsStr>) -> EnvVarGuard {
        let guard = Self::capture(name);
        // SAFETY: callers hold `lock_env()`, so no other test thread reads or writes the
        // environment concurrently.
        unsafe { std::env::set_var(&guard.name, value) };
        guard
    }

    /// Captures `name`, then removes it from the environment.
    pub fn unset(name: impl Into<String>) -> EnvVarGuard {
        let guard = Self::capture(name);
        // SAFETY: see `set`.
        unsafe { std::env::remove_var(&guard.name) };
        guard
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        // SAFETY: see `set`.
        unsafe {
            match &self.previous {
                Some(value) => std::env::set_var(&self.name, value),
                None => std::env::remove_var(&self.name),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VAR: &str = "MEMRES_TESTKIT_ENV_GUARD";

    #[test]
    fn test_restores_unset_variable() {
        let _lock = lock_env();
        {
            let _unset = EnvVarGuard::unset(VAR);
            let _guard = EnvVarGuard::set(VAR, "inner");
            assert_eq!(std::env::var(VAR).unwrap(), "inner");
        }
        assert!(std::env::var_os(VAR).is_none());
    }

    #[test]
    fn test_restores_on_unwind() {
        let _lock = lock_env();
        let _outer = EnvVarGuard::set(VAR, "outer");
        let result = std::panic::catch_unwind(|| {
            let _guard = EnvVarGuard::set(VAR, "temporary");
            panic!("scope ends by unwinding");
        });
        assert!(result.is_err());
        assert_eq!(std::env::var(VAR).unwrap(), "outer");
    }
}
