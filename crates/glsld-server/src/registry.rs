//! Per-document compilation registry (§4.J, §5): a `uri -> BackgroundCompilation`
//! map guarded by a mutex, the way `core-state` holds a registry of editor
//! state that's swapped, never mutated in place, on every edit.

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use glsl_compile::CompilerResult;

/// `{version, uri, sourceBuffer, result?, availableLatch, mutex, condvar}`
/// (§3) — the availability latch and the write-once result share one
/// `Mutex<Option<_>>` rather than a separate bool, per §5's "prefer a
/// single-fire one-shot channel" note: there is nothing to latch on besides
/// the result itself showing up.
pub struct BackgroundCompilation {
    pub version: i32,
    pub uri: String,
    pub source: String,
    state: Mutex<Option<Arc<CompilerResult>>>,
    condvar: Condvar,
}

impl BackgroundCompilation {
    fn new(version: i32, uri: String, source: String) -> Self {
        Self { version, uri, source, state: Mutex::new(None), condvar: Condvar::new() }
    }

    /// Publishes the compile result and wakes every waiter. Called exactly
    /// once per `BackgroundCompilation`, from whichever worker thread picked
    /// up the compile job.
    pub fn publish(&self, result: Arc<CompilerResult>) {
        let mut guard = self.state.lock().unwrap();
        *guard = Some(result);
        self.condvar.notify_all();
    }

    /// `WaitAvailable(timeout)` (§4.J): blocks until the result is published
    /// or `timeout` elapses, returning `None` on timeout. A compile that
    /// never reaches `publish` (a fatal `CompileError` during setup) leaves
    /// every waiter to time out rather than panic or spin forever.
    pub fn wait_available(&self, timeout: Duration) -> Option<Arc<CompilerResult>> {
        let guard = self.state.lock().unwrap();
        if let Some(result) = guard.as_ref() {
            return Some(Arc::clone(result));
        }
        let (guard, _timeout_result) =
            self.condvar.wait_timeout_while(guard, timeout, |r| r.is_none()).unwrap();
        guard.as_ref().map(Arc::clone)
    }
}

/// The server-wide `uri -> BackgroundCompilation` table (§4.J). Locked only
/// across pointer swaps — never across a compile or a feature-handler call.
#[derive(Default)]
pub struct DocumentRegistry {
    docs: Mutex<HashMap<String, Arc<BackgroundCompilation>>>,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces (never mutates) the entry for `uri` with a fresh, as-yet
    /// unpublished `BackgroundCompilation` and returns it so the caller can
    /// schedule the compile job and then `publish` onto it.
    pub fn open_or_update(&self, uri: String, version: i32, source: String) -> Arc<BackgroundCompilation> {
        let entry = Arc::new(BackgroundCompilation::new(version, uri.clone(), source));
        self.docs.lock().unwrap().insert(uri, Arc::clone(&entry));
        entry
    }

    pub fn close(&self, uri: &str) {
        self.docs.lock().unwrap().remove(uri);
    }

    pub fn get(&self, uri: &str) -> Option<Arc<BackgroundCompilation>> {
        self.docs.lock().unwrap().get(uri).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_available_returns_published_result() {
        let registry = DocumentRegistry::new();
        let entry = registry.open_or_update("file:///a.frag".into(), 1, "void main(){}".into());

        let mut inv = glsl_compile::CompilerInvocation::new();
        inv.set_main_file_from_buffer(entry.source.clone());
        let result = Arc::new(inv.compile_main_file().expect("compiles"));
        entry.publish(Arc::clone(&result));

        let observed = entry.wait_available(Duration::from_millis(100));
        assert!(observed.is_some());
    }

    #[test]
    fn wait_available_times_out_when_never_published() {
        let entry = BackgroundCompilation::new(1, "file:///a.frag".into(), "void main(){}".into());
        let observed = entry.wait_available(Duration::from_millis(20));
        assert!(observed.is_none());
    }

    #[test]
    fn replacing_an_entry_does_not_mutate_the_old_one() {
        let registry = DocumentRegistry::new();
        let first = registry.open_or_update("file:///a.frag".into(), 1, "a".into());
        let second = registry.open_or_update("file:///a.frag".into(), 2, "b".into());
        assert_eq!(first.version, 1);
        assert_eq!(second.version, 2);
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(registry.get("file:///a.frag").unwrap().version, 2);
    }
}
