//! Task submission for script invocations.
//!
//! The two execution strategies of the runtime are one conditional
//! branch here rather than duplicated spawn logic at every call site.

use std::thread;

/// How a submitted script invocation completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompletionPolicy {
    /// Run synchronously on the calling thread. Invocations submitted
    /// inline complete in submission order.
    Inline,
    /// Spawn an independent worker per invocation and do not wait for
    /// it. No ordering guarantee between detached invocations, or
    /// between a detached invocation and later inline ones.
    Detached,
}

/// Run `task` under `policy`. A failure to spawn a detached worker is
/// logged and dropped; the caller is never blocked on it.
pub fn submit<F>(policy: CompletionPolicy, name: &str, task: F)
where
    F: FnOnce() + Send + 'static,
{
    match policy {
        CompletionPolicy::Inline => task(),
        CompletionPolicy::Detached => {
            let spawned = thread::Builder::new()
                .name(format!("script-{name}"))
                .spawn(task);
            if let Err(err) = spawned {
                tracing::error!(worker = name, error = %err, "failed to spawn script worker");
            }
        }
    }
}
