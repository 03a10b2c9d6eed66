//! Keep the process alive through Ctrl-C while something is staged.
//!
//! Ctrl-C reaches the whole foreground process group, so the child command
//! gets it too and decides for itself how to exit. This process only logs it
//! and carries on to restore.

use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Swallows interrupt and terminate signals until dropped
#[derive(Debug, Default)]
pub struct InterruptShield {
    listeners: Vec<JoinHandle<()>>,
}

impl InterruptShield {
    /// Start listening. Must be called from within a tokio runtime.
    ///
    /// A signal that cannot be hooked is logged and left at its default
    /// disposition.
    pub fn install() -> Self {
        let listeners = listen();
        debug!("Holding {} signal listener(s) until restore", listeners.len());
        Self { listeners }
    }

    pub fn is_active(&self) -> bool {
        !self.listeners.is_empty()
    }
}

impl Drop for InterruptShield {
    fn drop(&mut self) {
        for listener in self.listeners.drain(..) {
            listener.abort();
        }
    }
}

fn report(name: &'static str) {
    warn!(
        "Received {}; waiting for the command to exit, then restoring",
        name
    );
}

#[cfg(unix)]
fn listen() -> Vec<JoinHandle<()>> {
    use tokio::signal::unix::{signal, SignalKind};

    [
        (SignalKind::interrupt(), "SIGINT"),
        (SignalKind::terminate(), "SIGTERM"),
    ]
    .into_iter()
    .filter_map(|(kind, name)| match signal(kind) {
        Ok(mut stream) => Some(tokio::spawn(async move {
            while stream.recv().await.is_some() {
                report(name);
            }
        })),
        Err(e) => {
            warn!("Cannot listen for {}: {}", name, e);
            None
        }
    })
    .collect()
}

#[cfg(windows)]
fn listen() -> Vec<JoinHandle<()>> {
    match tokio::signal::windows::ctrl_c() {
        Ok(mut stream) => vec![tokio::spawn(async move {
            while stream.recv().await.is_some() {
                report("Ctrl-C");
            }
        })],
        Err(e) => {
            warn!("Cannot listen for Ctrl-C: {}", e);
            Vec::new()
        }
    }
}

#[cfg(not(any(unix, windows)))]
fn listen() -> Vec<JoinHandle<()>> {
    Vec::new()
}
