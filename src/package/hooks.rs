//! Lifecycle hooks fired around package operations.
//!
//! Every [`MddocPackage`](crate::MddocPackage) owns one [`HookPipeline`].
//! Listeners are registered per [`HookName`] and invoked in registration
//! order. Each listener is awaited before the next one starts, and the first
//! failing listener aborts the firing: the error reaches the caller of the
//! operation that fired the hook.
//!
//! | Hook | Event | Fired by |
//! |---|---|---|
//! | `before:init`, `init`, `after:init` | [`HookEvent::Init`] | package construction |
//! | `getData` | [`HookEvent::GetData`] | reads |
//! | `before:setData`, `setData`, `after:setData` | [`HookEvent::SetData`] | writes |
//! | `delData` | [`HookEvent::DelData`] | deletes |
//! | `saveZip` | [`HookEvent::SaveZip`] | saves |

use crate::package::error::{BoxError, PackageError, Result};
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Boxed future returned by listeners.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Outcome of a single listener invocation. An `Err` vetoes the operation.
pub type ListenerResult = std::result::Result<(), BoxError>;

/// The closed set of lifecycle hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookName {
    BeforeInit,
    Init,
    AfterInit,
    GetData,
    BeforeSetData,
    SetData,
    AfterSetData,
    DelData,
    SaveZip,
}

impl HookName {
    pub const ALL: [HookName; 9] = [
        HookName::BeforeInit,
        HookName::Init,
        HookName::AfterInit,
        HookName::GetData,
        HookName::BeforeSetData,
        HookName::SetData,
        HookName::AfterSetData,
        HookName::DelData,
        HookName::SaveZip,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            HookName::BeforeInit => "before:init",
            HookName::Init => "init",
            HookName::AfterInit => "after:init",
            HookName::GetData => "getData",
            HookName::BeforeSetData => "before:setData",
            HookName::SetData => "setData",
            HookName::AfterSetData => "after:setData",
            HookName::DelData => "delData",
            HookName::SaveZip => "saveZip",
        }
    }
}

impl fmt::Display for HookName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HookName {
    type Err = PackageError;

    fn from_str(s: &str) -> Result<Self> {
        HookName::ALL
            .into_iter()
            .find(|hook| hook.as_str() == s)
            .ok_or_else(|| PackageError::InvalidHookName(s.to_string()))
    }
}

/// Arguments passed to listeners. The variant is fixed by the hook being fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookEvent {
    /// `before:init`, `init` and `after:init`
    Init,
    /// `getData`
    GetData { path: String },
    /// `before:setData`, `setData` and `after:setData`
    SetData { path: String, data: Bytes },
    /// `delData`
    DelData { path: String },
    /// `saveZip`
    SaveZip,
}

impl HookEvent {
    /// Canonical path the event refers to, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            HookEvent::GetData { path }
            | HookEvent::SetData { path, .. }
            | HookEvent::DelData { path } => Some(path),
            HookEvent::Init | HookEvent::SaveZip => None,
        }
    }

    /// Content being written, for the set hooks.
    pub fn data(&self) -> Option<&Bytes> {
        match self {
            HookEvent::SetData { data, .. } => Some(data),
            _ => None,
        }
    }

    /// Whether this event carries the argument signature of `hook`.
    pub fn fits(&self, hook: HookName) -> bool {
        matches!(
            (hook, self),
            (
                HookName::BeforeInit | HookName::Init | HookName::AfterInit,
                HookEvent::Init
            ) | (HookName::GetData, HookEvent::GetData { .. })
                | (
                    HookName::BeforeSetData | HookName::SetData | HookName::AfterSetData,
                    HookEvent::SetData { .. }
                )
                | (HookName::DelData, HookEvent::DelData { .. })
                | (HookName::SaveZip, HookEvent::SaveZip)
        )
    }
}

/// A listener attached to one hook.
pub trait HookListener: Send + Sync {
    fn call(&self, event: HookEvent) -> BoxFuture<'_, ListenerResult>;
}

struct FnListener<F>(F);

impl<F> HookListener for FnListener<F>
where
    F: Fn(&HookEvent) -> ListenerResult + Send + Sync,
{
    fn call(&self, event: HookEvent) -> BoxFuture<'_, ListenerResult> {
        let result = (self.0)(&event);
        Box::pin(std::future::ready(result))
    }
}

struct AsyncFnListener<F>(F);

impl<F, Fut> HookListener for AsyncFnListener<F>
where
    F: Fn(HookEvent) -> Fut + Send + Sync,
    Fut: Future<Output = ListenerResult> + Send + 'static,
{
    fn call(&self, event: HookEvent) -> BoxFuture<'_, ListenerResult> {
        Box::pin((self.0)(event))
    }
}

/// Handle returned on registration, used to remove the listener again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(u64);

#[derive(Clone)]
struct Registered {
    id: HookId,
    listener: Arc<dyn HookListener>,
}

/// Ordered, per-package hook dispatcher.
///
/// A firing iterates over a snapshot of the listeners taken when it starts:
/// listeners registered or removed while it runs take effect from the next
/// firing on.
#[derive(Default)]
pub struct HookPipeline {
    listeners: RwLock<HashMap<HookName, Vec<Registered>>>,
    next_id: AtomicU64,
}

impl HookPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listener to `hook`.
    pub fn register<L>(&self, hook: HookName, listener: L) -> HookId
    where
        L: HookListener + 'static,
    {
        let id = HookId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .entry(hook)
            .or_default()
            .push(Registered {
                id,
                listener: Arc::new(listener),
            });
        id
    }

    /// Append a synchronous closure to `hook`.
    pub fn register_fn<F>(&self, hook: HookName, f: F) -> HookId
    where
        F: Fn(&HookEvent) -> ListenerResult + Send + Sync + 'static,
    {
        self.register(hook, FnListener(f))
    }

    /// Append a closure returning a future to `hook`.
    ///
    /// # Example
    ///
    /// ```
    /// use mddoc::{HookName, HookPipeline};
    ///
    /// let hooks = HookPipeline::new();
    /// hooks.register_async(HookName::SetData, |event| async move {
    ///     println!("writing {:?}", event.path());
    ///     Ok(())
    /// });
    /// ```
    pub fn register_async<F, Fut>(&self, hook: HookName, f: F) -> HookId
    where
        F: Fn(HookEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ListenerResult> + Send + 'static,
    {
        self.register(hook, AsyncFnListener(f))
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unregister(&self, id: HookId) -> bool {
        let mut listeners = self.listeners.write();
        for registered in listeners.values_mut() {
            if let Some(pos) = registered.iter().position(|r| r.id == id) {
                registered.remove(pos);
                return true;
            }
        }
        false
    }

    /// Remove every listener of `hook`.
    pub fn clear(&self, hook: HookName) {
        self.listeners.write().remove(&hook);
    }

    pub fn listener_count(&self, hook: HookName) -> usize {
        self.listeners.read().get(&hook).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.read().values().all(Vec::is_empty)
    }

    /// Invoke every listener of `hook` in registration order.
    ///
    /// Stops at the first failing listener and returns
    /// [`PackageError::HookListener`].
    pub async fn fire(&self, hook: HookName, event: HookEvent) -> Result<()> {
        debug_assert!(event.fits(hook), "event {:?} fired on '{}'", event, hook);

        let snapshot = self.snapshot(hook);
        if snapshot.is_empty() {
            return Ok(());
        }

        log::trace!("firing '{}' to {} listener(s)", hook, snapshot.len());
        for listener in snapshot {
            listener
                .call(event.clone())
                .await
                .map_err(|source| PackageError::HookListener { hook, source })?;
        }
        Ok(())
    }

    fn snapshot(&self, hook: HookName) -> Vec<Arc<dyn HookListener>> {
        self.listeners
            .read()
            .get(&hook)
            .map(|registered| registered.iter().map(|r| Arc::clone(&r.listener)).collect())
            .unwrap_or_default()
    }
}

impl fmt::Debug for HookPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.listeners.read();
        let mut map = f.debug_map();
        for hook in HookName::ALL {
            if let Some(registered) = listeners.get(&hook) {
                map.entry(&hook.as_str(), &registered.len());
            }
        }
        map.finish()
    }
}
