//! Context store
//!
//! Binds typed values to the currently active logical execution context.
//! A context is carried by tokio task-local storage, so a binding follows
//! the future (or closure) it was established for across polls, threads
//! and runtimes, and is invisible to unrelated work sharing the thread.
//!
//! Work scheduled from inside a context keeps it only when scheduled
//! through the capture helpers in this module ([`spawn`],
//! [`spawn_blocking`], [`bind`]) or by re-entering a handle obtained from
//! [`current_context`]. Continuations share the binding table of the
//! context they were captured from; a nested context starts from a copy.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use fwlog_core_types::{ContextId, RequestId};
use fwlog_errors::{binding_type, no_active_context, Result};
use parking_lot::RwLock;
use tokio::task::futures::TaskLocalFuture;
use tokio::task::JoinHandle;

use crate::sink::Logger;

tokio::task_local! {
    static CURRENT: Context;
}

/// Well-known binding keys
///
/// Each key accepts exactly one value type; binding anything else fails
/// with `FwError::BindingType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKey {
    /// Logger override consulted by `get_logger()`; holds a [`Logger`]
    Logger,
    /// Correlation id of the request the context serves; holds a
    /// [`RequestId`]
    RequestId,
}

impl ContextKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextKey::Logger => "fw.logger",
            ContextKey::RequestId => "fw.request_id",
        }
    }

    /// Name of the value type this key holds
    pub fn value_type_name(&self) -> &'static str {
        match self {
            ContextKey::Logger => "Logger",
            ContextKey::RequestId => "RequestId",
        }
    }

    fn value_type_id(&self) -> TypeId {
        match self {
            ContextKey::Logger => TypeId::of::<Logger>(),
            ContextKey::RequestId => TypeId::of::<RequestId>(),
        }
    }

    fn check<T: Any>(&self) -> Result<()> {
        if TypeId::of::<T>() == self.value_type_id() {
            Ok(())
        } else {
            Err(binding_type(self, self.value_type_name(), type_name::<T>()))
        }
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type Binding = Arc<dyn Any + Send + Sync>;

/// Handle to a logical execution context
///
/// Cloning the handle does not create a new context: all clones share one
/// binding table. The table is dropped with the last handle.
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    id: ContextId,
    parent: Option<ContextId>,
    bindings: RwLock<HashMap<ContextKey, Binding>>,
}

impl Context {
    /// Create a root context with an empty binding table
    pub fn new() -> Self {
        Self::from_parts(None, HashMap::new())
    }

    /// Create a context whose table starts as a copy of the active one
    ///
    /// Returns a root context when called outside any context.
    pub fn child_of_current() -> Self {
        match current_context() {
            Some(parent) => {
                let bindings = parent.inner.bindings.read().clone();
                Self::from_parts(Some(parent.id()), bindings)
            }
            None => Self::new(),
        }
    }

    fn from_parts(parent: Option<ContextId>, bindings: HashMap<ContextKey, Binding>) -> Self {
        let context = Self {
            inner: Arc::new(ContextInner {
                id: ContextId::new(),
                parent,
                bindings: RwLock::new(bindings),
            }),
        };
        tracing::trace!(
            context_id = %context.id(),
            parent_id = ?parent.map(|id| id.to_string()),
            "context established"
        );
        context
    }

    pub fn id(&self) -> ContextId {
        self.inner.id
    }

    /// Id of the context this one was forked from, if any
    pub fn parent_id(&self) -> Option<ContextId> {
        self.inner.parent
    }

    /// Look up a binding
    ///
    /// Returns `None` when the key is unbound or bound to a value of
    /// another type.
    pub fn get<T>(&self, key: ContextKey) -> Option<T>
    where
        T: Any + Send + Sync + Clone,
    {
        let bindings = self.inner.bindings.read();
        let binding = bindings.get(&key)?;
        (**binding).downcast_ref::<T>().cloned()
    }

    /// Bind `value` under `key`, replacing any previous binding
    ///
    /// # Errors
    ///
    /// Returns `FwError::BindingType` when `T` is not the type `key` holds.
    pub fn set<T>(&self, key: ContextKey, value: T) -> Result<()>
    where
        T: Any + Send + Sync,
    {
        key.check::<T>()?;
        self.insert(key, value);
        Ok(())
    }

    pub(crate) fn insert<T>(&self, key: ContextKey, value: T)
    where
        T: Any + Send + Sync,
    {
        self.inner.bindings.write().insert(key, Arc::new(value));
    }

    pub fn contains(&self, key: ContextKey) -> bool {
        self.inner.bindings.read().contains_key(&key)
    }

    /// Run `fut` with this context active on every poll
    pub fn scope<F: Future>(self, fut: F) -> TaskLocalFuture<Context, F> {
        CURRENT.scope(self, fut)
    }

    /// Run `f` with this context active
    pub fn sync_scope<F, R>(self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        CURRENT.sync_scope(self, f)
    }

    /// Whether two handles refer to the same context
    pub fn ptr_eq(a: &Context, b: &Context) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<ContextKey> = self.inner.bindings.read().keys().copied().collect();
        f.debug_struct("Context")
            .field("id", &self.inner.id)
            .field("parent", &self.inner.parent)
            .field("keys", &keys)
            .finish()
    }
}

/// Handle to the active context, or `None` outside any context
pub fn current_context() -> Option<Context> {
    CURRENT.try_with(Context::clone).ok()
}

/// Look up `key` in the active context
///
/// Never fails: returns `None` outside any context.
pub fn get<T>(key: ContextKey) -> Option<T>
where
    T: Any + Send + Sync + Clone,
{
    current_context()?.get(key)
}

/// Bind `value` under `key` in the active context
///
/// # Errors
///
/// Returns `FwError::NoActiveContext` when called outside any context,
/// and `FwError::BindingType` when `T` is not the type `key` holds.
pub fn set<T>(key: ContextKey, value: T) -> Result<()>
where
    T: Any + Send + Sync,
{
    let context = current_context().ok_or_else(|| no_active_context(key))?;
    context.set(key, value)
}

/// Run `f` inside a brand-new context
///
/// # Example
///
/// ```
/// use fwlog_core_types::RequestId;
/// use fwlog_logging::context::{self, ContextKey};
///
/// let seen = context::run_in_new_context(|| {
///     let id = RequestId::from_string("req-1".to_string());
///     context::set(ContextKey::RequestId, id).unwrap();
///     context::get::<RequestId>(ContextKey::RequestId)
/// });
/// assert_eq!(seen.map(|id| id.to_string()).as_deref(), Some("req-1"));
/// assert!(context::current_context().is_none());
/// ```
pub fn run_in_new_context<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    Context::child_of_current().sync_scope(f)
}

/// Run `fut` inside a brand-new context
///
/// The enclosing context (if any) is captured when this function is
/// called, not when the future is first polled.
pub fn run_in_new_context_async<F: Future>(fut: F) -> TaskLocalFuture<Context, F> {
    Context::child_of_current().scope(fut)
}

/// Spawn a task on the tokio runtime that keeps the active context
pub fn spawn<F>(fut: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    match current_context() {
        Some(context) => tokio::spawn(context.scope(fut)),
        None => tokio::spawn(fut),
    }
}

/// Run blocking work on tokio's blocking pool, keeping the active context
pub fn spawn_blocking<F, R>(f: F) -> JoinHandle<R>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(bind(f))
}

/// Capture the active context into a deferred callback
///
/// The returned closure re-enters the captured context when invoked, on
/// whatever thread runs it.
pub fn bind<F, R>(f: F) -> impl FnOnce() -> R
where
    F: FnOnce() -> R,
{
    let captured = current_context();
    move || match captured {
        Some(context) => context.sync_scope(f),
        None => f(),
    }
}
