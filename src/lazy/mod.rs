//! # Exactly-once lazy resources.
//!
//! Deferred-construction wrappers need a value that is built on first use, built only
//! once, and shared by every caller. This module provides one cell per execution model:
//!
//! | Flavor                | Waiting callers        | Factory                               |
//! |-----------------------|------------------------|---------------------------------------|
//! | [`LazyResource`]      | park their thread      | `Fn() -> Result<T, E>`                |
//! | [`AsyncLazyResource`] | suspend cooperatively  | `Fn(CancellationToken) -> Future<..>` |
//!
//! Both share the same lifecycle, reported by [`LazyState`]:
//! ```text
//! Unresolved ──get()──► Resolving ──Ok──► Resolved (terminal)
//!      ▲                    │
//!      └──────Err/panic─────┘   (not poisoned: the next get() retries)
//! ```

mod async_resource;
mod resource;
mod state;

pub use async_resource::AsyncLazyResource;
pub use resource::LazyResource;
pub use state::LazyState;
