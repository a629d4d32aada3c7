//! View callables and the lazy resolution proxy.
//!
//! # Data Flow
//! ```text
//! Registration (startup):
//!     RouteTarget::Direct(ViewFn)      → used as-is
//!     RouteTarget::Deferred(path)      → LazyView { path, args, empty cache }
//!
//! First matching request:
//!     LazyView.call(request)
//!         → registry lookup (module, attribute)
//!         → adapt entry (function / class view / factory)
//!         → cache ViewFn in OnceCell
//!         → invoke
//!
//! Later requests:
//!     LazyView.call(request) → cached ViewFn → invoke
//! ```
//!
//! # Design Decisions
//! - Views are type-erased async fns over raw axum requests
//! - Resolution is memoized per proxy instance, not globally
//! - Resolution failures surface at request time as 500s, never at startup
//! - Proxy equality compares resolved targets; failures compare unequal

pub mod handler;
pub mod lazy;

pub use handler::{BoundView, ViewFn, ViewFuture};
pub use lazy::LazyView;
