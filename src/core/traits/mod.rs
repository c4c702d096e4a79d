//! Core traits for platform-agnostic state access.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                 LowPowerManager                      │
//! │                        │                             │
//! │                        ▼                             │
//! │          ┌──────────────────────────────┐            │
//! │          │ SharedState<T>               │            │
//! │          │ + with(f: FnOnce(&T) -> R)   │            │
//! │          │ + with_mut(f)                │            │
//! │          └──────────────────────────────┘            │
//! │             │                       │                │
//! │             ▼                       ▼                │
//! │  ┌──────────────────────┐  ┌────────────────────┐    │
//! │  │ CriticalState<T>     │  │ LocalState<T>      │    │
//! │  │ #[cfg(feature =      │  │ (always available) │    │
//! │  │   "embassy")]        │  │                    │    │
//! │  └──────────────────────┘  └────────────────────┘    │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! # Features
//!
//! - **`embassy`**: Enables `CriticalState<T>`

pub mod sync;

pub use sync::{LocalState, SharedState};

#[cfg(feature = "embassy")]
pub use sync::CriticalState;
