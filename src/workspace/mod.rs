//! Device workspace arena owned by an execution handle.
//!
//! - [`ArenaStore`]: the current buffer, its size and the in-use flag.
//! - [`SizeQuery`]: the two-phase size negotiation.
//! - [`WorkspaceHandle`]: lifecycle, resizing and checkout.
//! - [`KernelVariant`]: the seam through which kernel dispatch reports sizes
//!   or launches on the arena.

mod arena;
mod checkout;
mod dispatch;
mod error;
mod handle;
mod query;

pub use arena::{roundup_device_memory_size, ArenaStore, DEFAULT_DEVICE_MEMORY_SIZE, MIN_CHUNK_SIZE};
pub use checkout::Checkout;
pub use dispatch::{DispatchOutcome, KernelVariant};
pub use error::WorkspaceError;
pub use handle::WorkspaceHandle;
pub use query::{SizeQuery, SizeQueryOutcome};
