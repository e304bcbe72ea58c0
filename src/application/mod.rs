//! Application layer - reactive slots, remote sync and the workspace façade.
//!
//! This layer orchestrates domain computations over the persistence ports.
//! Nothing here renders; callers read typed values and results.

pub mod slots;
pub mod sync;
pub mod workspace;

pub use slots::{SlotBinding, SlotChange, SlotError, SlotService, Subscription};
pub use sync::{
    ConfirmedReset, ResetConfirmedOnce, ResetOutcome, ResetRequest, SyncConfig, SyncCoordinator,
    SyncError, SyncHandle, SyncState, SyncStatus,
};
pub use workspace::{
    Workspace, WorkspaceError, DEFAULT_APARTMENT_COUNT, DEFAULT_NAMESPACE, DEFAULT_WORKSPACE,
};
