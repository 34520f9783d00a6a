//! Size-query controller.
//!
//! While a query window is open, kernel dispatch reports the workspace each
//! candidate variant would need instead of running it. Closing the window
//! yields the largest request seen.

use super::error::WorkspaceError;

/// Query state of one handle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SizeQuery {
    #[default]
    Idle,
    Active { max_size: usize },
}

/// Effect of one request on the running maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeQueryOutcome {
    Increased,
    Unchanged,
}

impl SizeQuery {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    /// Running maximum of the open window.
    pub fn max_size(&self) -> Option<usize> {
        match *self {
            Self::Active { max_size } => Some(max_size),
            Self::Idle => None,
        }
    }

    /// Open a window. Windows do not nest; an open window is left untouched.
    pub fn start(&mut self) -> Result<(), WorkspaceError> {
        if self.is_active() {
            return Err(WorkspaceError::SizeQueryMismatch("size query already active"));
        }
        *self = Self::Active { max_size: 0 };
        Ok(())
    }

    pub fn request(&mut self, candidate: usize) -> Result<SizeQueryOutcome, WorkspaceError> {
        match self {
            Self::Active { max_size } if candidate > *max_size => {
                *max_size = candidate;
                Ok(SizeQueryOutcome::Increased)
            }
            Self::Active { .. } => Ok(SizeQueryOutcome::Unchanged),
            Self::Idle => Err(WorkspaceError::SizeQueryMismatch("no size query active")),
        }
    }

    /// Close the window and return the largest request.
    pub fn stop(&mut self) -> Result<usize, WorkspaceError> {
        let max_size = self
            .max_size()
            .ok_or(WorkspaceError::SizeQueryMismatch("no size query active"))?;
        *self = Self::Idle;
        Ok(max_size)
    }
}
