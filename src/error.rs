use thiserror::Error;

use crate::percent::PercentError;
use crate::porosity::PorosityError;
use crate::volume_loader::VolumeLoaderError;

/// Startup failures. Any of these stops the server before it binds.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("failed to load CT volume: {0}")]
    Volume(#[from] VolumeLoaderError),

    #[error("failed to load percent stack: {0}")]
    Percent(#[from] PercentError),

    #[error("failed to load porosity table: {0}")]
    Porosity(#[from] PorosityError),

    #[error("percent stack shape {percent:?} does not match CT volume {ct:?}")]
    ShapeMismatch {
        ct: (usize, usize, usize),
        percent: (usize, usize, usize),
    },

    #[error("loader task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
