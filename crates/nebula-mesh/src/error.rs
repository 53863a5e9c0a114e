//! Mesher-level error kinds.
//!
//! Worker errors collapse to a single frame error surfaced by the
//! assembler; the previous frame's output may be re-submitted since the
//! renderer contract allows idempotent re-submit. No error state persists
//! across frames except a poisoned cache entry, cleared at the next frame
//! boundary unless `keep_cache_across_frames` is set.

use nebula_identity::VertexId;

use crate::collaborators::DisplacementError;

#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    /// Configuration rejected at construction, or carried through from the
    /// ambient config crate's own load/parse/validate failures.
    #[error(transparent)]
    Config(#[from] nebula_config::ConfigError),

    /// The injected displacement field reported failure while materializing
    /// `id`. Fatal for the frame that triggered it.
    #[error("displacement field failed for vertex {id:?}: {source}")]
    DisplacementFailed {
        id: VertexId,
        #[source]
        source: DisplacementError,
    },

    /// A producer panicked (or a prior `DisplacementFailed` poisoned this
    /// identity); the cache entry stays poisoned until `clear()`.
    #[error("vertex cache entry poisoned this frame")]
    CacheContention,
}
