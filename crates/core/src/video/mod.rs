//! Video synthesis service.
//!
//! Video generation is a long-running job: [`VideoSynthesizer::submit`] returns a
//! [`JobHandle`], [`VideoSynthesizer::poll`] reports whether it finished, and
//! [`VideoSynthesizer::download`] fetches the produced media.

mod traits;
mod veo;

pub use traits::{
    JobHandle, JobStatus, MediaPayload, VideoJobRequest, VideoServiceError, VideoSynthesizer,
};
pub use veo::VeoClient;
