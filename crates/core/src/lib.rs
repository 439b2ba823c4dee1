pub mod config;
pub mod gate;
mod http;
pub mod identity;
pub mod media;
pub mod orchestrator;
pub mod session;
pub mod style;
pub mod testing;
pub mod transform;
pub mod video;

pub use config::{
    load_config, load_config_from_str, load_config_or_default, validate_config, Config,
    ConfigError, GeminiConfig, IdentityConfig, SanitizedConfig,
};
pub use gate::{ApiKeyHandle, ConfiguredKeySelector, GateError, KeySelector};
pub use identity::{
    decode_token, FileTokenStore, IdentityError, MemoryTokenStore, TokenStore, UserIdentity,
};
pub use media::{Artifact, ImagePayload, MediaError, SourceImage};
pub use orchestrator::{
    CredentialGate, PollPolicy, RedesignConfig, RedesignError, RedesignOrchestrator,
    VideoFailure, VideoFailureKind, VideoJobState, VideoRef, VideoTourConfig,
    VideoTourOrchestrator, VideoTourPhase,
};
pub use session::{
    SessionController, SessionError, SessionEvent, SessionSnapshot, SessionUpdateCallback,
};
pub use style::{DesignStyle, UnknownStyle};
pub use transform::{GeminiImageClient, ImageTransformer, TransformError};
pub use video::{VeoClient, VideoServiceError, VideoSynthesizer};
