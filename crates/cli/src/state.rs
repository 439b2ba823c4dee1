use std::sync::Arc;

use roomshift_core::{
    ApiKeyHandle, Config, ConfiguredKeySelector, FileTokenStore, GeminiImageClient,
    ImageTransformer, KeySelector, RedesignOrchestrator, SanitizedConfig, SessionController,
    VeoClient, VideoSynthesizer, VideoTourOrchestrator,
};

/// Shared application state: configuration and the service clients built from it.
pub struct AppState {
    config: Config,
    transformer: Arc<dyn ImageTransformer>,
    synthesizer: Arc<dyn VideoSynthesizer>,
    key_selector: Arc<dyn KeySelector>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        // The video client reads whatever key the selector picks.
        let key_handle = ApiKeyHandle::new();

        let transformer: Arc<dyn ImageTransformer> =
            Arc::new(GeminiImageClient::from_config(&config.gemini));
        let synthesizer: Arc<dyn VideoSynthesizer> =
            Arc::new(VeoClient::from_config(&config.gemini, key_handle.clone()));
        let key_selector: Arc<dyn KeySelector> = Arc::new(ConfiguredKeySelector::new(
            config.video_api_key().map(str::to_string),
            key_handle,
        ));

        Self {
            config,
            transformer,
            synthesizer,
            key_selector,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn key_selector(&self) -> Arc<dyn KeySelector> {
        Arc::clone(&self.key_selector)
    }

    pub fn redesigner(&self) -> RedesignOrchestrator {
        RedesignOrchestrator::new(self.config.redesign.clone(), Arc::clone(&self.transformer))
    }

    pub fn video_tour(&self) -> VideoTourOrchestrator {
        VideoTourOrchestrator::new(
            self.config.video.clone(),
            Arc::clone(&self.synthesizer),
            Arc::clone(&self.key_selector),
        )
    }

    /// A session whose identity token lives at `identity.token_path`.
    pub fn session(&self) -> SessionController {
        SessionController::new(
            self.redesigner(),
            self.video_tour(),
            self.key_selector(),
            Arc::new(FileTokenStore::new(self.config.identity.token_path.clone())),
        )
    }
}
