//! Typed settings read from the reconciled store
//!
//! Every field comes from exactly one store key with a documented default.
//! Malformed integers and non-canonical booleans fall back to the default;
//! each fallback is reported through `tracing` so it can be debugged without
//! changing the substituted value.

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::store::KeyValueStore;

/// Store keys read by [`Settings`].
pub mod keys {
    pub const FAST_LLM_MODEL: &str = "FAST_LLM_MODEL";
    pub const SMART_LLM_MODEL: &str = "SMART_LLM_MODEL";
    pub const FAST_TOKEN_LIMIT: &str = "FAST_TOKEN_LIMIT";
    pub const SMART_TOKEN_LIMIT: &str = "SMART_TOKEN_LIMIT";
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    pub const USE_AZURE: &str = "USE_AZURE";
    pub const OPENAI_AZURE_API_BASE: &str = "OPENAI_AZURE_API_BASE";
    pub const OPENAI_AZURE_API_VERSION: &str = "OPENAI_AZURE_API_VERSION";
    pub const OPENAI_AZURE_DEPLOYMENT_ID: &str = "OPENAI_AZURE_DEPLOYMENT_ID";
    pub const ELEVENLABS_API_KEY: &str = "ELEVENLABS_API_KEY";
    pub const USE_MAC_OS_TTS: &str = "USE_MAC_OS_TTS";
    pub const GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
    pub const CUSTOM_SEARCH_ENGINE_ID: &str = "CUSTOM_SEARCH_ENGINE_ID";
    pub const PINECONE_API_KEY: &str = "PINECONE_API_KEY";
    pub const PINECONE_ENV: &str = "PINECONE_ENV";
    pub const IMAGE_PROVIDER: &str = "IMAGE_PROVIDER";
    pub const HUGGINGFACE_API_TOKEN: &str = "HUGGINGFACE_API_TOKEN";
    pub const REDIS_HOST: &str = "REDIS_HOST";
    pub const REDIS_PORT: &str = "REDIS_PORT";
    pub const REDIS_PASSWORD: &str = "REDIS_PASSWORD";
    pub const WIPE_REDIS_ON_START: &str = "WIPE_REDIS_ON_START";
    pub const MEMORY_INDEX: &str = "MEMORY_INDEX";
    pub const MEMORY_BACKEND: &str = "MEMORY_BACKEND";
}

/// The only stored string that reads as boolean true.
pub const TRUE_TOKEN: &str = "True";

pub const DEFAULT_FAST_LLM_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_SMART_LLM_MODEL: &str = "gpt-4";
pub const DEFAULT_FAST_TOKEN_LIMIT: usize = 4000;
pub const DEFAULT_SMART_TOKEN_LIMIT: usize = 8000;
pub const DEFAULT_REDIS_HOST: &str = "localhost";
pub const DEFAULT_REDIS_PORT: u16 = 6379;
pub const DEFAULT_MEMORY_INDEX: &str = "auto-gpt";
pub const DEFAULT_MEMORY_BACKEND: &str = "local";

/// Where field values are looked up.
///
/// With `env_override` set, a variable already exported in the process
/// environment wins over the store entry of the same name.
#[derive(Debug, Clone, Copy)]
pub struct SettingsSource<'a> {
    store: &'a KeyValueStore,
    env_override: bool,
}

impl<'a> SettingsSource<'a> {
    pub fn new(store: &'a KeyValueStore, env_override: bool) -> Self {
        Self {
            store,
            env_override,
        }
    }

    pub fn store_only(store: &'a KeyValueStore) -> Self {
        Self::new(store, false)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        if self.env_override {
            if let Ok(value) = std::env::var(key) {
                return Some(value);
            }
        }
        self.store.get(key).map(str::to_string)
    }

    fn string(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse-or-default. Absent is silent, anything unparsable is logged.
    fn integer<T>(&self, key: &str, default: T) -> T
    where
        T: FromStr + Display + Copy,
    {
        let Some(raw) = self.get(key) else {
            return default;
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            debug!("{} is empty, using default {}", key, default);
            return default;
        }
        match trimmed.parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("{}={:?} is not a valid integer, using default {}", key, raw, default);
                default
            }
        }
    }

    /// True only for the exact [`TRUE_TOKEN`]; absent yields `default`.
    fn flag(&self, key: &str, default: bool) -> bool {
        let Some(raw) = self.get(key) else {
            return default;
        };
        if raw == TRUE_TOKEN {
            return true;
        }
        if !raw.is_empty() && raw != "False" {
            warn!("{}={:?} is not {:?}, reading it as false", key, raw, TRUE_TOKEN);
        }
        false
    }
}

/// One row of a settings listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingView {
    pub name: &'static str,
    pub value: Option<String>,
    pub secret: bool,
}

/// Typed runtime settings.
///
/// Setters only change the in-memory value; the store is written solely by
/// reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    debug_mode: bool,
    continuous_mode: bool,
    speak_mode: bool,

    fast_llm_model: String,
    smart_llm_model: String,
    fast_token_limit: usize,
    smart_token_limit: usize,

    openai_api_key: Option<String>,
    use_azure: bool,
    azure_api_base: Option<String>,
    azure_api_version: Option<String>,
    azure_deployment_id: Option<String>,

    elevenlabs_api_key: Option<String>,
    use_mac_os_tts: bool,

    google_api_key: Option<String>,
    custom_search_engine_id: Option<String>,

    pinecone_api_key: Option<String>,
    pinecone_region: Option<String>,

    image_provider: Option<String>,
    huggingface_api_token: Option<String>,

    redis_host: String,
    redis_port: u16,
    redis_password: String,
    wipe_redis_on_start: bool,
    memory_index: String,
    memory_backend: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_store(&KeyValueStore::new())
    }
}

impl Settings {
    /// Read settings from the store alone.
    pub fn from_store(store: &KeyValueStore) -> Self {
        Self::from_source(&SettingsSource::store_only(store))
    }

    pub fn from_source(source: &SettingsSource<'_>) -> Self {
        use keys::*;

        let use_azure = source.flag(USE_AZURE, false);
        let (azure_api_base, azure_api_version, azure_deployment_id) = if use_azure {
            (
                source.get(OPENAI_AZURE_API_BASE),
                source.get(OPENAI_AZURE_API_VERSION),
                source.get(OPENAI_AZURE_DEPLOYMENT_ID),
            )
        } else {
            (None, None, None)
        };

        Self {
            debug_mode: false,
            continuous_mode: false,
            speak_mode: false,

            fast_llm_model: source.string(FAST_LLM_MODEL, DEFAULT_FAST_LLM_MODEL),
            smart_llm_model: source.string(SMART_LLM_MODEL, DEFAULT_SMART_LLM_MODEL),
            fast_token_limit: source.integer(FAST_TOKEN_LIMIT, DEFAULT_FAST_TOKEN_LIMIT),
            smart_token_limit: source.integer(SMART_TOKEN_LIMIT, DEFAULT_SMART_TOKEN_LIMIT),

            openai_api_key: source.get(OPENAI_API_KEY),
            use_azure,
            azure_api_base,
            azure_api_version,
            azure_deployment_id,

            elevenlabs_api_key: source.get(ELEVENLABS_API_KEY),
            use_mac_os_tts: source.flag(USE_MAC_OS_TTS, false),

            google_api_key: source.get(GOOGLE_API_KEY),
            custom_search_engine_id: source.get(CUSTOM_SEARCH_ENGINE_ID),

            pinecone_api_key: source.get(PINECONE_API_KEY),
            pinecone_region: source.get(PINECONE_ENV),

            image_provider: source.get(IMAGE_PROVIDER),
            huggingface_api_token: source.get(HUGGINGFACE_API_TOKEN),

            redis_host: source.string(REDIS_HOST, DEFAULT_REDIS_HOST),
            redis_port: source.integer(REDIS_PORT, DEFAULT_REDIS_PORT),
            redis_password: source.string(REDIS_PASSWORD, ""),
            wipe_redis_on_start: source.flag(WIPE_REDIS_ON_START, true),
            memory_index: source.string(MEMORY_INDEX, DEFAULT_MEMORY_INDEX),
            memory_backend: source.string(MEMORY_BACKEND, DEFAULT_MEMORY_BACKEND),
        }
    }

    /// Every field as a listing row, in declaration order.
    pub fn view(&self) -> Vec<SettingView> {
        fn row(name: &'static str, value: Option<String>, secret: bool) -> SettingView {
            SettingView {
                name,
                value,
                secret,
            }
        }

        vec![
            row("debug_mode", Some(self.debug_mode.to_string()), false),
            row("continuous_mode", Some(self.continuous_mode.to_string()), false),
            row("speak_mode", Some(self.speak_mode.to_string()), false),
            row("fast_llm_model", Some(self.fast_llm_model.clone()), false),
            row("smart_llm_model", Some(self.smart_llm_model.clone()), false),
            row("fast_token_limit", Some(self.fast_token_limit.to_string()), false),
            row("smart_token_limit", Some(self.smart_token_limit.to_string()), false),
            row("openai_api_key", self.openai_api_key.clone(), true),
            row("use_azure", Some(self.use_azure.to_string()), false),
            row("azure_api_base", self.azure_api_base.clone(), false),
            row("azure_api_version", self.azure_api_version.clone(), false),
            row("azure_deployment_id", self.azure_deployment_id.clone(), false),
            row("elevenlabs_api_key", self.elevenlabs_api_key.clone(), true),
            row("use_mac_os_tts", Some(self.use_mac_os_tts.to_string()), false),
            row("google_api_key", self.google_api_key.clone(), true),
            row("custom_search_engine_id", self.custom_search_engine_id.clone(), false),
            row("pinecone_api_key", self.pinecone_api_key.clone(), true),
            row("pinecone_region", self.pinecone_region.clone(), false),
            row("image_provider", self.image_provider.clone(), false),
            row("huggingface_api_token", self.huggingface_api_token.clone(), true),
            row("redis_host", Some(self.redis_host.clone()), false),
            row("redis_port", Some(self.redis_port.to_string()), false),
            row("redis_password", Some(self.redis_password.clone()), true),
            row("wipe_redis_on_start", Some(self.wipe_redis_on_start.to_string()), false),
            row("memory_index", Some(self.memory_index.clone()), false),
            row("memory_backend", Some(self.memory_backend.clone()), false),
        ]
    }

    // Runtime flags (no store key)

    pub fn debug_mode(&self) -> bool {
        self.debug_mode
    }

    pub fn set_debug_mode(&mut self, value: bool) {
        self.debug_mode = value;
    }

    pub fn continuous_mode(&self) -> bool {
        self.continuous_mode
    }

    pub fn set_continuous_mode(&mut self, value: bool) {
        self.continuous_mode = value;
    }

    pub fn speak_mode(&self) -> bool {
        self.speak_mode
    }

    pub fn set_speak_mode(&mut self, value: bool) {
        self.speak_mode = value;
    }

    // Models

    pub fn fast_llm_model(&self) -> &str {
        &self.fast_llm_model
    }

    pub fn set_fast_llm_model(&mut self, value: impl Into<String>) {
        self.fast_llm_model = value.into();
    }

    pub fn smart_llm_model(&self) -> &str {
        &self.smart_llm_model
    }

    pub fn set_smart_llm_model(&mut self, value: impl Into<String>) {
        self.smart_llm_model = value.into();
    }

    pub fn fast_token_limit(&self) -> usize {
        self.fast_token_limit
    }

    pub fn set_fast_token_limit(&mut self, value: usize) {
        self.fast_token_limit = value;
    }

    pub fn smart_token_limit(&self) -> usize {
        self.smart_token_limit
    }

    pub fn set_smart_token_limit(&mut self, value: usize) {
        self.smart_token_limit = value;
    }

    // Primary provider

    pub fn openai_api_key(&self) -> Option<&str> {
        self.openai_api_key.as_deref()
    }

    pub fn set_openai_api_key(&mut self, value: impl Into<String>) {
        self.openai_api_key = Some(value.into());
    }

    pub fn use_azure(&self) -> bool {
        self.use_azure
    }

    pub fn set_use_azure(&mut self, value: bool) {
        self.use_azure = value;
    }

    /// Only populated from the store when `use_azure` was true at load.
    pub fn azure_api_base(&self) -> Option<&str> {
        self.azure_api_base.as_deref()
    }

    pub fn set_azure_api_base(&mut self, value: impl Into<String>) {
        self.azure_api_base = Some(value.into());
    }

    pub fn azure_api_version(&self) -> Option<&str> {
        self.azure_api_version.as_deref()
    }

    pub fn set_azure_api_version(&mut self, value: impl Into<String>) {
        self.azure_api_version = Some(value.into());
    }

    pub fn azure_deployment_id(&self) -> Option<&str> {
        self.azure_deployment_id.as_deref()
    }

    pub fn set_azure_deployment_id(&mut self, value: impl Into<String>) {
        self.azure_deployment_id = Some(value.into());
    }

    // Speech

    pub fn elevenlabs_api_key(&self) -> Option<&str> {
        self.elevenlabs_api_key.as_deref()
    }

    pub fn set_elevenlabs_api_key(&mut self, value: impl Into<String>) {
        self.elevenlabs_api_key = Some(value.into());
    }

    pub fn use_mac_os_tts(&self) -> bool {
        self.use_mac_os_tts
    }

    pub fn set_use_mac_os_tts(&mut self, value: bool) {
        self.use_mac_os_tts = value;
    }

    // Search

    pub fn google_api_key(&self) -> Option<&str> {
        self.google_api_key.as_deref()
    }

    pub fn set_google_api_key(&mut self, value: impl Into<String>) {
        self.google_api_key = Some(value.into());
    }

    pub fn custom_search_engine_id(&self) -> Option<&str> {
        self.custom_search_engine_id.as_deref()
    }

    pub fn set_custom_search_engine_id(&mut self, value: impl Into<String>) {
        self.custom_search_engine_id = Some(value.into());
    }

    // Vector memory

    pub fn pinecone_api_key(&self) -> Option<&str> {
        self.pinecone_api_key.as_deref()
    }

    pub fn set_pinecone_api_key(&mut self, value: impl Into<String>) {
        self.pinecone_api_key = Some(value.into());
    }

    pub fn pinecone_region(&self) -> Option<&str> {
        self.pinecone_region.as_deref()
    }

    pub fn set_pinecone_region(&mut self, value: impl Into<String>) {
        self.pinecone_region = Some(value.into());
    }

    // Images

    pub fn image_provider(&self) -> Option<&str> {
        self.image_provider.as_deref()
    }

    pub fn set_image_provider(&mut self, value: impl Into<String>) {
        self.image_provider = Some(value.into());
    }

    pub fn huggingface_api_token(&self) -> Option<&str> {
        self.huggingface_api_token.as_deref()
    }

    pub fn set_huggingface_api_token(&mut self, value: impl Into<String>) {
        self.huggingface_api_token = Some(value.into());
    }

    // Memory backend

    pub fn redis_host(&self) -> &str {
        &self.redis_host
    }

    pub fn set_redis_host(&mut self, value: impl Into<String>) {
        self.redis_host = value.into();
    }

    pub fn redis_port(&self) -> u16 {
        self.redis_port
    }

    pub fn set_redis_port(&mut self, value: u16) {
        self.redis_port = value;
    }

    pub fn redis_password(&self) -> &str {
        &self.redis_password
    }

    pub fn set_redis_password(&mut self, value: impl Into<String>) {
        self.redis_password = value.into();
    }

    pub fn wipe_redis_on_start(&self) -> bool {
        self.wipe_redis_on_start
    }

    pub fn set_wipe_redis_on_start(&mut self, value: bool) {
        self.wipe_redis_on_start = value;
    }

    pub fn memory_index(&self) -> &str {
        &self.memory_index
    }

    pub fn set_memory_index(&mut self, value: impl Into<String>) {
        self.memory_index = value.into();
    }

    pub fn memory_backend(&self) -> &str {
        &self.memory_backend
    }

    pub fn set_memory_backend(&mut self, value: impl Into<String>) {
        self.memory_backend = value.into();
    }
}
