use serde::{Deserialize, Serialize};

/// Recognition language selector
///
/// A closed set; `Auto` lets the engine detect the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Automatic language detection
    #[default]
    Auto,
    /// English
    En,
    /// Chinese
    Zh,
    /// Spanish
    Es,
    /// French
    Fr,
    /// German
    De,
    /// Japanese
    Ja,
    /// Korean
    Ko,
}

impl Language {
    /// Language code sent to the engine
    pub fn code(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::En => "en",
            Self::Zh => "zh",
            Self::Es => "es",
            Self::Fr => "fr",
            Self::De => "de",
            Self::Ja => "ja",
            Self::Ko => "ko",
        }
    }
}

/// Recognition processing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingMode {
    /// Low-latency streaming recognition
    #[default]
    Streaming,
    /// Buffered recognition with higher accuracy
    Buffered,
    /// Streaming first pass with buffered refinement
    Hybrid,
}

/// Session configuration
///
/// Supplied by the caller and immutable for the engine session once started;
/// [`ConfigUpdate`] merges do not retroactively affect a live session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Recognition language
    pub language: Language,
    /// Processing mode
    pub mode: ProcessingMode,
    /// Whether to label speakers
    pub speaker_diarization: bool,
    /// Whether to apply noise reduction
    pub noise_reduction: bool,
    /// Whether the engine persists the audio artifact periodically
    pub auto_save: bool,
    /// Auto-save interval in minutes
    pub save_interval_min: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            language: Language::Auto,
            mode: ProcessingMode::Streaming,
            speaker_diarization: false,
            noise_reduction: true,
            auto_save: true,
            save_interval_min: 5,
        }
    }
}

impl SessionConfig {
    /// Set the language
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Set the processing mode
    pub fn with_mode(mut self, mode: ProcessingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Enable speaker diarization
    pub fn with_diarization(mut self) -> Self {
        self.speaker_diarization = true;
        self
    }

    /// Merge a partial update into this configuration
    pub fn apply(&mut self, update: &ConfigUpdate) {
        if let Some(language) = update.language {
            self.language = language;
        }
        if let Some(mode) = update.mode {
            self.mode = mode;
        }
        if let Some(speaker_diarization) = update.speaker_diarization {
            self.speaker_diarization = speaker_diarization;
        }
        if let Some(noise_reduction) = update.noise_reduction {
            self.noise_reduction = noise_reduction;
        }
        if let Some(auto_save) = update.auto_save {
            self.auto_save = auto_save;
        }
        if let Some(save_interval_min) = update.save_interval_min {
            self.save_interval_min = save_interval_min;
        }
    }
}

/// Partial configuration update
///
/// Unset fields leave the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigUpdate {
    pub language: Option<Language>,
    pub mode: Option<ProcessingMode>,
    pub speaker_diarization: Option<bool>,
    pub noise_reduction: Option<bool>,
    pub auto_save: Option<bool>,
    pub save_interval_min: Option<u32>,
}
