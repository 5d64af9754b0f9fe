use std::fmt;
use std::ops::Range;

#[derive(Debug)]
pub enum ToneError {
    Config(ConfigError),
    Melody(MelodyError),
    Budget(BudgetError),
    Json(serde_json::Error),
    Io(std::io::Error),
}

/// A configuration value outside its accepted range.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    FrequencyOutOfRange { name: &'static str, value: f64, min: f64, max: f64 },
    InvalidDuration { name: &'static str, value: f64 },
    NotPositive { name: &'static str, value: f64 },
    Negative { name: &'static str, value: f64 },
    InvertedRange { name: &'static str, min: f64, max: f64 },
    Empty { name: &'static str },
}

/// An input character the letter-to-pitch table cannot render.
#[derive(Debug, Clone, PartialEq)]
pub struct MelodyError {
    pub ch: char,
    /// Index of the offending char in the sentence.
    pub index: usize,
    /// Byte span of the offending char, for diagnostics.
    pub span: Range<usize>,
}

/// Worst-case amplitude of a configuration exceeds the 16-bit range.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetError {
    pub variant: &'static str,
    pub peak: f64,
    pub limit: f64,
}

impl fmt::Display for ToneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToneError::Config(e) => write!(f, "Configuration error: {e}"),
            ToneError::Melody(e) => write!(f, "Melody error: {e}"),
            ToneError::Budget(e) => write!(f, "Amplitude budget error: {e}"),
            ToneError::Json(e) => write!(f, "Config file error: {e}"),
            ToneError::Io(e) => write!(f, "Output error: {e}"),
        }
    }
}

impl std::error::Error for ToneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ToneError::Json(e) => Some(e),
            ToneError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FrequencyOutOfRange { name, value, min, max } => {
                write!(f, "{name} = {value} Hz is outside [{min}, {max}] Hz")
            }
            ConfigError::InvalidDuration { name, value } => {
                write!(f, "{name} = {value} must be a positive, finite duration")
            }
            ConfigError::NotPositive { name, value } => {
                write!(f, "{name} = {value} must be positive and finite")
            }
            ConfigError::Negative { name, value } => {
                write!(f, "{name} = {value} must be finite and not negative")
            }
            ConfigError::InvertedRange { name, min, max } => {
                write!(f, "{name} range is inverted: min {min} > max {max}")
            }
            ConfigError::Empty { name } => write!(f, "{name} must not be empty"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl fmt::Display for MelodyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown letter '{}' at pos {}", self.ch, self.index)
    }
}

impl std::error::Error for MelodyError {}

impl fmt::Display for BudgetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} peak amplitude {:.1} exceeds the 16-bit limit {}",
            self.variant, self.peak, self.limit
        )
    }
}

impl std::error::Error for BudgetError {}

impl From<ConfigError> for ToneError {
    fn from(e: ConfigError) -> Self {
        ToneError::Config(e)
    }
}

impl From<MelodyError> for ToneError {
    fn from(e: MelodyError) -> Self {
        ToneError::Melody(e)
    }
}

impl From<BudgetError> for ToneError {
    fn from(e: BudgetError) -> Self {
        ToneError::Budget(e)
    }
}

impl From<serde_json::Error> for ToneError {
    fn from(e: serde_json::Error) -> Self {
        ToneError::Json(e)
    }
}

impl From<std::io::Error> for ToneError {
    fn from(e: std::io::Error) -> Self {
        ToneError::Io(e)
    }
}
