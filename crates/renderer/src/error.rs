use std::path::PathBuf;

use crate::shader::ShaderStage;

/// Upper bound on the diagnostic text kept from a compile or link log.
pub const INFO_LOG_LIMIT: usize = 511;

/// Errors surfaced by the renderer crate.
///
/// Every variant is detected right after the GL call (or file access) that
/// triggered it and handed back to the caller; nothing in this crate prints
/// and carries on.
#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    /// Window, display or GL context setup failed.
    #[error("failed to initialise graphics: {0}")]
    Initialization(String),
    /// A single shader stage was rejected by the driver's compiler.
    #[error("{stage} shader{} failed to compile:\n{log}", describe_origin(.origin))]
    ShaderCompile {
        stage: ShaderStage,
        log: String,
        /// File the source was read from, if any.
        origin: Option<PathBuf>,
    },
    /// The driver refused to link the attached stages.
    #[error("shader program failed to link:\n{log}")]
    ShaderLink { log: String },
    /// `link` was handed a shader in the wrong slot.
    #[error("expected a {expected} shader but got a {actual} shader")]
    StageMismatch {
        expected: ShaderStage,
        actual: ShaderStage,
    },
    /// The driver could not hand out a new object name.
    #[error("failed to allocate {object}: {reason}")]
    Allocation {
        object: &'static str,
        reason: String,
    },
    /// A shader, texture or other file could not be read or decoded.
    #[error("failed to load {}: {source}", path.display())]
    ResourceLoad {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Vertex or pixel data did not match its declared layout.
    #[error("invalid input data: {0}")]
    InvalidData(String),
}

impl RendererError {
    pub(crate) fn resource(
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::ResourceLoad {
            path: path.into(),
            source: source.into(),
        }
    }

    pub(crate) fn init(message: impl std::fmt::Display) -> Self {
        Self::Initialization(message.to_string())
    }
}

fn describe_origin(origin: &Option<PathBuf>) -> String {
    origin
        .as_ref()
        .map(|path| format!(" {}", path.display()))
        .unwrap_or_default()
}

pub type Result<T, E = RendererError> = std::result::Result<T, E>;

/// Trims driver output and caps it at [`INFO_LOG_LIMIT`] characters.
///
/// Drivers pad logs with trailing newlines and NULs; an empty log after
/// trimming is replaced by a placeholder so errors never carry blank text.
pub(crate) fn bounded_log(raw: &str) -> String {
    let trimmed = raw.trim_end_matches(['\0', '\n', '\r', ' ']);
    if trimmed.is_empty() {
        return "(driver returned no diagnostic log)".to_string();
    }
    match trimmed.char_indices().nth(INFO_LOG_LIMIT) {
        Some((cut, _)) => trimmed[..cut].to_string(),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_log_caps_long_output() {
        let raw = "e".repeat(2_000);
        assert_eq!(bounded_log(&raw).chars().count(), INFO_LOG_LIMIT);
    }

    #[test]
    fn bounded_log_respects_char_boundaries() {
        let raw = "é".repeat(600);
        let log = bounded_log(&raw);
        assert_eq!(log.chars().count(), INFO_LOG_LIMIT);
        assert!(log.chars().all(|ch| ch == 'é'));
    }

    #[test]
    fn bounded_log_strips_padding_and_fills_blank_logs() {
        assert_eq!(bounded_log("0:1(1): error\n\0"), "0:1(1): error");
        assert!(!bounded_log("\0\n").is_empty());
    }
}
