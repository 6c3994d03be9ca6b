use thiserror::Error;

use crate::lifecycle::{Action, Phase};

/// Errors reading or writing a persisted control position.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("position json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid css length: {0:?}")]
    CssLength(String),
    #[error("stored placement has no usable anchor")]
    NoAnchor,
}

/// Errors decoding a message from the extension host.
#[derive(Error, Debug)]
pub enum MessagingError {
    #[error("malformed host message: {0}")]
    Json(#[from] serde_json::Error),
}

/// Rejected panel lifecycle operations. The phase is left unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("cannot {action:?} while {from:?}")]
    InvalidTransition { from: Phase, action: Action },
    #[error("result of request #{generation} is stale")]
    StaleResult { generation: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_css_length() {
        let e = StorageError::CssLength("12em".to_string());
        assert_eq!(e.to_string(), "invalid css length: \"12em\"");
    }

    #[test]
    fn test_error_display_no_anchor() {
        assert_eq!(
            StorageError::NoAnchor.to_string(),
            "stored placement has no usable anchor"
        );
    }

    #[test]
    fn test_error_display_invalid_transition() {
        let e = LifecycleError::InvalidTransition {
            from: Phase::Hidden,
            action: Action::ShowDetail,
        };
        assert_eq!(e.to_string(), "cannot ShowDetail while Hidden");
    }

    #[test]
    fn test_error_display_stale() {
        let e = LifecycleError::StaleResult { generation: 3 };
        assert_eq!(e.to_string(), "result of request #3 is stale");
    }

    #[test]
    fn test_error_from_json() {
        let err = serde_json::from_str::<u32>("nope").unwrap_err();
        let e: MessagingError = err.into();
        assert!(e.to_string().starts_with("malformed host message: "));
    }
}
