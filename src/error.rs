use thiserror::Error;

/// Type alias for Result with BriefError
pub type Result<T> = std::result::Result<T, BriefError>;

/// Error taxonomy for the brief pipeline. Every variant's display string is
/// the message shown to the user when the pipeline enters its error state.
#[derive(Error, Debug)]
pub enum BriefError {
    /// Missing or invalid credentials - user must reconfigure
    #[error("Configuration error: {0}")]
    Config(String),

    /// The sign-in provider could not be reached
    #[error(
        "Google Sign-In is unavailable. It might be blocked by an ad-blocker or a network issue."
    )]
    LibraryUnavailable,

    /// An operation ran before its prerequisite setup
    #[error("{0} is not initialized. Please configure the app first.")]
    NotInitialized(&'static str),

    /// OAuth client or redirect configuration rejected by the provider
    #[error(
        "Sign-in failed: {0}. Double-check that your app's URL is added to BOTH \
         'Authorized JavaScript origins' AND 'Authorized redirect URIs' in the \
         Google Cloud Console."
    )]
    AuthMisconfigured(String),

    /// The user declined the consent prompt
    #[error("You have denied the permission request. Please try again and grant access to continue.")]
    AuthDenied,

    /// Any other sign-in failure
    #[error("Sign-in failed: {0}")]
    AuthFailed(String),

    /// The provider rejected our token; the local session has been cleared
    #[error("Your Gmail session has expired. Please sign in again.")]
    AuthExpired,

    /// Transient mail provider error
    #[error("Failed to fetch emails from Gmail: {0}")]
    FetchFailed(String),

    /// A legitimate empty result, surfaced as a retryable error state
    #[error("No new AI newsletters found in the last 2 days.")]
    NoRecentContent,

    /// Generation service, schema, or parse error
    #[error("Could not get a valid response from the AI. The content might be empty or restricted.")]
    GenerationFailed(String),

    /// IO error (config persistence)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
