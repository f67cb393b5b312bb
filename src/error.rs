use thiserror::Error;

/// Selection problems reported synchronously to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Select both locations")]
    IncompleteSelection,

    #[error("Pick different locations")]
    DuplicateSelection,

    #[error("Enter coordinates")]
    MissingCoordinates,
}

/// Ways a dispatched run can fail. Both variants revert the UI the same way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    /// The backend answered with `success: false`.
    #[error("backend reported failure: {}", .0.as_deref().unwrap_or("no message"))]
    Backend(Option<String>),

    /// The request never produced a decodable response.
    #[error("compute request failed: {0}")]
    Transport(String),
}

impl RunError {
    /// Text shown to the user: the server message when there is one.
    pub fn user_message(&self) -> String {
        match self {
            RunError::Backend(Some(msg)) if !msg.trim().is_empty() => format!("Error: {msg}"),
            RunError::Backend(_) => "Error: Unknown".into(),
            RunError::Transport(_) => "Error. Try again.".into(),
        }
    }
}
