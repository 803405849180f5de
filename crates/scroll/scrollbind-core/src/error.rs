//! Error type shared by the animator and its collaborators.

pub type ScrollBindResult<T> = Result<T, ScrollBindError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ScrollBindError {
    /// `bind` was called before the observer plugin was registered.
    #[error("animator not initialized: call initialize() before bind()")]
    NotInitialized,

    /// The render engine refused or failed to load the animation source.
    #[error("render engine error: {0}")]
    Render(String),

    /// The scroll observer could not create or revert a subscription.
    #[error("scroll observer error: {0}")]
    Observer(String),

    /// Binding options could not be parsed.
    #[error("config error: {0}")]
    Config(String),
}

impl ScrollBindError {
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn observer(msg: impl Into<String>) -> Self {
        Self::Observer(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
