pub type RedirectionResult<T> = Result<T, RedirectionError>;

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum RedirectionError {
    #[error("invalid shift [{start}, {end}] by {delta}: {reason}")]
    InvalidShift {
        start: u64,
        end: u64,
        delta: i64,
        reason: &'static str,
    },

    #[error("invalid key range [{start}, {end}]")]
    InvalidRange { start: u64, end: u64 },

    #[error("invalid redirection control: {0}")]
    InvalidControl(String),
}
