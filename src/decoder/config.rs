#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// Upper bound for null-terminated strings (terminator excluded); `None` is unbounded.
    pub max_null_terminated_len: Option<usize>,
    /// Quota armed right after construction; `0` is unlimited.
    pub initial_quota: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_null_terminated_len: None,
            initial_quota: 0,
        }
    }
}
