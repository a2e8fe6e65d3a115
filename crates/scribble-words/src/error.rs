/// Errors from loading or drawing from a word list.
#[derive(Debug, thiserror::Error)]
pub enum WordError {
    /// The list has no words, so no round can be started.
    #[error("word list is empty")]
    EmptyWordList,

    /// The word-list file could not be read.
    #[error("failed to read word list: {0}")]
    Io(#[from] std::io::Error),

    /// The word-list file is not a JSON array of strings.
    #[error("failed to parse word list: {0}")]
    Parse(#[from] serde_json::Error),
}
