use std::fmt::{self, Display};

/// Error type returned by the editing operations.
///
/// Recoverable scanning and parsing problems are reported as
/// [`ScanError`](crate::ScanError) and [`ParseError`](crate::ParseError) values
/// instead; this type covers requests the library cannot carry out at all, such
/// as removing a value from an empty document, indexing into an object, or
/// applying overlapping edits.
///
/// When the error relates to a specific place in the input, `offset` holds the
/// byte offset and the message includes it.
///
/// # Example
///
/// ```rust
/// use limberjson::{modify, ModificationOptions};
///
/// let result = modify("", &[], None, &ModificationOptions::default());
///
/// match result {
///     Ok(edits) => println!("{} edits", edits.len()),
///     Err(e) => println!("error: {}", e),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct LimberJsonError {
    /// The error message, including position information if available.
    pub message: String,

    /// The byte offset in the input the error refers to, if applicable.
    pub offset: Option<usize>,
}

impl LimberJsonError {
    /// Creates a new error with an optional input offset.
    ///
    /// If an offset is provided, it is appended to the message in a
    /// human-readable format.
    pub fn new(message: impl Into<String>, offset: Option<usize>) -> Self {
        let message = message.into();
        let message = if let Some(off) = offset {
            format!("{} at offset {}", message, off)
        } else {
            message
        };
        Self { message, offset }
    }

    /// Creates a new error without position information.
    pub fn simple(message: impl Into<String>) -> Self {
        Self::new(message, None)
    }
}

impl Display for LimberJsonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for LimberJsonError {}
