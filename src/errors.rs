#[derive(Debug, Error)]
/// An error occurred while shutting down a background role loop.
pub enum ShutdownError {
	#[error("I/O error: {0}")]
	/// The loop terminated with a transport error.
	IoError(#[from] std::io::Error),

	#[error("The loop thread panicked")]
	/// The loop thread panicked and could not be joined cleanly.
	ThreadPanic,
}
