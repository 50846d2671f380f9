use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
	#[error("Container is empty")]
	EmptyContainer,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_error_messages() {
		let err = QueueError::InvalidArgument("priority predicate is required".to_string());
		assert_eq!(err.to_string(), "Invalid argument: priority predicate is required");
		assert_eq!(QueueError::EmptyContainer.to_string(), "Container is empty");
	}
}
