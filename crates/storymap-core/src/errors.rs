use storymap_core_types::RequestId;
use thiserror::Error;

/// Result type alias using StoryMapError
pub type Result<T> = std::result::Result<T, StoryMapError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code usable for programmatic handling,
/// test assertions, and host responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Structural/Validation
    NotFound,
    AlreadyExists,
    CrossMergeRequest,
    CycleDetected,
    Validation,
    ConstraintViolation,

    // Policy
    PolicyDenied,

    // Integration/IO
    Io,
    Serialization,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::CrossMergeRequest => "ERR_CROSS_MERGE_REQUEST",
            ExErrorKind::CycleDetected => "ERR_CYCLE_DETECTED",
            ExErrorKind::Validation => "ERR_VALIDATION",
            ExErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            ExErrorKind::PolicyDenied => "ERR_POLICY_DENIED",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// HTTP status a host should answer with for this kind
    pub fn http_status_hint(&self) -> u16 {
        match self {
            ExErrorKind::NotFound => 404,
            ExErrorKind::AlreadyExists => 409,
            ExErrorKind::CrossMergeRequest
            | ExErrorKind::CycleDetected
            | ExErrorKind::Validation
            | ExErrorKind::Serialization => 400,
            ExErrorKind::ConstraintViolation | ExErrorKind::PolicyDenied => 422,
            ExErrorKind::Io | ExErrorKind::Internal => 500,
        }
    }
}

/// Canonical structured error type
///
/// Carries classification fields for programmatic handling plus the context
/// (operation, entity, request id) needed when reading logs.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    request_id: Option<RequestId>,
    message: String,
    source: Option<Box<ExError>>,
    details: Vec<String>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            request_id: None,
            message: String::new(),
            source: None,
            details: Vec::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Attach structured details (failed criteria, offending ids)
    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn http_status_hint(&self) -> u16 {
        self.kind.http_status_hint()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }

    pub fn details(&self) -> &[String] {
        &self.details
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if !self.details.is_empty() {
            write!(f, " [{}]", self.details.join(", "))?;
        }
        if let Some(request_id) = &self.request_id {
            write!(f, " (request_id: {})", request_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Error taxonomy for story map operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoryMapError {
    // ===== Lookup Errors =====
    #[error("Merge request not found: {mr_id}")]
    MergeRequestNotFound { mr_id: String },

    #[error("Story not found: {story_id}")]
    StoryNotFound { story_id: String },

    /// Target parent of a create or move does not exist
    #[error("Parent story not found: {parent_id}")]
    ParentNotFound { parent_id: String },

    #[error("Acceptance test not found: {test_id}")]
    TestNotFound { test_id: String },

    /// Host-supplied id collides with an existing record
    #[error("Entity already exists: {entity_id}")]
    AlreadyExists { entity_id: String },

    // ===== Structural Errors =====
    /// Parent lives under a different merge request than the story
    #[error(
        "Story {story_id} belongs to merge request {story_mr_id} but parent {parent_id} belongs to {parent_mr_id}"
    )]
    CrossMergeRequest {
        story_id: String,
        story_mr_id: String,
        parent_id: String,
        parent_mr_id: String,
    },

    #[error("Cycle detected: moving story {story_id} under {new_parent_id} would make it its own ancestor")]
    CycleDetected {
        story_id: String,
        new_parent_id: String,
    },

    // ===== Validation Errors =====
    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Block policy rejected the story after INVEST evaluation
    #[error("Story {story_id} rejected by INVEST policy: failed {failed:?}")]
    InvestRejected {
        story_id: String,
        failed: Vec<String>,
    },

    // ===== Invariant Violations =====
    #[error("Sibling order broken under {container}: story {story_id} has order {actual}, expected {expected}")]
    OrderNotContiguous {
        container: String,
        story_id: String,
        expected: u32,
        actual: u32,
    },

    #[error("Story {story_id} has depth {actual}, expected {expected}")]
    DepthMismatch {
        story_id: String,
        expected: u32,
        actual: u32,
    },

    #[error("Orphaned story {story_id}: parent {parent_id} does not exist")]
    OrphanedStory { story_id: String, parent_id: String },

    /// Parent/child or story/test links disagree in the two directions
    #[error("Membership inconsistent for {entity_id} in {container}: {reason}")]
    MembershipInconsistent {
        entity_id: String,
        container: String,
        reason: String,
    },

    // ===== Generic Errors =====
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl StoryMapError {
    pub(crate) fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        StoryMapError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<StoryMapError> for ExError {
    fn from(err: StoryMapError) -> Self {
        match err {
            StoryMapError::MergeRequestNotFound { mr_id } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(mr_id)
                .with_message("Merge request not found"),

            StoryMapError::StoryNotFound { story_id } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(story_id)
                .with_message("Story not found"),

            StoryMapError::ParentNotFound { parent_id } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(parent_id)
                .with_op("find_parent")
                .with_message("Parent story not found"),

            StoryMapError::TestNotFound { test_id } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(test_id)
                .with_message("Acceptance test not found"),

            StoryMapError::AlreadyExists { entity_id } => {
                ExError::new(ExErrorKind::AlreadyExists)
                    .with_entity_id(entity_id)
                    .with_message("Entity already exists")
            }

            StoryMapError::CrossMergeRequest {
                story_id,
                story_mr_id,
                parent_id,
                parent_mr_id,
            } => ExError::new(ExErrorKind::CrossMergeRequest)
                .with_entity_id(story_id)
                .with_message(format!(
                    "Story belongs to {} but parent {} belongs to {}",
                    story_mr_id, parent_id, parent_mr_id
                )),

            StoryMapError::CycleDetected {
                story_id,
                new_parent_id,
            } => ExError::new(ExErrorKind::CycleDetected)
                .with_entity_id(story_id)
                .with_message(format!(
                    "Moving under {} would create a cycle",
                    new_parent_id
                )),

            StoryMapError::Validation { field, reason } => ExError::new(ExErrorKind::Validation)
                .with_message(format!("Invalid {}: {}", field, reason)),

            StoryMapError::InvestRejected { story_id, failed } => {
                ExError::new(ExErrorKind::PolicyDenied)
                    .with_entity_id(story_id)
                    .with_message("Story rejected by INVEST block policy")
                    .with_details(failed)
            }

            StoryMapError::OrderNotContiguous {
                container,
                story_id,
                expected,
                actual,
            } => ExError::new(ExErrorKind::ConstraintViolation)
                .with_entity_id(story_id)
                .with_message(format!(
                    "Order {} under {} breaks contiguity (expected {})",
                    actual, container, expected
                )),

            StoryMapError::DepthMismatch {
                story_id,
                expected,
                actual,
            } => ExError::new(ExErrorKind::ConstraintViolation)
                .with_entity_id(story_id)
                .with_message(format!("Depth {} does not match expected {}", actual, expected)),

            StoryMapError::OrphanedStory {
                story_id,
                parent_id,
            } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(story_id)
                .with_message(format!("Parent {} does not exist", parent_id)),

            StoryMapError::MembershipInconsistent {
                entity_id,
                container,
                reason,
            } => ExError::new(ExErrorKind::ConstraintViolation)
                .with_entity_id(entity_id)
                .with_message(format!("Membership in {} inconsistent: {}", container, reason)),

            StoryMapError::Io { path, message } => ExError::new(ExErrorKind::Io)
                .with_entity_id(path)
                .with_message(message),

            StoryMapError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            StoryMapError::Internal { message } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}

impl From<serde_json::Error> for StoryMapError {
    fn from(err: serde_json::Error) -> Self {
        StoryMapError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for StoryMapError {
    fn from(err: toml::de::Error) -> Self {
        StoryMapError::Serialization {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_codes() {
        let cases = [
            (ExErrorKind::NotFound, "ERR_NOT_FOUND"),
            (ExErrorKind::CrossMergeRequest, "ERR_CROSS_MERGE_REQUEST"),
            (ExErrorKind::CycleDetected, "ERR_CYCLE_DETECTED"),
            (ExErrorKind::Validation, "ERR_VALIDATION"),
            (ExErrorKind::PolicyDenied, "ERR_POLICY_DENIED"),
        ];
        for (kind, expected_code) in cases {
            assert_eq!(kind.code(), expected_code, "Wrong code for {:?}", kind);
        }
    }

    #[test]
    fn test_http_status_hints() {
        assert_eq!(ExErrorKind::NotFound.http_status_hint(), 404);
        assert_eq!(ExErrorKind::Validation.http_status_hint(), 400);
        assert_eq!(ExErrorKind::CycleDetected.http_status_hint(), 400);
        assert_eq!(ExErrorKind::PolicyDenied.http_status_hint(), 422);
    }

    #[test]
    fn test_invest_rejected_carries_failed_criteria() {
        let err: ExError = StoryMapError::InvestRejected {
            story_id: "s1".to_string(),
            failed: vec!["small".to_string(), "testable".to_string()],
        }
        .into();

        assert_eq!(err.kind(), ExErrorKind::PolicyDenied);
        assert_eq!(err.entity_id(), Some("s1"));
        assert_eq!(err.details(), &["small".to_string(), "testable".to_string()]);
        assert!(err.to_string().contains("small, testable"));
    }

    #[test]
    fn test_request_id_is_displayed_last() {
        let err = ExError::new(ExErrorKind::Internal)
            .with_message("boom")
            .with_request_id(RequestId::from_string("req-1".to_string()));

        assert_eq!(err.request_id().map(|r| r.as_str()), Some("req-1"));
        assert_eq!(err.to_string(), "[ERR_INTERNAL]: boom (request_id: req-1)");
    }
}
