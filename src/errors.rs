//! Categorization of SSM service failures.
//!
//! The SDK surfaces failures as opaque error chains. A handler needs two
//! things from them: which kind of failure occurred and how that kind is
//! treated. The kind is recovered from the error text, where the service
//! error code reliably appears; the treatment is a fixed, total mapping
//! from kind to policy rather than a chain of type checks.

use once_cell::sync::Lazy;

/// Failure kinds the handlers distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Request was rejected due to rate limiting.
    Throttling,
    /// Caller lacks permission for the operation.
    AccessDenied,
    /// The addressed resource does not exist.
    NotFound,
    /// A resource with the same identity already exists.
    AlreadyExists,
    /// The request was malformed or semantically invalid.
    InvalidRequest,
    /// A service quota was exhausted.
    LimitExceeded,
    /// The service is temporarily unavailable.
    ServiceUnavailable,
    /// Connectivity failure before the service answered.
    Network,
    /// Service-side internal failure, or nothing more specific matched.
    Internal,
}

/// How a handler treats a failure of a given kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlingPolicy {
    /// Transient; the operation may be retried as-is.
    Retry,
    /// Caller or configuration error; report it and stop.
    FailAndReport,
    /// The resource is gone; surface missing state instead of an error.
    TreatAsMissing,
    /// The resource identity is taken; surface a conflict.
    TreatAsConflict,
}

/// Substring patterns identifying each failure kind in SDK error text.
///
/// Rows are checked in order; the throttling row must stay ahead of the
/// quota row so `RequestLimitExceeded` is not swallowed by `LimitExceeded`.
static ERROR_PATTERNS: Lazy<Vec<(ErrorKind, Vec<&'static str>)>> = Lazy::new(|| {
    vec![
        (
            ErrorKind::Throttling,
            vec![
                "ThrottlingException",
                "Throttling",
                "TooManyRequestsException",
                "RequestLimitExceeded",
                "RateExceeded",
                "TooManyUpdates",
            ],
        ),
        (
            ErrorKind::NotFound,
            vec![
                "DoesNotExistException",
                "AssociationDoesNotExist",
                "OpsMetadataNotFoundException",
                "ResourceNotFoundException",
                "InvalidResourceId",
                "NotFound",
            ],
        ),
        (
            ErrorKind::AlreadyExists,
            vec![
                "AlreadyExistsException",
                "AssociationAlreadyExists",
                "IdempotentParameterMismatch",
            ],
        ),
        (
            ErrorKind::LimitExceeded,
            vec![
                "LimitExceededException",
                "AssociationLimitExceeded",
                "ResourceLimitExceeded",
            ],
        ),
        (
            ErrorKind::AccessDenied,
            vec![
                "AccessDenied",
                "UnauthorizedOperation",
                "AuthFailure",
                "InvalidClientTokenId",
                "SignatureDoesNotMatch",
            ],
        ),
        (
            ErrorKind::InvalidRequest,
            vec![
                "ValidationException",
                "InvalidParameter",
                "InvalidSchedule",
                "InvalidTarget",
                "InvalidDocument",
                "InvalidOutputLocation",
                "OpsMetadataInvalidArgumentException",
                "UnsupportedOperatingSystem",
                "InvalidRequest",
            ],
        ),
        (
            ErrorKind::ServiceUnavailable,
            vec!["ServiceUnavailable", "Service Unavailable", "503"],
        ),
        (
            ErrorKind::Network,
            vec![
                "DispatchFailure",
                "connection",
                "Connection",
                "timeout",
                "timed out",
                "DNS",
                "socket",
            ],
        ),
        (
            ErrorKind::Internal,
            vec![
                "InternalServerError",
                "InternalServerException",
                "InternalError",
                "500",
            ],
        ),
    ]
});

/// Categorize an `anyhow`-wrapped SDK error.
///
/// The display form of SDK errors often collapses to "service error"; the
/// debug form carries the error code, so fall back to it in that case.
pub fn categorize(error: &anyhow::Error) -> ErrorKind {
    let display = error.to_string();
    let detail = if display.contains("service error") {
        format!("{:?}", error)
    } else {
        display
    };
    categorize_str(&detail)
}

/// Categorize an error's string representation.
pub fn categorize_str(detail: &str) -> ErrorKind {
    for (kind, patterns) in ERROR_PATTERNS.iter() {
        if patterns.iter().any(|pattern| detail.contains(pattern)) {
            return *kind;
        }
    }
    ErrorKind::Internal
}

/// The fixed treatment for each failure kind. Total over [`ErrorKind`].
pub fn policy_for(kind: ErrorKind) -> HandlingPolicy {
    match kind {
        ErrorKind::Throttling
        | ErrorKind::ServiceUnavailable
        | ErrorKind::Network
        | ErrorKind::Internal => HandlingPolicy::Retry,
        ErrorKind::NotFound => HandlingPolicy::TreatAsMissing,
        ErrorKind::AlreadyExists => HandlingPolicy::TreatAsConflict,
        ErrorKind::AccessDenied | ErrorKind::InvalidRequest | ErrorKind::LimitExceeded => {
            HandlingPolicy::FailAndReport
        }
    }
}

/// True when the failure kind is worth retrying.
pub fn is_retryable(kind: ErrorKind) -> bool {
    policy_for(kind) == HandlingPolicy::Retry
}

/// True when a failure means the resource is gone rather than broken.
pub fn is_missing(error: &anyhow::Error) -> bool {
    policy_for(categorize(error)) == HandlingPolicy::TreatAsMissing
}

/// Extract the service error code from error text, if one is present.
///
/// Handles the two shapes SDK errors show up in:
/// "AssociationDoesNotExist: no such association" and
/// `Error { code: "ValidationException", .. }` debug output.
pub fn extract_error_code(detail: &str) -> Option<String> {
    if let Some(pos) = detail.find(':') {
        let prefix = detail[..pos].trim();
        if prefix.ends_with("Exception")
            || prefix.ends_with("Error")
            || prefix.chars().next().is_some_and(|c| c.is_uppercase())
        {
            let code = prefix.rsplit("::").next().unwrap_or(prefix);
            if !code.is_empty() && code.len() < 50 {
                return Some(code.to_string());
            }
        }
    }

    if let Some(start) = detail.find("code:") {
        let after_code = &detail[start + 5..];
        if let Some(quote_start) = after_code.find('"') {
            let after_quote = &after_code[quote_start + 1..];
            if let Some(quote_end) = after_quote.find('"') {
                let code = &after_quote[..quote_end];
                if !code.is_empty() && code.len() < 50 {
                    return Some(code.to_string());
                }
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_throttling() {
        let kind = categorize_str("ThrottlingException: Rate exceeded");
        assert_eq!(kind, ErrorKind::Throttling);
        assert!(is_retryable(kind));
    }

    #[test]
    fn test_request_limit_is_throttling_not_quota() {
        assert_eq!(
            categorize_str("RequestLimitExceeded: too many requests"),
            ErrorKind::Throttling
        );
        assert_eq!(
            categorize_str("AssociationLimitExceeded: quota reached"),
            ErrorKind::LimitExceeded
        );
    }

    #[test]
    fn test_categorize_not_found() {
        for detail in [
            "AssociationDoesNotExist: no association exists",
            "DoesNotExistException: window is gone",
            "OpsMetadataNotFoundException: arn unknown",
            "InvalidResourceId: mw-000",
        ] {
            assert_eq!(categorize_str(detail), ErrorKind::NotFound);
        }
    }

    #[test]
    fn test_categorize_already_exists() {
        let kind = categorize_str("AssociationAlreadyExists: duplicate");
        assert_eq!(kind, ErrorKind::AlreadyExists);
        assert_eq!(policy_for(kind), HandlingPolicy::TreatAsConflict);
    }

    #[test]
    fn test_categorize_access_denied() {
        let kind = categorize_str("AccessDeniedException: not authorized");
        assert_eq!(kind, ErrorKind::AccessDenied);
        assert_eq!(policy_for(kind), HandlingPolicy::FailAndReport);
        assert!(!is_retryable(kind));
    }

    #[test]
    fn test_categorize_validation() {
        assert_eq!(
            categorize_str("ValidationException: 1 validation error detected"),
            ErrorKind::InvalidRequest
        );
        assert_eq!(
            categorize_str("InvalidSchedule: cron(bogus)"),
            ErrorKind::InvalidRequest
        );
    }

    #[test]
    fn test_categorize_network_and_unavailable() {
        assert!(is_retryable(categorize_str("DispatchFailure: connection refused")));
        assert!(is_retryable(categorize_str(
            "ServiceUnavailable: try again later"
        )));
    }

    #[test]
    fn test_unmatched_text_is_internal() {
        assert_eq!(categorize_str("something unexpected"), ErrorKind::Internal);
    }

    #[test]
    fn test_is_missing_on_anyhow_error() {
        let err = anyhow::anyhow!("AssociationDoesNotExist: nothing here");
        assert!(is_missing(&err));

        let err = anyhow::anyhow!("ThrottlingException: slow down");
        assert!(!is_missing(&err));
    }

    #[test]
    fn test_extract_error_code() {
        assert_eq!(
            extract_error_code("ThrottlingException: Rate exceeded"),
            Some("ThrottlingException".to_string())
        );
        assert_eq!(
            extract_error_code("code: \"ValidationException\""),
            Some("ValidationException".to_string())
        );
        assert_eq!(extract_error_code("no separator here"), None);
    }
}
