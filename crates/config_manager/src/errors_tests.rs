use super::*;

#[test]
fn test_file_not_found_display() {
    let error = ConfigurationError::FileNotFound {
        path: "config/org.yml".to_string(),
    };
    assert_eq!(
        error.to_string(),
        "Configuration file not found: config/org.yml"
    );
}

#[test]
fn test_parse_error_display() {
    let error = ConfigurationError::ParseError {
        path: "config/teams.yml".to_string(),
        reason: "invalid type".to_string(),
    };
    assert!(error.to_string().contains("config/teams.yml"));
    assert!(error.to_string().contains("invalid type"));
}

#[test]
fn test_errors_are_comparable() {
    let a = ConfigurationError::FileNotFound {
        path: "x".to_string(),
    };
    let b = ConfigurationError::FileNotFound {
        path: "x".to_string(),
    };
    assert_eq!(a, b);
}
