use docbrief::errors::GatewayError;

#[test]
fn test_error_display_formats() {
    let cases = [
        (
            GatewayError::Extraction("empty file".to_string()),
            "Failed to extract text from document: empty file",
        ),
        (
            GatewayError::Backend("quota exceeded".to_string()),
            "Summarization backend call failed: quota exceeded",
        ),
        (
            GatewayError::Translation("retries exhausted".to_string()),
            "Failed to translate text: retries exhausted",
        ),
        (
            GatewayError::Configuration("OPENAI_API_KEY is not set".to_string()),
            "Invalid configuration: OPENAI_API_KEY is not set",
        ),
        (
            GatewayError::Prompt("exceeds maximum length".to_string()),
            "Invalid custom prompt: exceeds maximum length",
        ),
        (
            GatewayError::Http("connection refused".to_string()),
            "Failed to send HTTP request: connection refused",
        ),
    ];

    for (error, expected) in cases {
        assert_eq!(error.to_string(), expected);
    }
}

#[test]
fn test_errors_are_debuggable() {
    let error = GatewayError::Backend("boom".to_string());
    assert!(format!("{error:?}").contains("Backend"));
}
