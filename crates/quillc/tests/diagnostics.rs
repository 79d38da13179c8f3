//! Reporting of internal errors. One test, since the suppression flag is
//! process-wide.

use quillc::diagnostics::{self, report_internal_error};
use quillc::InternalError;

#[test]
fn internal_errors_are_reported_and_returned() {
    assert!(diagnostics::diagnostics_enabled());
    {
        let _guard = diagnostics::suppress();
        assert!(!diagnostics::diagnostics_enabled());
        {
            let _inner = diagnostics::suppress();
            assert!(!diagnostics::diagnostics_enabled());
        }
        assert!(!diagnostics::diagnostics_enabled());

        let err = report_internal_error(
            Some("/work/src/hello.quill"),
            InternalError::unimplemented("numeric addition"),
            Some("generating hello.exe"),
        );
        assert_eq!(
            err.to_string(),
            "code generation for numeric addition is not implemented"
        );
        assert_eq!(
            err.downcast_ref::<InternalError>(),
            Some(&InternalError::Unimplemented {
                construct: "numeric addition".to_string()
            })
        );
    }
    assert!(diagnostics::diagnostics_enabled());
}
