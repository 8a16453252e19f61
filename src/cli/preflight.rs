//! Pre-flight checks before operations that call remote collaborators.
//!
//! Validates that required credentials are present before starting
//! operations that would otherwise fail midway.

use crate::error::{ClipnestError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// One-shot question: needs every collaborator credential.
    Ask,
    /// The relay server: same requirements as Ask.
    Serve,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation) -> Result<()> {
    match operation {
        Operation::Ask | Operation::Serve => {
            check_env("OPENAI_API_KEY", "export OPENAI_API_KEY='sk-...'")?;
            check_env(
                "SUPABASE_URL",
                "export SUPABASE_URL='https://<project>.supabase.co'",
            )?;
            check_env(
                "SUPABASE_SERVICE_ROLE_KEY",
                "export SUPABASE_SERVICE_ROLE_KEY='...'",
            )?;
        }
    }
    Ok(())
}

/// Check that an environment variable is set and non-empty.
fn check_env(name: &str, hint: &str) -> Result<()> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(()),
        Ok(_) => Err(ClipnestError::Config(format!(
            "{} is empty. Set it with: {}",
            name, hint
        ))),
        Err(_) => Err(ClipnestError::Config(format!(
            "{} not set. Set it with: {}",
            name, hint
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_env_reports_missing_variable() {
        let err = check_env("CLIPNEST_TEST_UNSET_VAR", "export it").unwrap_err();
        assert!(matches!(err, ClipnestError::Config(_)));
        assert!(err.to_string().contains("CLIPNEST_TEST_UNSET_VAR"));
    }
}
