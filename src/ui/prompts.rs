//! Interactive prompts with CI/non-interactive fallback

use super::context::UiContext;
use crate::error::{CorekitError, CorekitResult};

/// Prompt for confirmation, returns default if non-interactive or auto-yes
pub async fn confirm(ctx: &UiContext, message: &str, default: bool) -> CorekitResult<bool> {
    if ctx.auto_yes() {
        println!("  {} (auto-approved)", message);
        return Ok(true);
    }

    if !ctx.is_interactive() {
        return Ok(default);
    }

    // cliclack prompts block, so run them off the async runtime
    let message = message.to_string();
    let result = tokio::task::spawn_blocking(move || {
        cliclack::confirm(&message)
            .initial_value(default)
            .interact()
    })
    .await
    .map_err(|e| CorekitError::Internal(format!("prompt task failed: {e}")))?;

    result.map_err(|e| CorekitError::User(format!("Prompt failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn non_interactive_returns_default() {
        let ctx = UiContext::non_interactive();
        assert!(!confirm(&ctx, "Clear cache?", false).await.unwrap());
        assert!(confirm(&ctx, "Clear cache?", true).await.unwrap());
    }

    #[tokio::test]
    async fn auto_yes_approves() {
        let ctx = UiContext::non_interactive().with_auto_yes(true);
        assert!(confirm(&ctx, "Clear cache?", false).await.unwrap());
    }
}
