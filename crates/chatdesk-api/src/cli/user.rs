//! User account CLI commands.

use anyhow::Result;
use console::style;

use chatdesk_types::user::{UserRole, UserStatus};

use crate::state::AppState;

/// Create an account directly in the local database.
///
/// This is the only way to create `admin` accounts; `POST /auth/register`
/// always creates `user` accounts.
///
/// # Examples
///
/// ```bash
/// chatdesk user create root --password s3cret --role admin
/// CHATDESK_USER_PASSWORD=s3cret chatdesk user create ana
/// ```
pub async fn create_user(
    state: &AppState,
    username: &str,
    password: &str,
    role: UserRole,
    json: bool,
) -> Result<()> {
    let user = state
        .auth_service
        .create_user(username, password, role, UserStatus::Offline)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&user)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Created {} '{}' (id {})",
        style("✓").green().bold(),
        user.role,
        style(&user.username).cyan(),
        style(user.id).bold()
    );
    println!();
    Ok(())
}
