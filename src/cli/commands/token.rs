use anyhow::{bail, Context};
use serde_json::json;
use uuid::Uuid;

use crate::auth::{generate_jwt, Claims};
use crate::cli::OutputFormat;
use crate::config::config;
use crate::types::Role;

pub fn handle(user: Uuid, role: Role, hours: Option<u64>, output_format: OutputFormat) -> anyhow::Result<()> {
    let security = &config().security;
    if security.jwt_secret.is_empty() {
        bail!("JWT_SECRET is not set");
    }

    let hours = hours.unwrap_or(security.jwt_expiry_hours);
    let claims = Claims::new(user, role, hours).context("invalid token lifetime")?;
    let token = generate_jwt(&claims, &security.jwt_secret).context("failed to sign token")?;

    match output_format {
        OutputFormat::Json => println!(
            "{}",
            json!({ "token": token, "user": user, "role": role, "expires_at": claims.exp })
        ),
        OutputFormat::Text => println!("{}", token),
    }
    Ok(())
}
