use anyhow::{bail, Context};
use serde_json::json;

use crate::auth;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::config;
use crate::database::DatabaseManager;
use crate::services::freelance::FreelanceService;
use crate::services::registration::RegistrationService;
use crate::services::storefront::StorefrontService;
use crate::services::tutoring::TutoringService;
use crate::types::Portal;

pub fn hash_password(password: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let hash = auth::hash_password(password)?;
    match output_format {
        OutputFormat::Json => output_success(&output_format, "Password hashed", Some(json!({ "hash": hash }))),
        OutputFormat::Text => {
            println!("{}", hash);
            Ok(())
        }
    }
}

/// Admin accounts are never created over HTTP; this is the only way in.
pub async fn create_admin(
    portal: Portal,
    name: String,
    email: Option<String>,
    password: Option<String>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let generated = password.is_none();
    let password = password.unwrap_or_else(auth::generate_password);

    let pool = DatabaseManager::connect(&config().database).await?;
    let id = match (portal, email.as_deref()) {
        (Portal::Registration, _) => RegistrationService::new(pool).create_admin(&name, &password).await?.id,
        (Portal::Tutoring, Some(email)) => TutoringService::new(pool).create_admin(&name, email, &password).await?.id,
        (Portal::Freelance, Some(email)) => FreelanceService::new(pool).create_admin(&name, email, &password).await?.id,
        (Portal::Store, Some(email)) => {
            StorefrontService::new(pool, &config().listing)
                .create_admin(&name, email, &password)
                .await?
                .id
        }
        (_, None) => bail!("--email is required for the {} portal", portal),
    };

    let mut details = json!({ "id": id, "portal": portal.as_str(), "name": name });
    if generated {
        details["password"] = json!(password);
    }
    output_success(&output_format, &format!("Created {} admin", portal), Some(details))
        .context("failed to print result")
}
