//! The `readiness start` command.

use std::path::Path;

use anyhow::Result;

use readiness_core::model::Audience;

use super::Session;

pub async fn execute(
    subject: String,
    audience: Option<Audience>,
    config_path: Option<&Path>,
) -> Result<()> {
    let session = Session::open_with_catalog(config_path)?;
    let service = &session.service;

    let number = match audience {
        Some(audience) => service.start_attempt_for(&subject, audience).await?,
        None => service.start_attempt(&subject).await?,
    };
    let attempt = service.attempt(&subject, number).await?;

    println!(
        "Started attempt {number} of {} for {subject} ({} questions, {})",
        session.config.max_attempts,
        attempt.snapshot.len(),
        attempt.audience
    );
    println!(
        "Answer with: readiness answer --subject {subject} --attempt {number} --question <id> --option <label>"
    );

    Ok(())
}
