//! The `readiness answer` and `readiness progress` commands.

use std::path::Path;

use anyhow::Result;

use readiness_core::model::AttemptState;

use super::Session;

pub async fn execute(
    subject: String,
    attempt: u32,
    question: String,
    option: String,
    config_path: Option<&Path>,
) -> Result<()> {
    let session = Session::open(config_path)?;
    session
        .service
        .record_answer(&subject, attempt, &question, &option)
        .await?;

    let progress = session.service.progress(&subject, attempt).await?;
    println!(
        "Recorded {question} = {option} ({}/{} answered)",
        progress.answered, progress.total
    );
    Ok(())
}

pub async fn progress(subject: String, attempt: u32, config_path: Option<&Path>) -> Result<()> {
    let session = Session::open(config_path)?;
    let progress = session.service.progress(&subject, attempt).await?;

    println!(
        "Attempt {attempt} of {subject}: {}, {}/{} answered",
        progress.state, progress.answered, progress.total
    );
    if progress.state == AttemptState::InProgress && !progress.missing.is_empty() {
        println!("Missing: {}", progress.missing.join(", "));
    }
    Ok(())
}
