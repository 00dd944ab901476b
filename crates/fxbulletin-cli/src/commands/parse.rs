use fxbulletin_core::BulletinParser;

use crate::cli::ParseArgs;
use crate::error::CliError;

use super::{bulletin_result, CommandResult};

pub async fn run(args: &ParseArgs) -> Result<CommandResult, CliError> {
    let raw = tokio::fs::read_to_string(&args.file).await?;
    tracing::debug!(path = %args.file.display(), bytes = raw.len(), "read bulletin file");

    let bulletin = BulletinParser::new().parse(&raw)?;
    bulletin_result(&bulletin, args.raw)
}
