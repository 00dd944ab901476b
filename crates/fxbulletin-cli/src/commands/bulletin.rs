use fxbulletin_core::RateProvider;
use tokio_util::sync::CancellationToken;

use crate::cli::BulletinArgs;
use crate::error::CliError;

use super::{bulletin_result, CommandResult};

pub async fn run(
    args: &BulletinArgs,
    provider: &RateProvider,
    cancel: &CancellationToken,
) -> Result<CommandResult, CliError> {
    let bulletin = provider.latest_bulletin(cancel).await?;
    bulletin_result(&bulletin, args.raw)
}
