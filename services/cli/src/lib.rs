mod cli;
mod demo;
mod infra;
mod replay;

use purchase_rewards::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
