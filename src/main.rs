use std::{net::TcpListener, sync::Arc, time::Duration};

use anyhow::Context;
use coupon_finder::{
    configuration::get_configuration,
    services::{CouponFinder, HttpFetcher, OpenaiClient, TokioSleeper},
    startup::run,
};
use env_logger::Env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration().context("Failed to read configuration.")?;

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener =
        TcpListener::bind(&address).with_context(|| format!("Failed to bind {}", address))?;

    let fetch_timeout = Duration::from_secs(configuration.scraper.fetch_timeout_secs);
    let fetcher = HttpFetcher::new(fetch_timeout).context("Failed to build page fetcher")?;
    let openai_client = OpenaiClient::new(&configuration.openai);

    let coupon_finder = CouponFinder::new(
        Arc::new(fetcher),
        Arc::new(openai_client),
        Arc::new(TokioSleeper),
    )
    .with_rules(configuration.scraper.scoring_rules())
    .with_limits(configuration.scraper.limits())
    .with_retry(configuration.openai.retry_policy());

    log::info!(
        "Listening on http://{} with model {}",
        address,
        configuration.openai.model
    );
    run(listener, coupon_finder, configuration.application)?.await?;

    Ok(())
}
