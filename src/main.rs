//! Rebate CLI
//!
//! Loads a fixture set and prints the discount outcome for each of its carts.
//!
//! Use `-f` to choose the fixture set and `-c` to resolve a single cart.

use std::io::{self, Write};

use anyhow::Result;
use rebate::{
    config::CliConfig, fixtures::Fixture, observability::init_subscriber,
    resolver::DiscountResolver, service::DiscountService,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = CliConfig::load()?;

    init_subscriber(&config.logging)?;

    let fixture = Fixture::from_set_in(&config.fixtures_dir, &config.fixture)?;

    let carts: Vec<String> = match &config.cart {
        Some(cart) => vec![cart.clone()],
        None => fixture.cart_names().into_iter().map(str::to_string).collect(),
    };

    let contexts = carts
        .iter()
        .map(|name| fixture.context(name).map(|context| (name, context)))
        .collect::<Result<Vec<_>, _>>()?;

    let service = DiscountService::new(fixture.into_registry(), DiscountResolver::new());

    info!(fixture = %config.fixture, carts = contexts.len(), "resolving carts");

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    for (name, context) in &contexts {
        let outcome = service.discounts_for(context).await?;

        writeln!(handle, "\n{name} ({})", context.channel())?;

        outcome.write_to(&mut handle)?;
    }

    Ok(())
}
