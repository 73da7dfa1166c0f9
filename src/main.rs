use trigon::{AppConfig, init_logging};

fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    init_logging(config.logging.clone());

    log::info!("// Set up our new world");
    log::info!("// And let's begin the");
    log::info!("\tSIMULATION");

    trigon::run(config)?;

    log::info!("// End from the loop. Bye bye~");
    Ok(())
}
