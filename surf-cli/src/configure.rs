use anyhow::Context;
use inquire::{CustomType, Text};
use surf_core::Config;

/// Prompt for each search setting, prefilled with the current value, then save.
pub fn run() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let language = config.geocoding.language.clone();
    config.geocoding.language = Text::new("Result language (e.g. en, de, fr):")
        .with_default(&language)
        .prompt()
        .context("Failed to read language")?;

    config.geocoding.count = CustomType::<u8>::new("Maximum locations per search:")
        .with_default(config.geocoding.count)
        .with_error_message("Please type a whole number")
        .prompt()
        .context("Failed to read result count")?;

    config.search.min_query_len = CustomType::<usize>::new("Minimum characters before searching:")
        .with_default(config.search.min_query_len)
        .with_error_message("Please type a whole number")
        .prompt()
        .context("Failed to read minimum query length")?;

    config.search.debounce_ms = CustomType::<u64>::new("Typing pause before searching (ms):")
        .with_default(config.search.debounce_ms)
        .with_error_message("Please type a whole number")
        .prompt()
        .context("Failed to read debounce interval")?;

    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}
