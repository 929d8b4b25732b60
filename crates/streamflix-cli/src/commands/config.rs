use super::Context;
use crate::output::{new_table, Output};
use crate::ConfigCommands;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use media_watch_config::{CatalogConfig, Config};
use media_watch_sources::ProviderRegistry;
use owo_colors::OwoColorize;
use serde_json::json;

pub async fn run_config(ctx: &Context, cmd: ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show => show_config(ctx, output),
        ConfigCommands::Init { force } => init_config(ctx, force, output),
        ConfigCommands::Validate => validate_config(ctx, output),
    }
}

fn show_config(ctx: &Context, output: &Output) -> Result<()> {
    let config = &ctx.config;
    let lists_file = config.lists_file(&ctx.paths);

    if !output.is_human() {
        output.json(&json!({
            "configFile": ctx.config_path,
            "configFileExists": ctx.config_path.exists(),
            "listsFile": lists_file,
            "logDir": ctx.paths.log_dir(),
            "providers": config.get_configured_providers(),
            "config": serde_json::to_value(config)?,
        }));
        return Ok(());
    }

    if !ctx.config_path.exists() {
        output.warn(format!(
            "Configuration file not found at: {} (using defaults)",
            ctx.config_path.display()
        ));
        output.info("Run 'streamflix config init' to create one.");
    }

    let mut paths = new_table(&["Location", "Path"]);
    paths.add_row(vec!["Config File".to_string(), ctx.config_path.display().to_string()]);
    paths.add_row(vec!["Lists File".to_string(), lists_file.display().to_string()]);
    paths.add_row(vec!["Log Directory".to_string(), ctx.paths.log_dir().display().to_string()]);
    output.heading("Configuration");
    output.table(&paths);

    let mut settings = new_table(&["Setting", "Value"]);
    settings.add_row(vec!["Subtitles".to_string(), flag(config.subtitles.enabled)]);
    settings.add_row(vec!["Subtitles for anime".to_string(), flag(config.subtitles.fetch_for_anime)]);
    settings.add_row(vec!["Strip caption markup".to_string(), flag(config.subtitles.strip_markup)]);
    settings.add_row(vec!["Log level".to_string(), config.logging.level.clone()]);
    if let Some(file) = &config.logging.file {
        settings.add_row(vec!["Log file".to_string(), file.display().to_string()]);
    }
    match &config.providers.catalog {
        Some(catalog) => {
            settings.add_row(vec!["Catalog provider".to_string(), flag(catalog.enabled)]);
            settings.add_row(vec!["Catalog path".to_string(), catalog.path.display().to_string()]);
        }
        None => {
            settings.add_row(vec!["Catalog provider".to_string(), "Not configured".bright_black().to_string()]);
        }
    }
    output.table(&settings);
    Ok(())
}

fn init_config(ctx: &Context, force: bool, output: &Output) -> Result<()> {
    if ctx.config_path.exists() && !force {
        output.warn(format!(
            "Configuration already exists at {}. Use --force to overwrite",
            ctx.config_path.display()
        ));
        return Ok(());
    }

    let mut config = Config::default();
    config.providers.catalog = Some(CatalogConfig {
        enabled: false,
        path: ctx.paths.data_dir().join("catalog.json"),
    });
    ctx.paths.ensure_directories().map_err(|e| eyre!("{}", e))?;
    config
        .save_to_file(&ctx.config_path)
        .map_err(|e| eyre!("Failed to write config to {}: {}", ctx.config_path.display(), e))?;

    output.success(format!("Wrote default configuration to {}", ctx.config_path.display()));
    Ok(())
}

fn validate_config(ctx: &Context, output: &Output) -> Result<()> {
    ctx.config.validate().map_err(|e| eyre!("Invalid configuration: {}", e))?;

    let registry = ProviderRegistry::new();
    registry
        .validate_all_configs(&ctx.config)
        .map_err(|e| eyre!("Invalid provider configuration: {}", e))?;

    let providers = ctx.config.get_configured_providers();
    if providers.is_empty() {
        output.warn("Configuration is valid, but no content provider is enabled");
    } else {
        output.success(format!("Configuration is valid (providers: {})", providers.join(", ")));
    }
    Ok(())
}

fn flag(enabled: bool) -> String {
    if enabled {
        "✓".green().to_string()
    } else {
        "✗".red().to_string()
    }
}
