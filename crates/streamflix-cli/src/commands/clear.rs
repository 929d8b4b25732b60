use super::Context;
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::fs;
use std::path::Path;

pub fn run_clear(ctx: &Context, lists: bool, logs: bool, output: &Output) -> Result<()> {
    if !lists && !logs {
        output.warn("No clear option specified. Use --lists, --logs, or --all");
        output.info("\nExample: streamflix clear --lists");
        return Ok(());
    }

    if lists {
        let lists_file = ctx.config.lists_file(&ctx.paths);
        let backup = lists_file.with_extension("json.bak");
        remove_file(&lists_file, "stored lists", output)?;
        remove_file(&backup, "lists backup", output)?;
    }

    if logs {
        let log_dir = ctx.paths.log_dir();
        if log_dir.exists() {
            fs::remove_dir_all(log_dir)
                .map_err(|e| eyre!("Failed to remove logs at {}: {}", log_dir.display(), e))?;
            output.success(format!("Cleared logs: {}", log_dir.display()));
        } else {
            output.info("No logs found to clear");
        }
    }

    Ok(())
}

fn remove_file(path: &Path, what: &str, output: &Output) -> Result<()> {
    if !path.exists() {
        output.info(format!("No {} found to clear", what));
        return Ok(());
    }
    fs::remove_file(path).map_err(|e| eyre!("Failed to remove {} at {}: {}", what, path.display(), e))?;
    output.success(format!("Cleared {}: {}", what, path.display()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use media_watch_config::{Config, PathManager};

    #[test]
    fn test_clear_lists_removes_backup_too() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PathManager::from_base(dir.path().to_path_buf());
        paths.ensure_directories().unwrap();
        let lists_file = paths.lists_file();
        fs::write(&lists_file, "{}").unwrap();
        fs::write(lists_file.with_extension("json.bak"), "{}").unwrap();
        fs::write(paths.log_dir().join("streamflix.log"), "line").unwrap();

        let ctx = Context {
            config_path: paths.config_file(),
            config: Config::default(),
            paths,
        };
        let output = Output::new(OutputFormat::Human, true);
        run_clear(&ctx, true, false, &output).unwrap();

        assert!(!lists_file.exists());
        assert!(!lists_file.with_extension("json.bak").exists());
        assert!(ctx.paths.log_dir().exists());

        run_clear(&ctx, false, true, &output).unwrap();
        assert!(!ctx.paths.log_dir().exists());
    }
}
