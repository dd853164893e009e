use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use remapdump_core::{find_dumps, read_image_metadata, remap_all, PathRecord};
use std::path::PathBuf;

/// Point crash dumps at a different build of their executable
#[derive(Parser, Debug)]
#[command(
    name = "remapdump",
    about = "Rewrite the module checksum, size, timestamp and path in every *.dmp file so it matches EXECUTABLE",
    version,
    author
)]
struct Cli {
    /// Executable the dumps should be symbolized against
    #[arg(required = true)]
    executable: PathBuf,

    /// Directory to scan for dumps (defaults to the current directory)
    #[arg(long)]
    dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let exe = cli.executable.display().to_string();
    let meta = read_image_metadata(&cli.executable)
        .with_context(|| format!("Failed to lookup checksum for exe '{exe}'"))?;
    log::debug!("{exe}: {meta}");

    let record = PathRecord::from_current_dir(&cli.executable)?;

    let dir = match cli.dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let dumps = find_dumps(&dir)
        .with_context(|| format!("Failed to list dumps in '{}'", dir.display()))?;

    for outcome in remap_all(dumps, &meta, &record) {
        let name = outcome
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| outcome.path.display().to_string());

        if outcome.is_success() {
            println!("{} {name} to {exe}", "Remapped".green());
        } else {
            println!("{}", format!("** Failed to remap {name}").red());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_exactly_one_executable() {
        let cli = Cli::try_parse_from(["remapdump", "game.exe"]).unwrap();
        assert_eq!(cli.executable, PathBuf::from("game.exe"));
        assert!(cli.dir.is_none());

        assert!(Cli::try_parse_from(["remapdump"]).is_err());
        assert!(Cli::try_parse_from(["remapdump", "a.exe", "b.exe"]).is_err());
    }

    #[test]
    fn accepts_scan_directory() {
        let cli = Cli::try_parse_from(["remapdump", "--dir", "crashes", "game.exe"]).unwrap();
        assert_eq!(cli.dir, Some(PathBuf::from("crashes")));
    }
}
