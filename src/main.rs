use anyhow::Context;
use clap::{Parser, Subcommand};
use icongen::{Config, DEFAULT_WRITE_LIMIT, FetchConfig, Fetcher, Pipeline, Platform, fetch};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "icongen",
    version,
    author,
    about = "Build React and Vue icon component packages from SVG sources",
    long_about = "Build React and Vue icon component packages from SVG sources.\n\n\
    Every SVG under <source>/line and <source>/fill becomes a component module in \
    both ES module and CommonJS form, with type declarations, barrel indexes and \
    package manifests.\n\n\
    USAGE EXAMPLES:\n  \
      # Build the React package\n  \
      icongen build react\n\n  \
      # Build both packages into ./packages\n  \
      icongen build react vue --out ./packages\n\n  \
      # Download release 4.6.0 sources into ./src\n  \
      icongen fetch --version 4.6.0"
)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate component packages for one or more platforms
    Build {
        /// Platforms to build
        #[arg(value_enum, required = true, num_args = 1..)]
        platforms: Vec<CliPlatform>,

        /// Directory holding the line/ and fill/ SVG sources
        #[arg(short, long, default_value = "optimized", value_name = "PATH")]
        source: PathBuf,

        /// Directory the platform packages are created in
        #[arg(short, long, default_value = ".", value_name = "PATH")]
        out: PathBuf,

        /// Maximum number of simultaneous file writes
        #[arg(long, default_value_t = DEFAULT_WRITE_LIMIT)]
        limit: usize,

        /// Dry run (don't delete or write files)
        #[arg(long)]
        dry_run: bool,
    },

    /// Download a RemixIcon release and extract its SVG sources
    Fetch {
        /// Release version, e.g. 4.6.0 (prompted for when omitted)
        #[arg(long, value_name = "X.Y.Z")]
        version: Option<String>,

        /// Directory receiving the line/ and fill/ sources
        #[arg(long, default_value = "src", value_name = "PATH")]
        dest: PathBuf,

        /// Directory the downloaded archive is saved into
        #[arg(long, default_value = ".", value_name = "PATH")]
        archive_dir: PathBuf,

        /// Base URL releases are published under
        #[arg(long, default_value = fetch::DEFAULT_BASE_URL, value_name = "URL")]
        base_url: String,
    },
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliPlatform {
    React,
    Vue,
}

impl From<CliPlatform> for Platform {
    fn from(p: CliPlatform) -> Self {
        match p {
            CliPlatform::React => Self::React,
            CliPlatform::Vue => Self::Vue,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose)?;

    match cli.command {
        Command::Build {
            platforms,
            source,
            out,
            limit,
            dry_run,
        } => {
            let config = Config::builder()
                .platforms(platforms.into_iter().map(Platform::from))
                .source_dir(source)
                .output_dir(out)
                .write_limit(limit)
                .dry_run(dry_run)
                .build()
                .context("Failed to build configuration")?;

            let stats = Pipeline::new(config)
                .context("Failed to create pipeline")?
                .run()
                .await
                .context("Build failed")?;

            stats.print_summary();
        }
        Command::Fetch {
            version,
            dest,
            archive_dir,
            base_url,
        } => {
            let version = match version {
                Some(version) => version,
                None => fetch::prompt_version().context("Failed to read version")?,
            };

            let config = FetchConfig::builder()
                .version(version)
                .dest_dir(dest)
                .archive_dir(archive_dir)
                .base_url(base_url)
                .build()
                .context("Failed to build fetch configuration")?;

            // Download and archive failures are reported, not fatal.
            if let Err(e) = Fetcher::new(config).run().await {
                error!("{}", e);
            }
        }
    }

    Ok(())
}

fn setup_tracing(verbosity: u8) -> anyhow::Result<()> {
    let filter = match verbosity {
        0 => EnvFilter::new("icongen=info"),
        1 => EnvFilter::new("icongen=debug"),
        _ => EnvFilter::new("icongen=trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_thread_ids(false))
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_build_requires_a_platform() {
        let err = Cli::try_parse_from(["icongen", "build"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_build_rejects_unknown_platform() {
        let err = Cli::try_parse_from(["icongen", "build", "svelte"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn test_build_defaults() {
        let cli = Cli::try_parse_from(["icongen", "build", "react", "vue"]).unwrap();
        let Command::Build {
            platforms,
            source,
            out,
            limit,
            dry_run,
        } = cli.command
        else {
            panic!("expected build subcommand");
        };

        let platforms: Vec<Platform> = platforms.into_iter().map(Platform::from).collect();
        assert_eq!(platforms, vec![Platform::React, Platform::Vue]);
        assert_eq!(source, PathBuf::from("optimized"));
        assert_eq!(out, PathBuf::from("."));
        assert_eq!(limit, DEFAULT_WRITE_LIMIT);
        assert!(!dry_run);
    }

    #[test]
    fn test_fetch_version_is_optional() {
        let cli = Cli::try_parse_from(["icongen", "fetch"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Fetch { version: None, .. }
        ));
    }
}
