use crate::{
    config::{BuildTarget, Config, ModuleFormat, Style, style_root},
    error::{Error, Result},
    gate::Gate,
    icon::IconRecord,
    loader::Loader,
    transform::{Transform, transform_for},
    writer::Writer,
};
use serde::Serialize;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

/// Statistics collected during a build.
#[derive(Debug, Clone, Serialize)]
pub struct BuildStats {
    /// Platforms that were built
    pub platforms: Vec<String>,

    /// Number of source icons per style
    pub icons: BTreeMap<String, usize>,

    /// Number of (platform, style, format) targets built
    pub targets: usize,

    /// Number of files produced (modules, declarations, indexes, manifests)
    pub files_generated: usize,

    /// Number of files actually written (zero in dry run mode)
    pub files_written: usize,

    /// Total execution time
    pub duration: Duration,

    /// Output directory path
    pub output_directory: String,
}

impl BuildStats {
    /// Prints a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n╔═══════════════════════════════════════════════════════╗");
        println!("║               Icon Build Summary                      ║");
        println!("╠═══════════════════════════════════════════════════════╣");
        println!("║ Platforms:            {:>24}        ║", self.platforms.join(", "));
        for (style, count) in &self.icons {
            println!("║   - {:<8} icons:    {:>8}                        ║", style, count);
        }
        println!("║                                                       ║");
        println!("║ Targets Built:        {:>8}                        ║", self.targets);
        println!("║ Files Generated:      {:>8}                        ║", self.files_generated);
        println!("║ Files Written:        {:>8}                        ║", self.files_written);
        println!("║ Output Directory:                                     ║");
        println!("║   {}", self.output_directory);
        println!("║                                                       ║");
        println!(
            "║ Total Time:           {:>8.2}s                     ║",
            self.duration.as_secs_f64()
        );
        println!("╚═══════════════════════════════════════════════════════╝\n");
    }
}

/// Manifest declaring how a package root resolves its modules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
struct Manifest {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    module_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    module: Option<&'static str>,
    side_effects: bool,
}

impl Manifest {
    /// Style root: CommonJS by default, pointing bundlers at the ESM build.
    const fn style_root(with_esm: bool) -> Self {
        Self {
            module_type: None,
            module: if with_esm { Some("./esm/index.js") } else { None },
            side_effects: false,
        }
    }

    /// `esm/` directory: marks every `.js` file inside as an ES module.
    const fn esm_root() -> Self {
        Self {
            module_type: Some("module"),
            module: None,
            side_effects: false,
        }
    }
}

/// Builds the icon component packages described by a [`Config`].
pub struct Pipeline {
    config: Config,
    loader: Loader,
    writer: Arc<Writer>,
}

impl Pipeline {
    /// Creates a new pipeline with the given configuration.
    ///
    /// The pipeline owns one [`Gate`] for its whole run, so independent
    /// pipelines never share a write budget.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration validation fails.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let loader = Loader::new(&config.source_dir)?;
        let writer = Arc::new(Writer::new(Arc::new(Gate::new(config.write_limit))));

        Ok(Self {
            config,
            loader,
            writer,
        })
    }

    /// Executes the build and returns statistics.
    ///
    /// # Process
    ///
    /// 1. **Clean**: Removes previous output under each `<platform>/<style>`
    /// 2. **Load**: Reads the SVG sources once per style
    /// 3. **Generate**: Transforms and writes every target concurrently,
    ///    together with the package manifests
    ///
    /// A failing file does not stop writes already in flight; the build
    /// reports the failure once everything has settled. Nothing is rolled
    /// back.
    ///
    /// # Errors
    ///
    /// Returns an error if a source directory cannot be read, cleaning
    /// fails, or any transform or write fails.
    #[instrument(skip(self), fields(platforms = ?self.config.platforms))]
    pub async fn run(self) -> Result<BuildStats> {
        let start_time = Instant::now();
        let output_root = self.config.output_dir.clone();
        let dry_run = self.config.dry_run;

        for platform in &self.config.platforms {
            info!("Building {} package...", platform);
        }

        if dry_run {
            warn!("Dry run mode enabled - skipping deletes and file writes");
        } else if self.config.clean {
            for &platform in &self.config.platforms {
                for &style in &self.config.styles {
                    clean_dir(&style_root(&output_root, platform, style)).await?;
                }
            }
        }

        let mut sources: BTreeMap<Style, Arc<[IconRecord]>> = BTreeMap::new();
        for &style in &self.config.styles {
            let icons = self.loader.load(style).await?;
            info!("Loaded {} {} icons", icons.len(), style);
            sources.insert(style, icons.into());
        }

        let targets = self.config.targets();
        let mut tasks = JoinSet::new();

        for &target in &targets {
            let icons = Arc::clone(&sources[&target.style]);
            tasks.spawn(build_target(
                Arc::clone(&self.writer),
                output_root.clone(),
                target,
                icons,
                dry_run,
            ));
        }

        let with_esm = self.config.formats.contains(&ModuleFormat::Esm);
        for &platform in &self.config.platforms {
            for &style in &self.config.styles {
                tasks.spawn(write_manifests(
                    Arc::clone(&self.writer),
                    style_root(&output_root, platform, style),
                    with_esm,
                    dry_run,
                ));
            }
        }

        let files_generated = drain(tasks).await?;
        let duration = start_time.elapsed();

        for platform in &self.config.platforms {
            info!("Finished building {} package.", platform);
        }
        info!(
            "✓ Generated {} files for {} targets in {:.2}s",
            files_generated,
            targets.len(),
            duration.as_secs_f64()
        );

        Ok(BuildStats {
            platforms: self
                .config
                .platforms
                .iter()
                .map(|p| p.name().to_owned())
                .collect(),
            icons: sources
                .iter()
                .map(|(style, icons)| (style.name().to_owned(), icons.len()))
                .collect(),
            targets: targets.len(),
            files_generated,
            files_written: if dry_run { 0 } else { files_generated },
            duration,
            output_directory: output_root.display().to_string(),
        })
    }
}

/// Waits for every task and sums their file counts.
///
/// All tasks are awaited even after a failure so that in-flight work
/// settles before the error is reported.
async fn drain(mut tasks: JoinSet<Result<usize>>) -> Result<usize> {
    let mut files = 0;
    let mut errors = Vec::new();

    while let Some(joined) = tasks.join_next().await {
        match joined.unwrap_or_else(|e| Err(join_failure(e))) {
            Ok(count) => files += count,
            Err(e) => errors.push(e),
        }
    }

    if errors.is_empty() {
        Ok(files)
    } else {
        Err(Error::multiple(errors))
    }
}

fn join_failure(e: JoinError) -> Error {
    if e.is_panic() {
        std::panic::resume_unwind(e.into_panic());
    }
    Error::task(e)
}

/// Transforms and writes every icon of one target, then its indexes.
#[instrument(skip(writer, output_root, icons), fields(target = %target))]
async fn build_target(
    writer: Arc<Writer>,
    output_root: PathBuf,
    target: BuildTarget,
    icons: Arc<[IconRecord]>,
    dry_run: bool,
) -> Result<usize> {
    let transform = transform_for(target.platform);
    let out_dir = target.output_dir(&output_root);

    let mut writes: JoinSet<Result<usize>> = JoinSet::new();
    let mut errors = Vec::new();
    let mut planned = 0;

    for icon in icons.iter() {
        let files = match render_icon(transform, icon, target.format) {
            Ok(files) => files,
            Err(e) => {
                warn!("Skipping {}: {}", icon.component_name, e);
                errors.push(e);
                continue;
            }
        };

        for (extension, contents) in files {
            planned += 1;
            if dry_run {
                continue;
            }
            let path = out_dir.join(format!("{}.{extension}", icon.component_name));
            let writer = Arc::clone(&writer);
            writes.spawn(async move {
                writer
                    .write(&path, contents)
                    .await
                    .inspect_err(|e| warn!("{}", e))?;
                Ok(1)
            });
        }
    }

    if let Err(e) = drain(writes).await {
        errors.push(e);
    }
    if !errors.is_empty() {
        return Err(Error::multiple(errors));
    }

    let index = export_all(&icons, target.format, true);
    let index_types = export_all(&icons, ModuleFormat::Esm, false);
    if !dry_run {
        writer.write(&out_dir.join("index.js"), index).await?;
        writer.write(&out_dir.join("index.d.ts"), index_types).await?;
    }

    debug!(
        "Generated {} icon files in {}",
        planned,
        display_relative(&out_dir, &output_root)
    );

    Ok(planned + 2)
}

/// Module source and optional declaration for one icon, keyed by extension.
fn render_icon(
    transform: &dyn Transform,
    icon: &IconRecord,
    format: ModuleFormat,
) -> Result<Vec<(&'static str, String)>> {
    let mut files = vec![("js", transform.transform(&icon.svg, &icon.component_name, format)?)];
    if let Some(types) = transform.type_declaration(&icon.component_name)? {
        files.push(("d.ts", types));
    }
    Ok(files)
}

/// One re-export line per icon, in module syntax for `format`.
#[must_use]
pub fn export_all(icons: &[IconRecord], format: ModuleFormat, include_extension: bool) -> String {
    let extension = if include_extension { ".js" } else { "" };
    icons
        .iter()
        .map(|icon| {
            let name = &icon.component_name;
            match format {
                ModuleFormat::Esm => {
                    format!("export {{ default as {name} }} from './{name}{extension}'")
                }
                ModuleFormat::Cjs => {
                    format!("module.exports.{name} = require(\"./{name}{extension}\")")
                }
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

async fn write_manifests(
    writer: Arc<Writer>,
    style_dir: PathBuf,
    with_esm: bool,
    dry_run: bool,
) -> Result<usize> {
    let mut manifests = vec![(style_dir.join("package.json"), Manifest::style_root(with_esm))];
    if with_esm {
        manifests.push((style_dir.join("esm/package.json"), Manifest::esm_root()));
    }

    if !dry_run {
        for (path, manifest) in &manifests {
            writer.write_json(path, manifest).await?;
        }
    }

    Ok(manifests.len())
}

/// Removes everything inside `dir`, keeping the directory itself.
async fn clean_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        return Ok(());
    }

    debug!("Cleaning {}", dir.display());
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| {
            let path = e.path().map_or_else(|| dir.to_path_buf(), Path::to_path_buf);
            Error::io(path, std::io::Error::other(e.to_string()))
        })?;

        let path = entry.path();
        let removed = if entry.file_type().is_dir() {
            tokio::fs::remove_dir_all(path).await
        } else {
            tokio::fs::remove_file(path).await
        };
        removed.map_err(|e| Error::io(path, e))?;
    }

    Ok(())
}

fn display_relative(path: &Path, root: &Path) -> String {
    pathdiff::diff_paths(path, root)
        .unwrap_or_else(|| path.to_path_buf())
        .display()
        .to_string()
}
