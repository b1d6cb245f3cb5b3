use crate::{
    config::Style,
    error::{Error, Result},
    icon::{IconRecord, component_name},
};
use globset::{Glob, GlobMatcher};
use ignore::WalkBuilder;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};
use tracing::{debug, trace, warn};

const SOURCE_PATTERN: &str = "*.svg";

/// Reads the optimized SVG sources of one style into [`IconRecord`]s.
#[derive(Debug, Clone)]
pub struct Loader {
    source_dir: PathBuf,
    matcher: GlobMatcher,
}

impl Loader {
    /// Creates a loader over `<source_dir>/<style>` directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the source glob cannot be compiled.
    pub fn new(source_dir: impl Into<PathBuf>) -> Result<Self> {
        let matcher = Glob::new(SOURCE_PATTERN)
            .map_err(|e| Error::config(format!("invalid source pattern: {e}")))?
            .compile_matcher();

        Ok(Self {
            source_dir: source_dir.into(),
            matcher,
        })
    }

    /// Directory holding the sources of `style`.
    #[must_use]
    pub fn style_dir(&self, style: Style) -> PathBuf {
        self.source_dir.join(style.name())
    }

    /// Loads every icon of `style`, sorted by file name.
    ///
    /// # Errors
    ///
    /// Returns an error if the style directory is missing, a source file
    /// cannot be read as UTF-8 text, or two files map to the same component
    /// name.
    pub async fn load(&self, style: Style) -> Result<Vec<IconRecord>> {
        let dir = self.style_dir(style);
        let paths = self.list(&dir)?;

        debug!("Loading {} {} icons from {}", paths.len(), style, dir.display());

        let mut icons = Vec::with_capacity(paths.len());
        let mut seen: HashMap<String, String> = HashMap::with_capacity(paths.len());
        for (file_name, path) in paths {
            let component = component_name(&file_name);
            if let Some(first) = seen.insert(component.clone(), file_name.clone()) {
                return Err(Error::config(format!(
                    "'{first}' and '{file_name}' in {} both map to component {component}",
                    dir.display()
                )));
            }

            let svg = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| Error::read(&path, e))?;
            trace!("Loaded {}", path.display());
            icons.push(IconRecord::new(&file_name, svg));
        }

        Ok(icons)
    }

    /// Lists the matching files directly inside `dir`.
    fn list(&self, dir: &Path) -> Result<Vec<(String, PathBuf)>> {
        let metadata = std::fs::metadata(dir).map_err(|e| Error::io(dir, e))?;
        if !metadata.is_dir() {
            return Err(Error::io(
                dir,
                std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory"),
            ));
        }

        let walker = WalkBuilder::new(dir)
            .standard_filters(false)
            .hidden(true)
            .max_depth(Some(1))
            .follow_links(true)
            .build();

        let mut files = Vec::new();
        for result in walker {
            let entry = result.map_err(|e| {
                Error::io(dir, std::io::Error::other(e.to_string()))
            })?;

            if entry.depth() == 0 || !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let Some(file_name) = entry.file_name().to_str().map(ToOwned::to_owned) else {
                warn!("Skipping non UTF-8 file name: {}", entry.path().display());
                continue;
            };

            if !self.matcher.is_match(&file_name) {
                debug!("Skipping non-SVG file: {}", entry.path().display());
                continue;
            }

            files.push((file_name, entry.into_path()));
        }

        // Directory listing order differs across platforms
        files.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(files)
    }
}
