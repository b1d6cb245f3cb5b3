use crate::error::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};

const DEFAULT_SOURCE_DIR: &str = "optimized";
const DEFAULT_OUTPUT_DIR: &str = ".";

/// Ceiling on simultaneous write operations, sized well under common
/// file-descriptor limits.
pub const DEFAULT_WRITE_LIMIT: usize = 50;

/// UI framework the generated components target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Platform {
    /// React function components with forwarded refs
    React,
    /// Vue render functions
    Vue,
}

impl Platform {
    /// All supported platforms.
    pub const ALL: [Self; 2] = [Self::React, Self::Vue];

    /// Returns the package directory name for this platform.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::React => "react",
            Self::Vue => "vue",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Icon rendering variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Style {
    /// Outline icons
    Line,
    /// Solid icons
    Fill,
}

impl Style {
    /// All styles, in build order.
    pub const ALL: [Self; 2] = [Self::Line, Self::Fill];

    /// Returns the directory name for this style.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Fill => "fill",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Module packaging convention of the generated JavaScript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModuleFormat {
    /// ECMAScript modules (`import`/`export`)
    Esm,
    /// CommonJS (`require`/`module.exports`)
    Cjs,
}

impl ModuleFormat {
    /// All module formats.
    pub const ALL: [Self; 2] = [Self::Esm, Self::Cjs];

    /// Returns the short name for this format.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Esm => "esm",
            Self::Cjs => "cjs",
        }
    }
}

impl fmt::Display for ModuleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One generated package slice: a platform, a style and a module format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BuildTarget {
    /// Target framework
    pub platform: Platform,
    /// Icon style
    pub style: Style,
    /// Module format
    pub format: ModuleFormat,
}

impl BuildTarget {
    /// Creates a build target.
    #[must_use]
    pub const fn new(platform: Platform, style: Style, format: ModuleFormat) -> Self {
        Self {
            platform,
            style,
            format,
        }
    }

    /// Directory the target's modules are written to.
    ///
    /// CommonJS output sits at the style root; ESM output lives in an `esm/`
    /// subdirectory so the root manifest can point bundlers at it.
    #[must_use]
    pub fn output_dir(&self, output_root: &Path) -> PathBuf {
        let dir = style_root(output_root, self.platform, self.style);
        match self.format {
            ModuleFormat::Esm => dir.join("esm"),
            ModuleFormat::Cjs => dir,
        }
    }
}

impl fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.platform, self.style, self.format)
    }
}

/// Root directory of one style inside a platform package.
#[must_use]
pub fn style_root(output_root: &Path, platform: Platform, style: Style) -> PathBuf {
    output_root.join(platform.name()).join(style.name())
}

/// Configuration for the icon build pipeline.
///
/// Use [`Config::builder()`] to construct a new configuration.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Config {
    /// Platforms to build packages for
    pub platforms: Vec<Platform>,

    /// Directory holding `<style>/*.svg` sources
    pub source_dir: PathBuf,

    /// Directory the platform packages are created in
    pub output_dir: PathBuf,

    /// Styles to build
    pub styles: Vec<Style>,

    /// Module formats to build
    pub formats: Vec<ModuleFormat>,

    /// Maximum number of simultaneous write operations
    pub write_limit: usize,

    /// Delete previous style output before writing
    pub clean: bool,

    /// Dry run mode (no deletes, no writes)
    pub dry_run: bool,
}

impl Config {
    /// Creates a new configuration builder.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use icongen::{Config, Platform};
    ///
    /// let config = Config::builder()
    ///     .platform(Platform::React)
    ///     .source_dir("./optimized")
    ///     .build()
    ///     .expect("valid configuration");
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No platform, style or format is selected
    /// - The write limit is zero
    /// - The source directory doesn't exist or isn't a directory
    pub fn validate(&self) -> Result<()> {
        if self.platforms.is_empty() {
            return Err(Error::config("at least one platform must be selected"));
        }

        if self.styles.is_empty() {
            return Err(Error::config("at least one style must be selected"));
        }

        if self.formats.is_empty() {
            return Err(Error::config("at least one module format must be selected"));
        }

        if self.write_limit == 0 {
            return Err(Error::config("write_limit must be greater than 0"));
        }

        if !self.source_dir.exists() {
            return Err(Error::config(format!(
                "Source directory does not exist: {}",
                self.source_dir.display()
            )));
        }

        if !self.source_dir.is_dir() {
            return Err(Error::config(format!(
                "Source path is not a directory: {}",
                self.source_dir.display()
            )));
        }

        Ok(())
    }

    /// Every (platform, style, format) combination this configuration builds.
    #[must_use]
    pub fn targets(&self) -> Vec<BuildTarget> {
        let mut targets =
            Vec::with_capacity(self.platforms.len() * self.styles.len() * self.formats.len());
        for &platform in &self.platforms {
            for &style in &self.styles {
                for &format in &self.formats {
                    targets.push(BuildTarget::new(platform, style, format));
                }
            }
        }
        targets
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            platforms: Vec::new(),
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            styles: Style::ALL.to_vec(),
            formats: ModuleFormat::ALL.to_vec(),
            write_limit: DEFAULT_WRITE_LIMIT,
            clean: true,
            dry_run: false,
        }
    }
}

/// Builder for creating a [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    platforms: Vec<Platform>,
    source_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    styles: Option<Vec<Style>>,
    formats: Option<Vec<ModuleFormat>>,
    write_limit: Option<usize>,
    clean: Option<bool>,
    dry_run: bool,
}

impl ConfigBuilder {
    /// Adds a platform to build. Duplicates are ignored.
    #[must_use]
    pub fn platform(mut self, platform: Platform) -> Self {
        if !self.platforms.contains(&platform) {
            self.platforms.push(platform);
        }
        self
    }

    /// Adds several platforms to build.
    #[must_use]
    pub fn platforms(self, platforms: impl IntoIterator<Item = Platform>) -> Self {
        platforms.into_iter().fold(self, Self::platform)
    }

    /// Sets the directory holding the optimized SVG sources.
    #[must_use]
    pub fn source_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_dir = Some(path.into());
        self
    }

    /// Sets the directory the platform packages are written into.
    #[must_use]
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Restricts the build to the given styles.
    #[must_use]
    pub fn styles(mut self, styles: impl Into<Vec<Style>>) -> Self {
        self.styles = Some(styles.into());
        self
    }

    /// Restricts the build to the given module formats.
    #[must_use]
    pub fn formats(mut self, formats: impl Into<Vec<ModuleFormat>>) -> Self {
        self.formats = Some(formats.into());
        self
    }

    /// Sets the maximum number of simultaneous writes.
    #[must_use]
    pub fn write_limit(mut self, limit: usize) -> Self {
        self.write_limit = Some(limit);
        self
    }

    /// Enables or disables deleting previous output before the build.
    #[must_use]
    pub fn clean(mut self, enabled: bool) -> Self {
        self.clean = Some(enabled);
        self
    }

    /// Enables dry run mode (no file writes).
    #[must_use]
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn build(self) -> Result<Config> {
        let config = Config {
            platforms: self.platforms,
            source_dir: self
                .source_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE_DIR)),
            output_dir: self
                .output_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            styles: self.styles.unwrap_or_else(|| Style::ALL.to_vec()),
            formats: self.formats.unwrap_or_else(|| ModuleFormat::ALL.to_vec()),
            write_limit: self.write_limit.unwrap_or(DEFAULT_WRITE_LIMIT),
            clean: self.clean.unwrap_or(true),
            dry_run: self.dry_run,
        };

        config.validate()?;
        Ok(config)
    }
}
