// Propatch — Store Locator
// Finds the database file: an explicit path, the vendor's well-known install
// location, or whatever the operator picks when that location is missing.

use crate::atoms::constants::{PICKER_TITLE, PROGRAM_DATA_FALLBACK, STORE_FILE_NAME, VENDOR_DIR};
use crate::atoms::error::{PatchError, PatchResult};
use crate::atoms::traits::{PathPrompt, StoreLocator};
use log::{info, warn};
use std::cell::RefCell;
use std::ffi::OsString;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

// ── Path helpers ───────────────────────────────────────────────────────────

/// `<ProgramData>\Cold Turkey\data-app.db`, falling back to `C:\ProgramData`.
#[cfg_attr(not(windows), allow(dead_code))]
pub(crate) fn program_data_store_path(program_data: Option<OsString>) -> PathBuf {
    program_data
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(PROGRAM_DATA_FALLBACK))
        .join(VENDOR_DIR)
        .join(STORE_FILE_NAME)
}

/// Where Cold Turkey Blocker keeps its store on this platform, if anywhere.
pub fn default_store_path() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        let program_data = std::env::var_os(crate::atoms::constants::PROGRAM_DATA_ENV);
        Some(program_data_store_path(program_data))
    }
    #[cfg(not(windows))]
    {
        log::debug!("[locator] No default store location on this platform");
        None
    }
}

/// Accept `path` only if it is an existing regular file, and make it absolute.
fn existing_file(path: &Path) -> PatchResult<PathBuf> {
    if !path.is_file() {
        return Err(PatchError::open_failed(path, "not an existing regular file"));
    }
    Ok(path.canonicalize()?)
}

// ── Configuration ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct LocatorConfig {
    /// Checked first; skipped when absent or not a regular file.
    pub default_path: Option<PathBuf>,
    /// Fall back to the prompt when the default path is unusable.
    pub interactive: bool,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        LocatorConfig { default_path: default_store_path(), interactive: true }
    }
}

// ── Locators ───────────────────────────────────────────────────────────────

/// A path given up front (e.g. `--db`). No discovery, no prompt.
#[derive(Debug, Clone)]
pub struct FixedPathLocator(pub PathBuf);

impl StoreLocator for FixedPathLocator {
    fn locate(&self) -> PatchResult<PathBuf> {
        let path = existing_file(&self.0)?;
        info!("[locator] Using explicit store {:?}", path);
        Ok(path)
    }
}

/// Default install location first, then the operator's pick.
pub struct DefaultStoreLocator<P: PathPrompt> {
    config: LocatorConfig,
    prompt: P,
}

impl<P: PathPrompt> DefaultStoreLocator<P> {
    pub fn new(config: LocatorConfig, prompt: P) -> Self {
        DefaultStoreLocator { config, prompt }
    }
}

impl<P: PathPrompt> StoreLocator for DefaultStoreLocator<P> {
    fn locate(&self) -> PatchResult<PathBuf> {
        if let Some(default) = &self.config.default_path {
            if default.is_file() {
                info!("[locator] Using default store {:?}", default);
                return existing_file(default);
            }
            warn!("[locator] Default store {:?} not found", default);
        }

        if !self.config.interactive {
            return Err(PatchError::NoStoreSelected);
        }

        match self.prompt.choose(PICKER_TITLE)? {
            Some(chosen) => {
                let path = existing_file(&chosen)?;
                info!("[locator] Operator selected {:?}", path);
                Ok(path)
            }
            None => Err(PatchError::NoStoreSelected),
        }
    }
}

// ── Terminal picker ────────────────────────────────────────────────────────

/// Line-based file picker. Keeps asking until it gets an existing regular
/// file; an empty line or end of input cancels.
pub struct TerminalPrompt<R: BufRead, W: Write> {
    input: RefCell<R>,
    output: RefCell<W>,
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        TerminalPrompt { input: RefCell::new(input), output: RefCell::new(output) }
    }
}

impl TerminalPrompt<io::StdinLock<'static>, io::Stderr> {
    pub fn stdio() -> Self {
        TerminalPrompt::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> PathPrompt for TerminalPrompt<R, W> {
    fn choose(&self, title: &str) -> PatchResult<Option<PathBuf>> {
        let mut input = self.input.borrow_mut();
        let mut output = self.output.borrow_mut();
        writeln!(output, "{}", title)?;

        loop {
            write!(output, "Path (empty to cancel): ")?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            // Shells and "Copy as path" often wrap paths in quotes.
            let trimmed = line.trim().trim_matches('"').trim_matches('\'');
            if trimmed.is_empty() {
                return Ok(None);
            }

            let candidate = PathBuf::from(trimmed);
            if candidate.is_file() {
                return Ok(Some(candidate));
            }
            writeln!(output, "Not an existing file: {}", candidate.display())?;
        }
    }
}
