use std::fs;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::{EditorError, Result};
use crate::parser::parse;
use crate::schematic::Schematic;

/// Extension every saved schematic gets.
pub const ASC_EXTENSION: &str = "asc";

/// A schematic bound to the file it was loaded from.
///
/// The mutation API lives on [`Schematic`] and is reachable through `Deref`.
/// Changes stay in memory until [`AscEditor::save`].
#[derive(Debug, Clone)]
pub struct AscEditor {
    path: PathBuf,
    schematic: Schematic,
}

fn load(path: &Path) -> Result<Schematic> {
    debug!("Reading ASC file {}", path.display());
    let content = fs::read_to_string(path).map_err(|e| EditorError::Read(path.to_path_buf(), e))?;
    Ok(parse(&content)?)
}

impl AscEditor {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let schematic = load(&path)?;
        info!(
            "Loaded {} ({} components, {} directives)",
            path.display(),
            schematic.components.len(),
            schematic.directives.len()
        );
        Ok(Self { path, schematic })
    }

    /// Discard in-memory changes and reload from disk.
    ///
    /// On failure the current model is left untouched.
    pub fn reset(&mut self) -> Result<()> {
        let fresh = load(&self.path)?;
        self.schematic = fresh;
        debug!("Reloaded {}", self.path.display());
        Ok(())
    }

    /// Write the schematic to `path`, forcing the `.asc` extension.
    /// Returns the path actually written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let target = path.as_ref().with_extension(ASC_EXTENSION);
        fs::write(&target, self.schematic.to_string())
            .map_err(|e| EditorError::Write(target.clone(), e))?;
        info!("Saved {}", target.display());
        Ok(target)
    }

    /// The file this editor was opened from.
    pub fn circuit_file(&self) -> &Path {
        &self.path
    }

    pub fn schematic(&self) -> &Schematic {
        &self.schematic
    }

    pub fn into_schematic(self) -> Schematic {
        self.schematic
    }
}

impl Deref for AscEditor {
    type Target = Schematic;

    fn deref(&self) -> &Schematic {
        &self.schematic
    }
}

impl DerefMut for AscEditor {
    fn deref_mut(&mut self) -> &mut Schematic {
        &mut self.schematic
    }
}
