use std::path::{Path, PathBuf};

use log::debug;

use crate::SimulatorError;

/// Environment variable overriding the QSPICE executable location.
pub const QSPICE_EXE_ENV: &str = "SPICEKIT_QSPICE_EXE";

#[cfg(target_os = "windows")]
mod paths {
    /// Install locations in order of preference. `~` is the home directory.
    pub(crate) const QSPICE_CANDIDATES: &[&str] = &[
        "~/Qspice/QSPICE64.exe",
        "~/AppData/Local/Programs/Qspice/QSPICE64.exe",
        "C:/Program Files/QSPICE/QSPICE64.exe",
    ];
}

#[cfg(not(target_os = "windows"))]
mod paths {
    // QSPICE has no native build here and wine support is not reliable
    pub(crate) const QSPICE_CANDIDATES: &[&str] = &[];
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir().unwrap_or_default().join(rest),
        None => PathBuf::from(path),
    }
}

/// Where to find the simulator executable.
///
/// Resolution order: the explicit path, then [`QSPICE_EXE_ENV`], then the
/// platform's well-known install locations.
#[derive(Debug, Clone, Default)]
pub struct SimulatorConfig {
    executable: Option<PathBuf>,
    candidates: Option<Vec<PathBuf>>,
}

impl SimulatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }

    /// Replace the platform install locations searched as a last resort.
    pub fn with_candidates<I, P>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        self.candidates = Some(
            candidates
                .into_iter()
                .map(|p| expand_home(p.as_ref()))
                .collect(),
        );
        self
    }

    fn candidates(&self) -> Vec<PathBuf> {
        match &self.candidates {
            Some(candidates) => candidates.clone(),
            None => paths::QSPICE_CANDIDATES
                .iter()
                .map(|p| expand_home(p))
                .collect(),
        }
    }

    pub fn resolve(&self) -> Result<PathBuf, SimulatorError> {
        if let Some(exe) = &self.executable {
            return existing(exe);
        }
        if let Ok(exe) = std::env::var(QSPICE_EXE_ENV) {
            if !exe.is_empty() {
                debug!("Using simulator from {QSPICE_EXE_ENV}: {exe}");
                return existing(Path::new(&exe));
            }
        }
        let found = self.candidates().into_iter().find(|p| p.is_file());
        match found {
            Some(exe) => {
                debug!("Found QSPICE installed in {}", exe.display());
                Ok(exe)
            }
            None => Err(SimulatorError::NotFound),
        }
    }
}

fn existing(path: &Path) -> Result<PathBuf, SimulatorError> {
    if path.is_file() {
        Ok(path.to_path_buf())
    } else {
        Err(SimulatorError::MissingExecutable(path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn fake_exe(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, "").unwrap();
        path
    }

    #[test]
    fn test_expand_home() {
        let home = dirs::home_dir().unwrap_or_default();
        assert_eq!(expand_home("~/Qspice/QSPICE64.exe"), home.join("Qspice/QSPICE64.exe"));
        assert_eq!(
            expand_home("C:/Program Files/QSPICE/QSPICE64.exe"),
            PathBuf::from("C:/Program Files/QSPICE/QSPICE64.exe")
        );
    }

    #[test]
    #[serial]
    fn test_explicit_path_wins() {
        let dir = TempDir::new().unwrap();
        let explicit = fake_exe(&dir, "explicit.exe");
        let from_env = fake_exe(&dir, "env.exe");
        std::env::set_var(QSPICE_EXE_ENV, &from_env);

        let config = SimulatorConfig::new().with_executable(&explicit);
        assert_eq!(config.resolve().unwrap(), explicit);
        std::env::remove_var(QSPICE_EXE_ENV);
    }

    #[test]
    #[serial]
    fn test_env_var_before_candidates() {
        let dir = TempDir::new().unwrap();
        let from_env = fake_exe(&dir, "env.exe");
        let candidate = fake_exe(&dir, "candidate.exe");
        std::env::set_var(QSPICE_EXE_ENV, &from_env);

        let config = SimulatorConfig::new().with_candidates([candidate.to_string_lossy()]);
        assert_eq!(config.resolve().unwrap(), from_env);
        std::env::remove_var(QSPICE_EXE_ENV);
    }

    #[test]
    #[serial]
    fn test_first_existing_candidate() {
        std::env::remove_var(QSPICE_EXE_ENV);
        let dir = TempDir::new().unwrap();
        let second = fake_exe(&dir, "second.exe");
        let missing = dir.path().join("missing.exe");

        let config = SimulatorConfig::new()
            .with_candidates([missing.to_string_lossy(), second.to_string_lossy()]);
        assert_eq!(config.resolve().unwrap(), second);
    }

    #[test]
    #[serial]
    fn test_not_found() {
        std::env::remove_var(QSPICE_EXE_ENV);
        let config = SimulatorConfig::new().with_candidates(Vec::<String>::new());
        assert!(matches!(config.resolve(), Err(SimulatorError::NotFound)));

        let config = SimulatorConfig::new().with_executable("/nonexistent/QSPICE64.exe");
        assert!(matches!(
            config.resolve(),
            Err(SimulatorError::MissingExecutable(_))
        ));
    }
}
