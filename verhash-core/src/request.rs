use crate::error::GenError;
use crate::manifest::{custom_output_name, DEFAULT_FILE_NAME, NO_VERSION};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputName {
    /// `file_hashes.txt`
    #[default]
    Default,
    /// User-chosen name, coerced to end with `.txt`.
    Custom(String),
}

/// Arguments for one manifest run, as collected by a front end.
#[derive(Clone, Debug)]
pub struct RunRequest {
    pub root: PathBuf,
    /// Directory the manifest is written into. `None` means the current directory.
    pub output_dir: Option<PathBuf>,
    pub output_name: OutputName,
    pub version_text: String,
    /// Ignore `version_text` and close the manifest with [`NO_VERSION`].
    pub only_hash: bool,
}

impl RunRequest {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            output_dir: None,
            output_name: OutputName::Default,
            version_text: String::new(),
            only_hash: false,
        }
    }

    pub fn with_version(mut self, text: impl Into<String>) -> Self {
        self.version_text = text.into();
        self
    }

    pub fn with_only_hash(mut self, only_hash: bool) -> Self {
        self.only_hash = only_hash;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn with_output_name(mut self, name: OutputName) -> Self {
        self.output_name = name;
        self
    }

    /// Check every argument before any file is created.
    pub fn validate(&self) -> Result<Job, GenError> {
        if self.root.as_os_str().is_empty() {
            return Err(GenError::invalid("please enter or select a directory path"));
        }
        if !self.root.is_dir() {
            return Err(GenError::invalid(format!(
                "'{}' is not a valid directory",
                self.root.display()
            )));
        }

        let file_name = match &self.output_name {
            OutputName::Default => DEFAULT_FILE_NAME.to_string(),
            OutputName::Custom(name) => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(GenError::invalid("filename cannot be empty"));
                }
                custom_output_name(name)
            }
        };
        let output = match &self.output_dir {
            Some(dir) => dir.join(&file_name),
            None => PathBuf::from(&file_name),
        };
        if output.is_dir() {
            return Err(GenError::invalid(format!(
                "output path '{}' is a directory",
                output.display()
            )));
        }

        let version_line = if self.only_hash {
            NO_VERSION.to_string()
        } else {
            let v = self.version_text.trim();
            if v.is_empty() {
                return Err(GenError::invalid("enter a version name or choose only-hash mode"));
            }
            v.to_string()
        };

        Ok(Job { root: self.root.clone(), output, version_line })
    }
}

/// A validated, immutable run description.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Job {
    pub root: PathBuf,
    pub output: PathBuf,
    pub version_line: String,
}

impl Job {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn output(&self) -> &Path {
        &self.output
    }
}
