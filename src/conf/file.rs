use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default = "FileConfig::default_path")]
    pub path: PathBuf,
}

impl FileConfig {
    fn default_path() -> PathBuf {
        PathBuf::from("movies_100000.txt")
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
        }
    }
}
