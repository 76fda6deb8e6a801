use serde::Deserialize;

use crate::args::OutputFormat;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub url: Option<String>,
    #[serde(alias = "concurrency")]
    pub goroutine_count: Option<usize>,
    pub duration: Option<String>,
    pub headers: Option<Vec<String>>,
    pub timeout: Option<String>,
    pub connect_timeout: Option<String>,
    pub grace: Option<String>,
    pub format: Option<OutputFormat>,
    pub verbose: Option<bool>,
}
