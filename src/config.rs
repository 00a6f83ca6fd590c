//! Runtime configuration for the REPL binary.
//!
//! Command-line flags take precedence over environment variables. The library
//! itself reads neither; everything it needs is passed in explicitly.

use crate::corpus::loader::CorpusSource;
use crate::corpus::types::Language;
use crate::enrichment::groq::DEFAULT_API_URL;
use crate::enrichment::translate::DEFAULT_TRANSLATE_URL;

pub const DEFAULT_DATA_LOCATION: &str = "./data";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Directory path or `http(s)://` base URL holding the knowledge-base files.
    pub data_location: String,
    pub language: Language,
    pub groq_api_key: Option<String>,
    pub groq_api_url: String,
    pub translate_url: String,
    pub ai_enabled: bool,
}

impl AppConfig {
    /// Reads the process arguments and environment.
    pub fn load() -> anyhow::Result<Self> {
        let args: Vec<String> = std::env::args().collect();
        Self::from_sources(&args, |key| std::env::var(key).ok())
    }

    /// Builds a config from `args` (including the program name at index 0) and an
    /// environment lookup.
    pub fn from_sources<F>(args: &[String], env: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut data_location: Option<String> = None;
        let mut language: Option<Language> = None;
        let mut no_ai = false;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--data" => {
                    data_location = Some(flag_value(args, i)?.to_string());
                    i += 2;
                }
                "--lang" => {
                    language = Some(flag_value(args, i)?.parse().map_err(anyhow::Error::msg)?);
                    i += 2;
                }
                "--no-ai" => {
                    no_ai = true;
                    i += 1;
                }
                other => {
                    tracing::warn!("Ignoring unknown argument '{}'", other);
                    i += 1;
                }
            }
        }

        let data_location = data_location
            .or_else(|| env("VEDIC_DATA"))
            .unwrap_or_else(|| DEFAULT_DATA_LOCATION.to_string());

        let language = match language {
            Some(language) => language,
            None => match env("VEDIC_LANG") {
                Some(value) => value.parse().map_err(anyhow::Error::msg)?,
                None => Language::DEFAULT,
            },
        };

        let groq_api_key = env("GROQ_API_KEY").filter(|key| !key.trim().is_empty());
        let groq_api_url = env("GROQ_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let translate_url = env("VEDIC_TRANSLATE_URL").unwrap_or_else(|| DEFAULT_TRANSLATE_URL.to_string());
        let ai_enabled = !no_ai && groq_api_key.is_some();

        Ok(Self {
            data_location,
            language,
            groq_api_key,
            groq_api_url,
            translate_url,
            ai_enabled,
        })
    }

    pub fn corpus_source(&self) -> CorpusSource {
        CorpusSource::from_location(&self.data_location)
    }
}

fn flag_value<'a>(args: &'a [String], i: usize) -> anyhow::Result<&'a str> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| anyhow::anyhow!("{} requires a value", args[i]))
}
