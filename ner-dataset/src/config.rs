//! Configuração em camadas do `ner-dataset`.
//!
//! `defaults/dataset.default.toml` é embutido no binário. Por cima dele o
//! [`Loader`] aplica arquivos TOML do usuário, variáveis de ambiente
//! `NER_DATASET__<SEÇÃO>__<CHAVE>` (ex: `NER_DATASET__SPLIT__SEED=42`) e
//! overrides pontuais, nesta ordem.

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat, ValueKind};
use serde::{Deserialize, Serialize};

use crate::align::AlignmentMode;
use crate::error::Result;
use crate::split::SplitRatios;

const DEFAULT_TOML: &str = include_str!("../defaults/dataset.default.toml");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub dataset: DatasetSettings,
    pub split: SplitSettings,
    pub annotation: AnnotationSettings,
    pub server: ServerSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSettings {
    /// Quantidade de documentos esperada por execução.
    pub target_size: usize,
    /// Diretório onde os splits e as estatísticas são gravados.
    pub output_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitSettings {
    pub train_percent: u32,
    pub dev_percent: u32,
    /// Semente do embaralhamento; ausente = não determinístico.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl SplitSettings {
    pub fn ratios(&self) -> Result<SplitRatios> {
        SplitRatios::new(self.train_percent, self.dev_percent)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationSettings {
    pub alignment: AlignmentMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    pub addr: String,
}

/// Empilha fontes de configuração sobre os padrões embutidos.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Arquivo obrigatório.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref()).format(FileFormat::Toml).required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Arquivo ignorado se não existir.
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref()).format(FileFormat::Toml).required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Variáveis `NER_DATASET__<SEÇÃO>__<CHAVE>`.
    pub fn with_env(mut self) -> Self {
        let source = Environment::with_prefix("NER_DATASET")
            .separator("__")
            .try_parsing(true);
        self.builder = self.builder.add_source(source);
        self
    }

    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<DatasetConfig> {
        let config: DatasetConfig = self.builder.build()?.try_deserialize()?;
        config.split.ratios()?;
        Ok(config)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

pub fn load_defaults() -> Result<DatasetConfig> {
    Loader::new().build()
}
