//! # Divisão do Corpus em Train/Dev/Test
//!
//! Embaralha os documentos (Fisher-Yates via `rand::seq::SliceRandom`) e fatia
//! a lista em três intervalos contíguos e disjuntos:
//!
//! - `train = floor(0.70 · n)` → `[0, train)`
//! - `dev = floor(0.15 · n)` → `[train, train + dev)`
//! - `test = n - train - dev` → `[train + dev, n)` (absorve o resto do arredondamento)
//!
//! Os tamanhos são calculados com aritmética inteira sobre percentuais, então
//! o `floor` é exato para todo `n`.
//!
//! O RNG é injetado: use um `StdRng` com semente para reproduzir um split e
//! [`split_corpus_random`] para o comportamento não determinístico padrão.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::document::AnnotatedDocument;
use crate::error::{Error, Result};

/// Percentuais de treino e validação; o teste fica com o restante.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitRatios {
    pub train_percent: u32,
    pub dev_percent: u32,
}

impl Default for SplitRatios {
    fn default() -> Self {
        Self {
            train_percent: 70,
            dev_percent: 15,
        }
    }
}

impl SplitRatios {
    pub fn new(train_percent: u32, dev_percent: u32) -> Result<Self> {
        let ratios = Self {
            train_percent,
            dev_percent,
        };
        ratios.validate()?;
        Ok(ratios)
    }

    pub fn validate(&self) -> Result<()> {
        if self.train_percent + self.dev_percent > 100 {
            return Err(Error::invalid_input(format!(
                "train ({}%) + dev ({}%) excede 100%",
                self.train_percent, self.dev_percent
            )));
        }
        Ok(())
    }

    /// Tamanhos das três partições para um corpus de `n` documentos.
    pub fn sizes(&self, n: usize) -> SplitSizes {
        let train = (n * self.train_percent as usize / 100).min(n);
        let dev = (n * self.dev_percent as usize / 100).min(n - train);
        SplitSizes {
            train,
            dev,
            test: n - train - dev,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SplitSizes {
    pub train: usize,
    pub dev: usize,
    pub test: usize,
}

impl SplitSizes {
    pub fn total(&self) -> usize {
        self.train + self.dev + self.test
    }
}

/// Nome de uma partição e o arquivo correspondente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitName {
    Train,
    Dev,
    Test,
}

impl SplitName {
    pub const ALL: [SplitName; 3] = [SplitName::Train, SplitName::Dev, SplitName::Test];

    pub fn file_name(&self) -> &'static str {
        match self {
            SplitName::Train => "train.conll",
            SplitName::Dev => "dev.conll",
            SplitName::Test => "test.conll",
        }
    }
}

/// As três partições, cada uma preservando a ordem do embaralhamento.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusSplit<T> {
    pub train: Vec<T>,
    pub dev: Vec<T>,
    pub test: Vec<T>,
}

impl<T> CorpusSplit<T> {
    pub fn sizes(&self) -> SplitSizes {
        SplitSizes {
            train: self.train.len(),
            dev: self.dev.len(),
            test: self.test.len(),
        }
    }

    pub fn get(&self, name: SplitName) -> &[T] {
        match name {
            SplitName::Train => &self.train,
            SplitName::Dev => &self.dev,
            SplitName::Test => &self.test,
        }
    }
}

impl CorpusSplit<AnnotatedDocument> {
    /// Texto do arquivo de uma partição.
    pub fn render(&self, name: SplitName) -> String {
        render_split(self.get(name))
    }
}

/// Embaralha `documents` com `rng` e divide segundo `ratios`.
pub fn split_corpus<T, R>(mut documents: Vec<T>, ratios: SplitRatios, rng: &mut R) -> CorpusSplit<T>
where
    R: Rng + ?Sized,
{
    documents.shuffle(rng);

    let sizes = ratios.sizes(documents.len());
    let test = documents.split_off(sizes.train + sizes.dev);
    let dev = documents.split_off(sizes.train);

    tracing::debug!(
        train = documents.len(),
        dev = dev.len(),
        test = test.len(),
        "corpus dividido"
    );

    CorpusSplit {
        train: documents,
        dev,
        test,
    }
}

/// Como [`split_corpus`], com o RNG da thread (não reproduzível).
pub fn split_corpus_random<T>(documents: Vec<T>, ratios: SplitRatios) -> CorpusSplit<T> {
    split_corpus(documents, ratios, &mut rand::thread_rng())
}

/// RNG com semente fixa quando informada; caso contrário, semeado pela entropia do sistema.
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Texto anotado de cada documento seguido de uma linha em branco separadora.
pub fn render_split(documents: &[AnnotatedDocument]) -> String {
    let mut out = String::new();
    for doc in documents {
        out.push_str(&doc.tagged_text);
        out.push_str("\n\n");
    }
    out
}
