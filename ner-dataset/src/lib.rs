//! # ner-dataset: Corpus NER para Documentos de Seguros Alemães
//!
//! Este crate recebe documentos gerados (texto + menções de entidades extraídas, sem
//! offsets) e produz um corpus rotulado no formato `token<TAB>label`, dividido em
//! train/dev/test, junto com um registro de estatísticas.
//!
//! ## Arquitetura do Sistema
//!
//! 1.  **Entrada**: [`RawDocument`] (`{id, text, type, entities}`).
//! 2.  **Segmentação** ([`segmenter`]): o texto é quebrado em sentenças.
//! 3.  **Tokenização** ([`tokenizer`]): pontuação final e separadores numéricos viram tokens próprios.
//! 4.  **Alinhamento** ([`align`]): cada menção vira um intervalo de tokens (por posição ou por tokens).
//! 5.  **Rotulagem** ([`tagger`]): esquema BIO com `S-` para entidades de um token.
//! 6.  **Escrita** ([`annotate`]): uma linha `token\tlabel` por token, linha em branco entre sentenças.
//! 7.  **Split e Estatísticas** ([`split`], [`stats`]): 70/15/15 com RNG injetável.
//! 8.  **Saída** ([`output`]): `train.conll`, `dev.conll`, `test.conll`, `dataset_stats.json`.
//!
//! Só quatro categorias são rotuladas: `CONTRACT_NUMBER`, `CUSTOMER_ID`, `COMPANY_NAME`
//! e `PERSON_NAME`. `AMOUNT`, `DATE` e `ADDRESS` são aceitas na entrada mas nunca rotuladas.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use ner_dataset::{DatasetPipeline, DocumentType, EntityCategory, EntityMentions, RawDocument};
//!
//! let doc = RawDocument::new(
//!     1,
//!     DocumentType::PolicyConfirmation,
//!     "Vertragsnummer VS-2024-123456 wurde erstellt.",
//!     EntityMentions::default().with(EntityCategory::ContractNumber, ["VS-2024-123456"]),
//! );
//!
//! let annotated = DatasetPipeline::new().annotate(&doc).unwrap();
//! assert!(annotated.tagged_text.contains("VS-2024-123456\tS-CONTRACT_NUMBER"));
//! ```

pub mod align;
pub mod annotate;
pub mod config;
pub mod document;
pub mod error;
pub mod generation;
pub mod output;
pub mod pipeline;
pub mod segmenter;
pub mod split;
pub mod stats;
pub mod tagger;
pub mod tokenizer;

pub use align::{AlignmentMode, EntityAligner};
pub use annotate::AnnotatedSentence;
pub use document::{AnnotatedDocument, DocumentType, EntityMentions, RawDocument};
pub use error::{Error, Result};
pub use pipeline::{AssembledCorpus, DatasetPipeline, PipelineEvent};
pub use split::{CorpusSplit, SplitRatios};
pub use stats::StatisticsRecord;
pub use tagger::{EntityCategory, Tag};
pub use tokenizer::Token;
