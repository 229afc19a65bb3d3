//! # Pipeline do Corpus: Orquestrador com Eventos Observáveis
//!
//! Liga os estágios na ordem fixa:
//!
//! 1. **Segmentação** ([`crate::segmenter`]) do texto de cada documento em sentenças.
//! 2. **Tokenização** ([`crate::tokenizer`]) e **alinhamento** ([`crate::align`]) das menções.
//! 3. **Rotulagem BIO/S** ([`crate::tagger`]) e **escrita** `token\tlabel` ([`crate::annotate`]).
//! 4. **Split** train/dev/test ([`crate::split`]) e **estatísticas** ([`crate::stats`]),
//!    executados uma única vez, depois que todos os documentos foram anotados.
//!
//! Cada documento é anotado de forma independente (em paralelo, via `rayon`). Uma falha
//! em um documento o exclui do corpus sem interromper os demais.
//!
//! # Modos de Uso
//! - **Sync**: [`DatasetPipeline::build_corpus`].
//! - **Streaming**: [`DatasetPipeline::build_corpus_streaming`], que emite um
//!   [`PipelineEvent`] por etapa em um canal `mpsc` (usado pelo WebSocket).

use std::sync::mpsc;
use std::time::Instant;

use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::align::AlignmentMode;
use crate::annotate::{annotate_sentence, render_document, AnnotatedSentence};
use crate::config::DatasetConfig;
use crate::document::{AnnotatedDocument, RawDocument};
use crate::error::{Error, Result};
use crate::segmenter::segment;
use crate::split::{split_corpus, CorpusSplit, SplitRatios};
use crate::stats::StatisticsRecord;

/// A cada quantos documentos o progresso é registrado no log.
const PROGRESS_EVERY: usize = 10;

/// Eventos emitidos durante a montagem do corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PipelineEvent {
    /// Um documento foi anotado com sucesso.
    DocumentAnnotated {
        document_id: u32,
        sentences: usize,
        tokens: usize,
        /// Entidades efetivamente rotuladas.
        tagged_spans: usize,
    },
    /// Um documento foi descartado.
    DocumentFailed { document_id: u32, message: String },
    /// Tamanhos das partições.
    SplitDone { train: usize, dev: usize, test: usize },
    /// **Conclusão**: estatísticas finais e tempo total.
    Done {
        statistics: StatisticsRecord,
        processing_ms: u64,
    },
}

/// Documento excluído do corpus e o motivo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFailure {
    pub document_id: u32,
    pub message: String,
}

/// Resultado de uma execução: partições + estatísticas.
#[derive(Debug, Clone)]
pub struct AssembledCorpus {
    pub split: CorpusSplit<AnnotatedDocument>,
    pub statistics: StatisticsRecord,
    pub failures: Vec<DocumentFailure>,
}

/// O pipeline de anotação e montagem do corpus.
///
/// Não guarda estado entre execuções; pode ser compartilhado entre threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetPipeline {
    alignment: AlignmentMode,
    ratios: SplitRatios,
    target_size: usize,
}

impl Default for DatasetPipeline {
    fn default() -> Self {
        Self {
            alignment: AlignmentMode::default(),
            ratios: SplitRatios::default(),
            target_size: 300,
        }
    }
}

impl DatasetPipeline {
    /// Alinhamento por posição, split 70/15/15, 300 documentos esperados.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &DatasetConfig) -> Result<Self> {
        Ok(Self {
            alignment: config.annotation.alignment,
            ratios: config.split.ratios()?,
            target_size: config.dataset.target_size,
        })
    }

    pub fn with_alignment(mut self, alignment: AlignmentMode) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_ratios(mut self, ratios: SplitRatios) -> Self {
        self.ratios = ratios;
        self
    }

    pub fn alignment(&self) -> AlignmentMode {
        self.alignment
    }

    pub fn ratios(&self) -> SplitRatios {
        self.ratios
    }

    pub fn target_size(&self) -> usize {
        self.target_size
    }

    /// Anota um único documento.
    ///
    /// Falha com [`Error::EmptyDocument`] se o texto não tiver nenhuma sentença.
    pub fn annotate(&self, document: &RawDocument) -> Result<AnnotatedDocument> {
        let aligner = self.alignment.aligner();
        let sentences: Vec<AnnotatedSentence> = segment(&document.text)
            .iter()
            .map(|sentence| annotate_sentence(sentence, &document.entities, aligner))
            .collect();

        if sentences.is_empty() {
            return Err(Error::EmptyDocument(document.id));
        }

        Ok(AnnotatedDocument {
            id: document.id,
            doc_type: document.doc_type,
            raw_text: document.text.clone(),
            tagged_text: render_document(&sentences),
            entities: document.entities.clone(),
            sentences,
        })
    }

    /// Anota todos os documentos em paralelo; o resultado segue a ordem de entrada.
    pub fn annotate_all(&self, documents: &[RawDocument]) -> Vec<Result<AnnotatedDocument>> {
        documents.par_iter().map(|doc| self.annotate(doc)).collect()
    }

    /// Monta o corpus sem emitir eventos.
    pub fn build_corpus<R>(&self, documents: Vec<RawDocument>, rng: &mut R) -> AssembledCorpus
    where
        R: Rng + ?Sized,
    {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        self.build_corpus_streaming(documents, rng, &tx)
    }

    /// Monta o corpus emitindo eventos em `tx`.
    ///
    /// Ordem dos eventos: um `DocumentAnnotated`/`DocumentFailed` por documento, na
    /// ordem de entrada, depois `SplitDone` e por fim `Done`. Um receptor que
    /// desconectou não interrompe a execução.
    pub fn build_corpus_streaming<R>(
        &self,
        documents: Vec<RawDocument>,
        rng: &mut R,
        tx: &mpsc::Sender<PipelineEvent>,
    ) -> AssembledCorpus
    where
        R: Rng + ?Sized,
    {
        let start = Instant::now();
        let total = documents.len();
        if total > self.target_size {
            tracing::warn!(total, target = self.target_size, "mais documentos que o alvo configurado");
        }

        let mut annotated = Vec::with_capacity(total);
        let mut failures = Vec::new();

        for (i, (raw, result)) in documents.iter().zip(self.annotate_all(&documents)).enumerate() {
            match result {
                Ok(doc) => {
                    let _ = tx.send(PipelineEvent::DocumentAnnotated {
                        document_id: doc.id,
                        sentences: doc.sentences.len(),
                        tokens: doc.token_count(),
                        tagged_spans: doc.sentences.iter().map(|s| s.spans().len()).sum(),
                    });
                    annotated.push(doc);
                }
                Err(err) => {
                    tracing::warn!(document_id = raw.id, error = %err, "documento descartado");
                    let failure = DocumentFailure {
                        document_id: raw.id,
                        message: err.to_string(),
                    };
                    let _ = tx.send(PipelineEvent::DocumentFailed {
                        document_id: failure.document_id,
                        message: failure.message.clone(),
                    });
                    failures.push(failure);
                }
            }

            if (i + 1) % PROGRESS_EVERY == 0 {
                tracing::info!(processed = i + 1, total, "progresso da anotação");
            }
        }

        let statistics = StatisticsRecord::compute(
            &annotated,
            self.ratios.sizes(annotated.len()),
            failures.len(),
        );
        let split = split_corpus(annotated, self.ratios, rng);

        let sizes = split.sizes();
        let _ = tx.send(PipelineEvent::SplitDone {
            train: sizes.train,
            dev: sizes.dev,
            test: sizes.test,
        });

        tracing::info!("{}", statistics.summary());
        let _ = tx.send(PipelineEvent::Done {
            statistics: statistics.clone(),
            processing_ms: start.elapsed().as_millis() as u64,
        });

        AssembledCorpus {
            split,
            statistics,
            failures,
        }
    }
}
