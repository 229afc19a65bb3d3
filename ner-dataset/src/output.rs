//! # Persistência do Corpus
//!
//! Grava os três arquivos de split e o registro de estatísticas em um diretório.
//! Cada arquivo é escrito primeiro em um irmão temporário e depois renomeado,
//! então uma falha nunca deixa truncado um arquivo já gravado.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::document::{AnnotatedDocument, DocumentType};
use crate::error::Result;
use crate::split::{CorpusSplit, SplitName};
use crate::stats::StatisticsRecord;

pub const STATISTICS_FILE: &str = "dataset_stats.json";

/// Nome do arquivo de texto bruto de um documento (ex: `doc_0007_CLAIM_REPORT.txt`).
pub fn raw_file_name(id: u32, doc_type: DocumentType) -> String {
    format!("doc_{id:04}_{doc_type}.txt")
}

/// Nome do arquivo anotado de um documento (ex: `doc_0007.conll`).
pub fn annotated_file_name(id: u32) -> String {
    format!("doc_{id:04}.conll")
}

/// Caminhos gravados por [`write_corpus`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorpusFiles {
    pub train: PathBuf,
    pub dev: PathBuf,
    pub test: PathBuf,
    pub statistics: PathBuf,
}

/// Grava `train.conll`, `dev.conll`, `test.conll` e `dataset_stats.json` em `dir`.
///
/// Para no primeiro erro; os arquivos gravados antes dele permanecem íntegros.
pub fn write_corpus(
    dir: &Path,
    split: &CorpusSplit<AnnotatedDocument>,
    statistics: &StatisticsRecord,
) -> Result<CorpusFiles> {
    fs::create_dir_all(dir)?;

    let train = write_split(dir, split, SplitName::Train)?;
    let dev = write_split(dir, split, SplitName::Dev)?;
    let test = write_split(dir, split, SplitName::Test)?;
    let statistics = write_statistics(dir, statistics)?;

    tracing::info!(dir = %dir.display(), "corpus gravado");
    Ok(CorpusFiles {
        train,
        dev,
        test,
        statistics,
    })
}

/// Grava o arquivo de uma partição.
pub fn write_split(dir: &Path, split: &CorpusSplit<AnnotatedDocument>, name: SplitName) -> Result<PathBuf> {
    let path = dir.join(name.file_name());
    write_atomically(&path, split.render(name).as_bytes())?;
    tracing::debug!(path = %path.display(), documents = split.get(name).len(), "split gravado");
    Ok(path)
}

pub fn write_statistics(dir: &Path, statistics: &StatisticsRecord) -> Result<PathBuf> {
    let path = dir.join(STATISTICS_FILE);
    let json = serde_json::to_vec_pretty(statistics)?;
    write_atomically(&path, &json)?;
    Ok(path)
}

fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    fs::write(&tmp, contents)?;
    if let Err(err) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(err.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::read_tagged_text;
    use crate::document::{EntityMentions, RawDocument};
    use crate::pipeline::DatasetPipeline;
    use crate::split::rng_from_seed;
    use crate::tagger::EntityCategory;

    fn corpus() -> crate::pipeline::AssembledCorpus {
        let docs: Vec<RawDocument> = (1..=10)
            .map(|id| {
                RawDocument::new(
                    id,
                    DocumentType::PaymentReminder,
                    format!("Zahlungserinnerung zu KD-{id:06}"),
                    EntityMentions::default()
                        .with(EntityCategory::CustomerId, [format!("KD-{id:06}")]),
                )
            })
            .collect();
        DatasetPipeline::new().build_corpus(docs, &mut rng_from_seed(Some(5)))
    }

    #[test]
    fn test_write_corpus_files() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = corpus();
        let files = write_corpus(dir.path(), &corpus.split, &corpus.statistics).unwrap();

        let train = fs::read_to_string(&files.train).unwrap();
        assert_eq!(read_tagged_text(&train).unwrap().len(), 7);
        let dev = fs::read_to_string(&files.dev).unwrap();
        assert_eq!(read_tagged_text(&dev).unwrap().len(), 1);
        let test = fs::read_to_string(&files.test).unwrap();
        assert_eq!(read_tagged_text(&test).unwrap().len(), 2);

        let stats: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&files.statistics).unwrap()).unwrap();
        assert_eq!(stats["total_documents"], 10);
        assert_eq!(stats["entity_counts"]["CUSTOMER_ID"], 10);

        assert!(!dir.path().join("train.conll.tmp").exists());
    }

    #[test]
    fn test_split_file_separates_documents_with_blank_line() {
        let corpus = corpus();
        let text = corpus.split.render(SplitName::Dev);
        let doc = &corpus.split.dev[0];
        assert_eq!(text, format!("{}\n\n", doc.tagged_text));
    }

    #[test]
    fn test_document_file_names() {
        assert_eq!(raw_file_name(7, DocumentType::ClaimReport), "doc_0007_CLAIM_REPORT.txt");
        assert_eq!(annotated_file_name(123), "doc_0123.conll");
        assert_eq!(annotated_file_name(12345), "doc_12345.conll");
    }

    #[test]
    fn test_unwritable_target_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("arquivo");
        fs::write(&blocker, "x").unwrap();
        let corpus = corpus();
        let result = write_corpus(&blocker.join("sub"), &corpus.split, &corpus.statistics);
        assert!(matches!(result, Err(crate::error::Error::Io(_))));
    }
}
