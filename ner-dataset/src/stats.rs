//! # Estatísticas do Corpus
//!
//! Um [`StatisticsRecord`] por execução, calculado sobre o conjunto completo de
//! documentos (antes do split).
//!
//! `entity_counts` conta as menções **fornecidas** em cada categoria rotulada,
//! independentemente de o alinhamento ter encontrado a menção. As menções que
//! de fato viraram labels ficam em `tagged_span_counts`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::{AnnotatedDocument, DocumentType};
use crate::split::SplitSizes;
use crate::tagger::EntityCategory;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsRecord {
    /// Data de geração em RFC 3339.
    pub generated_at: String,
    pub total_documents: usize,
    pub train_size: usize,
    pub dev_size: usize,
    pub test_size: usize,
    /// Documentos descartados por falha na anotação.
    pub failed_documents: usize,
    /// Menções fornecidas por categoria rotulada (as quatro chaves sempre presentes).
    pub entity_counts: BTreeMap<EntityCategory, usize>,
    /// Entidades efetivamente rotuladas por categoria.
    pub tagged_span_counts: BTreeMap<EntityCategory, usize>,
    /// Documentos por tipo (apenas tipos presentes).
    pub document_type_counts: BTreeMap<DocumentType, usize>,
}

impl StatisticsRecord {
    pub fn compute(documents: &[AnnotatedDocument], sizes: SplitSizes, failed_documents: usize) -> Self {
        Self::compute_at(documents, sizes, failed_documents, Utc::now())
    }

    pub fn compute_at(
        documents: &[AnnotatedDocument],
        sizes: SplitSizes,
        failed_documents: usize,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let mut entity_counts: BTreeMap<EntityCategory, usize> =
            EntityCategory::TAGGED.iter().map(|c| (*c, 0)).collect();
        let mut tagged_span_counts = entity_counts.clone();
        let mut document_type_counts = BTreeMap::new();

        for doc in documents {
            for category in EntityCategory::TAGGED {
                *entity_counts.entry(category).or_default() += doc.entities.get(category).len();
            }
            for span in doc.sentences.iter().flat_map(|s| s.spans()) {
                *tagged_span_counts.entry(span.category).or_default() += 1;
            }
            *document_type_counts.entry(doc.doc_type).or_default() += 1;
        }

        Self {
            generated_at: generated_at.to_rfc3339(),
            total_documents: documents.len(),
            train_size: sizes.train,
            dev_size: sizes.dev,
            test_size: sizes.test,
            failed_documents,
            entity_counts,
            tagged_span_counts,
            document_type_counts,
        }
    }

    /// Resumo legível para logs.
    pub fn summary(&self) -> String {
        let entities: Vec<String> = self
            .entity_counts
            .iter()
            .map(|(category, count)| format!("{category}={count}"))
            .collect();
        format!(
            "documentos: {} (falhas: {}) | train/dev/test: {}/{}/{} | entidades: {}",
            self.total_documents,
            self.failed_documents,
            self.train_size,
            self.dev_size,
            self.test_size,
            entities.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::AlignmentMode;
    use crate::annotate::{annotate_sentence, render_document};
    use crate::document::EntityMentions;
    use crate::segmenter::segment;
    use chrono::TimeZone;

    fn annotated(id: u32, doc_type: DocumentType, text: &str, entities: EntityMentions) -> AnnotatedDocument {
        let aligner = AlignmentMode::Position.aligner();
        let sentences: Vec<_> = segment(text)
            .iter()
            .map(|s| annotate_sentence(s, &entities, aligner))
            .collect();
        AnnotatedDocument {
            id,
            doc_type,
            raw_text: text.to_string(),
            tagged_text: render_document(&sentences),
            entities,
            sentences,
        }
    }

    #[test]
    fn test_counts_supplied_mentions_and_types() {
        let docs = vec![
            annotated(
                1,
                DocumentType::ClaimReport,
                "Schaden zu Vertrag VS-2024-000001",
                EntityMentions::default()
                    .with(EntityCategory::ContractNumber, ["VS-2024-000001", "POL-404"])
                    .with(EntityCategory::Amount, ["EUR 500,00"]),
            ),
            annotated(
                2,
                DocumentType::ClaimReport,
                "Kunde KD-1",
                EntityMentions::default().with(EntityCategory::CustomerId, ["KD-1"]),
            ),
            annotated(3, DocumentType::InsuranceQuote, "Angebot", EntityMentions::default()),
        ];
        let sizes = SplitSizes { train: 2, dev: 0, test: 1 };
        let at = Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap();
        let record = StatisticsRecord::compute_at(&docs, sizes, 1, at);

        assert_eq!(record.generated_at, "2024-03-15T09:30:00+00:00");
        assert_eq!(record.total_documents, 3);
        assert_eq!(record.failed_documents, 1);
        assert_eq!(record.entity_counts[&EntityCategory::ContractNumber], 2);
        assert_eq!(record.entity_counts[&EntityCategory::CustomerId], 1);
        assert_eq!(record.entity_counts[&EntityCategory::PersonName], 0);
        assert!(!record.entity_counts.contains_key(&EntityCategory::Amount));
        // "POL-404" não aparece no texto: fornecida, mas não rotulada
        assert_eq!(record.tagged_span_counts[&EntityCategory::ContractNumber], 1);
        assert_eq!(record.document_type_counts[&DocumentType::ClaimReport], 2);
        assert_eq!(record.document_type_counts[&DocumentType::InsuranceQuote], 1);
        assert!(!record.document_type_counts.contains_key(&DocumentType::Cancellation));
    }

    #[test]
    fn test_json_shape() {
        let record = StatisticsRecord::compute(&[], SplitSizes::default(), 0);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["total_documents"], 0);
        assert_eq!(value["entity_counts"]["CONTRACT_NUMBER"], 0);
        assert_eq!(value["entity_counts"]["PERSON_NAME"], 0);
        assert!(value["document_type_counts"].as_object().unwrap().is_empty());
        assert!(value["generated_at"].is_string());
    }
}
