//! # Escritor de Anotações (formato CoNLL)
//!
//! Cada sentença vira um bloco com uma linha `token<TAB>label` por token,
//! seguido de uma linha em branco. O texto anotado de um documento é a
//! concatenação dos blocos de todas as sentenças, na ordem do documento.
//!
//! ```text
//! Vertragsnummer	O
//! VS-2024-123456	S-CONTRACT_NUMBER
//! wurde	O
//! erstellt	O
//! .	O
//!
//! ```

use serde::{Deserialize, Serialize};

use crate::align::{label_sentence, EntityAligner};
use crate::document::EntityMentions;
use crate::error::{Error, Result};
use crate::segmenter::Sentence;
use crate::tagger::{tags_to_spans, EntitySpan, Tag};
use crate::tokenizer::{tokenize, Token};

/// Uma sentença tokenizada e rotulada.
///
/// Invariante: `tokens.len() == tags.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedSentence {
    /// Texto da sentença.
    pub text: String,
    /// Offset (em bytes) da sentença no documento.
    pub start: usize,
    pub tokens: Vec<Token>,
    pub tags: Vec<Tag>,
}

impl AnnotatedSentence {
    /// Entidades efetivamente rotuladas nesta sentença.
    pub fn spans(&self) -> Vec<EntitySpan> {
        tags_to_spans(&self.tokens, &self.tags, &self.text)
    }

    /// Bloco `token\tlabel` desta sentença.
    pub fn render(&self) -> String {
        render_sentence(&self.tokens, &self.tags)
    }
}

/// Tokeniza e rotula uma sentença.
pub fn annotate_sentence(
    sentence: &Sentence,
    mentions: &EntityMentions,
    aligner: &dyn EntityAligner,
) -> AnnotatedSentence {
    let tokens = tokenize(&sentence.text);
    let tags = label_sentence(&sentence.text, &tokens, mentions, aligner);
    debug_assert_eq!(tokens.len(), tags.len());
    AnnotatedSentence {
        text: sentence.text.clone(),
        start: sentence.start,
        tokens,
        tags,
    }
}

/// Uma linha por token e uma linha em branco ao final.
pub fn render_sentence(tokens: &[Token], tags: &[Tag]) -> String {
    let mut out = String::new();
    for (token, tag) in tokens.iter().zip(tags) {
        out.push_str(&token.text);
        out.push('\t');
        out.push_str(&tag.label());
        out.push('\n');
    }
    out.push('\n');
    out
}

/// Concatena os blocos de todas as sentenças do documento.
pub fn render_document(sentences: &[AnnotatedSentence]) -> String {
    sentences.iter().map(AnnotatedSentence::render).collect()
}

/// Lê de volta um texto `token\tlabel` em sentenças de pares (token, tag).
///
/// Linhas em branco (uma ou mais) separam sentenças.
pub fn read_tagged_text(text: &str) -> Result<Vec<Vec<(String, Tag)>>> {
    let mut sentences = Vec::new();
    let mut current = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                sentences.push(std::mem::take(&mut current));
            }
            continue;
        }

        let (token, label) = line.rsplit_once('\t').ok_or_else(|| {
            Error::invalid_input(format!("linha {}: separador TAB ausente", line_no + 1))
        })?;
        let tag = Tag::from_label(label).ok_or_else(|| {
            Error::invalid_input(format!("linha {}: label desconhecido {label:?}", line_no + 1))
        })?;
        current.push((token.to_string(), tag));
    }

    if !current.is_empty() {
        sentences.push(current);
    }
    Ok(sentences)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::AlignmentMode;
    use crate::segmenter::segment;
    use crate::tagger::EntityCategory;

    #[test]
    fn test_render_sentence_format() {
        let sentence = Sentence {
            text: "Vertragsnummer VS-2024-123456 wurde erstellt.".to_string(),
            start: 0,
        };
        let mentions = EntityMentions::default()
            .with(EntityCategory::ContractNumber, ["VS-2024-123456"]);
        let annotated = annotate_sentence(&sentence, &mentions, AlignmentMode::Position.aligner());
        assert_eq!(
            annotated.render(),
            "Vertragsnummer\tO\nVS-2024-123456\tS-CONTRACT_NUMBER\nwurde\tO\nerstellt\tO\n.\tO\n\n"
        );
    }

    #[test]
    fn test_render_document_concatenates_sentences() {
        let text = "Allianz Versicherungs-AG\n\nKunde KD-123456";
        let mentions = EntityMentions::default()
            .with(EntityCategory::CompanyName, ["Allianz Versicherungs-AG"])
            .with(EntityCategory::CustomerId, ["KD-123456"]);
        let aligner = AlignmentMode::Position.aligner();
        let sentences: Vec<AnnotatedSentence> = segment(text)
            .iter()
            .map(|s| annotate_sentence(s, &mentions, aligner))
            .collect();

        assert_eq!(
            render_document(&sentences),
            "Allianz\tB-COMPANY_NAME\nVersicherungs-AG\tI-COMPANY_NAME\n\nKunde\tO\nKD-123456\tS-CUSTOMER_ID\n\n"
        );
    }

    #[test]
    fn test_read_tagged_text() {
        let text = "Herr\tB-PERSON_NAME\nMüller\tI-PERSON_NAME\n\n\n.\tO\n\n";
        let sentences = read_tagged_text(text).unwrap();
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0][1], ("Müller".to_string(), Tag::Inside(EntityCategory::PersonName)));
        assert_eq!(sentences[1], vec![(".".to_string(), Tag::Outside)]);
    }

    #[test]
    fn test_read_tagged_text_rejects_bad_lines() {
        assert!(read_tagged_text("Herr B-PERSON_NAME\n").is_err());
        assert!(read_tagged_text("Herr\tB-PER\n").is_err());
    }
}
