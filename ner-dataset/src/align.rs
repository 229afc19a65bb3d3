//! # Alinhamento de Menções a Tokens
//!
//! As menções chegam como strings soltas, sem offsets. O alinhador encontra
//! cada menção na sentença e devolve o intervalo inclusivo de tokens que ela
//! cobre. Há duas estratégias, escolhidas explicitamente via [`AlignmentMode`]:
//!
//! - **Position** ([`PositionAligner`]): primeira ocorrência *case-sensitive* da
//!   menção no texto da sentença; o intervalo de bytes é projetado nos tokens.
//!   Uma menção que cobre só parte de um token marca o token inteiro.
//! - **TokenMatch** ([`TokenMatchAligner`]): a menção é quebrada em espaços e
//!   procurada como sequência contígua de tokens, sem diferenciar maiúsculas.
//!
//! As duas divergem em menções com pontuação colada (`"erstellt."`), em
//! diferenças de caixa e em menções que são parte de um token.
//!
//! ## Ordem de escrita
//!
//! [`label_sentence`] percorre as menções de cada categoria na ordem recebida e
//! as categorias na ordem de [`EntityCategory::TAGGED`]. Não há detecção de
//! conflito: se duas menções cobrem o mesmo token, a última escrita vence.

use serde::{Deserialize, Serialize};

use crate::document::EntityMentions;
use crate::tagger::{assign_range, EntityCategory, Tag, TokenRange};
use crate::tokenizer::Token;

/// Estratégia de alinhamento menção → tokens.
pub trait EntityAligner: Send + Sync {
    /// Nome curto da estratégia (para logs e eventos).
    fn name(&self) -> &'static str;

    /// Intervalo de tokens coberto por `mention`, ou `None` se ela não for
    /// encontrada na sentença.
    fn align(&self, sentence: &str, tokens: &[Token], mention: &str) -> Option<TokenRange>;
}

/// Alinhamento por posição de caracteres na sentença original.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionAligner;

impl EntityAligner for PositionAligner {
    fn name(&self) -> &'static str {
        "position"
    }

    fn align(&self, sentence: &str, tokens: &[Token], mention: &str) -> Option<TokenRange> {
        let mention_start = sentence.find(mention)?;
        let mention_end = mention_start + mention.len();

        let mut start = None;
        let mut end = None;
        for (i, token) in tokens.iter().enumerate() {
            if start.is_none() && token.end > mention_start {
                start = Some(i);
            }
            if token.start < mention_end {
                end = Some(i);
            }
        }

        // menção só com espaços entre dois tokens: start > end
        let (start, end) = (start?, end?);
        (start <= end).then(|| TokenRange::new(start, end))
    }
}

/// Alinhamento por sequência de tokens, sem diferenciar maiúsculas.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenMatchAligner;

impl EntityAligner for TokenMatchAligner {
    fn name(&self) -> &'static str {
        "token_match"
    }

    fn align(&self, _sentence: &str, tokens: &[Token], mention: &str) -> Option<TokenRange> {
        let needle: Vec<String> = mention.split_whitespace().map(str::to_lowercase).collect();
        if needle.is_empty() || needle.len() > tokens.len() {
            return None;
        }

        let haystack: Vec<String> = tokens.iter().map(|t| t.text.to_lowercase()).collect();
        haystack
            .windows(needle.len())
            .position(|window| window == needle.as_slice())
            .map(|start| TokenRange::new(start, start + needle.len() - 1))
    }
}

/// Seleção da estratégia de alinhamento (configurável).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentMode {
    /// **Padrão**: offset de caracteres, sensível a maiúsculas.
    #[default]
    Position,
    /// Casamento de tokens, insensível a maiúsculas.
    TokenMatch,
}

impl AlignmentMode {
    pub fn aligner(self) -> &'static dyn EntityAligner {
        match self {
            AlignmentMode::Position => &PositionAligner,
            AlignmentMode::TokenMatch => &TokenMatchAligner,
        }
    }
}

/// Rotula os tokens de uma sentença a partir das menções do documento.
///
/// Todo token começa como `O`; menções não encontradas são ignoradas.
/// O resultado tem sempre o mesmo comprimento de `tokens`.
pub fn label_sentence(
    sentence: &str,
    tokens: &[Token],
    mentions: &EntityMentions,
    aligner: &dyn EntityAligner,
) -> Vec<Tag> {
    let mut tags = vec![Tag::Outside; tokens.len()];

    for category in EntityCategory::TAGGED {
        for mention in mentions.get(category) {
            if let Some(range) = aligner.align(sentence, tokens, mention) {
                assign_range(&mut tags, range, category);
            }
        }
    }

    tags
}
