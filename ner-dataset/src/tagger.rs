//! # Esquema de Tags BIO/S e Categorias de Entidade
//!
//! Define o esquema de anotação usado nos arquivos de treinamento e o
//! **atribuidor de labels**, que converte um intervalo de tokens alinhado em tags.
//!
//! ## Categorias de Entidades
//!
//! | Categoria         | Rotulada? | Exemplos                              |
//! |-------------------|-----------|---------------------------------------|
//! | CONTRACT_NUMBER   | sim       | VS-2024-123456, POL-98765432          |
//! | CUSTOMER_ID       | sim       | KD-123456, KUNDE-12345678             |
//! | COMPANY_NAME      | sim       | Allianz Versicherungs-AG              |
//! | PERSON_NAME       | sim       | Herr Andreas Müller, Dr. Petra Schmidt|
//! | AMOUNT            | não       | EUR 1.250,00                          |
//! | DATE              | não       | 15.03.2024                            |
//! | ADDRESS           | não       | Hauptstraße 15, 10115 Berlin          |
//!
//! AMOUNT, DATE e ADDRESS são aceitas na entrada e contabilizadas, mas nunca
//! produzem labels.
//!
//! ## Esquema BIO/S
//!
//! - `B-TAG`: Begin: primeiro token de uma entidade de vários tokens
//! - `I-TAG`: Inside: tokens subsequentes da mesma entidade
//! - `S-TAG`: Single: entidade de um único token
//! - `O`: Outside: não é parte de nenhuma entidade

use serde::{Deserialize, Serialize};

use crate::tokenizer::Token;

/// Categorias de entidade presentes nos documentos de seguros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityCategory {
    /// **Vertragsnummer**. Ex: "VS-2024-123456", "POL-98765432".
    ContractNumber,
    /// **Kundennummer**. Ex: "KD-123456".
    CustomerId,
    /// **Firmenname**: seguradoras e corretoras. Ex: "AXA Deutschland".
    CompanyName,
    /// **Personenname**, geralmente com título. Ex: "Frau Dr. Petra Schmidt".
    PersonName,
    /// Valores em EUR (não rotulado).
    Amount,
    /// Datas (não rotulado).
    Date,
    /// Endereços (não rotulado).
    Address,
}

impl EntityCategory {
    /// Categorias rotuladas, **na ordem de processamento**.
    ///
    /// A ordem é contratual: quando duas menções disputam o mesmo token, a
    /// categoria processada por último determina o label final.
    pub const TAGGED: [EntityCategory; 4] = [
        EntityCategory::ContractNumber,
        EntityCategory::CustomerId,
        EntityCategory::CompanyName,
        EntityCategory::PersonName,
    ];

    /// Todas as categorias aceitas na entrada.
    pub const ALL: [EntityCategory; 7] = [
        EntityCategory::ContractNumber,
        EntityCategory::CustomerId,
        EntityCategory::CompanyName,
        EntityCategory::PersonName,
        EntityCategory::Amount,
        EntityCategory::Date,
        EntityCategory::Address,
    ];

    /// Nome da categoria como aparece nos labels (ex: "CONTRACT_NUMBER")
    pub fn name(&self) -> &'static str {
        match self {
            EntityCategory::ContractNumber => "CONTRACT_NUMBER",
            EntityCategory::CustomerId => "CUSTOMER_ID",
            EntityCategory::CompanyName => "COMPANY_NAME",
            EntityCategory::PersonName => "PERSON_NAME",
            EntityCategory::Amount => "AMOUNT",
            EntityCategory::Date => "DATE",
            EntityCategory::Address => "ADDRESS",
        }
    }

    /// Indica se a categoria participa da rotulagem.
    pub fn is_tagged(&self) -> bool {
        Self::TAGGED.contains(self)
    }

    /// Tenta parsear a partir do nome (ex: "PERSON_NAME" → Some(PersonName))
    pub fn from_name(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == s)
    }
}

impl std::fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Tag aplicada a um token.
///
/// Serializada como o próprio label (`"B-PERSON_NAME"`, `"O"`...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Tag {
    /// **Begin**: primeiro token de uma entidade de vários tokens.
    Begin(EntityCategory),
    /// **Inside**: continuação de uma entidade.
    Inside(EntityCategory),
    /// **Single**: entidade que ocupa exatamente um token.
    Single(EntityCategory),
    /// **Outside**: valor inicial de todo token.
    #[default]
    Outside,
}

impl Tag {
    /// Representação textual da tag (ex: "B-PERSON_NAME", "S-CUSTOMER_ID", "O")
    pub fn label(&self) -> String {
        match self {
            Tag::Begin(cat) => format!("B-{}", cat.name()),
            Tag::Inside(cat) => format!("I-{}", cat.name()),
            Tag::Single(cat) => format!("S-{}", cat.name()),
            Tag::Outside => "O".to_string(),
        }
    }

    /// Retorna a categoria desta tag (se não for `O`)
    pub fn category(&self) -> Option<EntityCategory> {
        match self {
            Tag::Begin(c) | Tag::Inside(c) | Tag::Single(c) => Some(*c),
            Tag::Outside => None,
        }
    }

    /// Parseia uma tag a partir de string (ex: "B-PERSON_NAME" → Begin(PersonName))
    pub fn from_label(s: &str) -> Option<Self> {
        if s == "O" {
            return Some(Tag::Outside);
        }
        let (prefix, name) = s.split_once('-')?;
        let cat = EntityCategory::from_name(name)?;
        match prefix {
            "B" => Some(Tag::Begin(cat)),
            "I" => Some(Tag::Inside(cat)),
            "S" => Some(Tag::Single(cat)),
            _ => None,
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl From<Tag> for String {
    fn from(tag: Tag) -> Self {
        tag.label()
    }
}

impl TryFrom<String> for Tag {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Tag::from_label(&value).ok_or_else(|| format!("label desconhecido: {value}"))
    }
}

/// Intervalo **inclusivo** de índices de tokens coberto por uma menção.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRange {
    pub start: usize,
    pub end: usize,
}

impl TokenRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Escreve as tags de uma menção alinhada.
///
/// - `start == end` → `S-CAT` no token.
/// - caso contrário → `B-CAT` em `start` e `I-CAT` em todo índice de `(start, end]`.
///
/// Sobrescreve o que já estiver escrito (a última escrita vence). Índices
/// fora do slice são ignorados.
pub fn assign_range(tags: &mut [Tag], range: TokenRange, category: EntityCategory) {
    if range.start >= tags.len() {
        return;
    }
    if range.start == range.end {
        tags[range.start] = Tag::Single(category);
        return;
    }
    tags[range.start] = Tag::Begin(category);
    let last = range.end.min(tags.len() - 1);
    for tag in tags.iter_mut().take(last + 1).skip(range.start + 1) {
        *tag = Tag::Inside(category);
    }
}

/// Uma entidade rotulada, reconstruída a partir da sequência de tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    /// Texto da entidade no texto da sentença
    pub text: String,
    pub category: EntityCategory,
    /// Índice do primeiro token
    pub start_token: usize,
    /// Índice do último token (inclusivo)
    pub end_token: usize,
    /// Posição de byte inicial na sentença
    pub start: usize,
    /// Posição de byte final na sentença
    pub end: usize,
}

/// Converte uma sequência de tags em spans de entidades.
///
/// Máquina de estados do esquema:
/// - `S-XXX` vira um span de um token.
/// - `B-XXX` inicia um span que continua enquanto houver `I-XXX` da **mesma** categoria.
/// - `I-XXX` órfão (sem `B-XXX` antes) é ignorado; isso acontece quando uma
///   menção posterior sobrescreve o início de outra.
pub fn tags_to_spans(tokens: &[Token], tags: &[Tag], sentence: &str) -> Vec<EntitySpan> {
    let mut spans = Vec::new();
    let n = tokens.len().min(tags.len());
    let mut i = 0;

    while i < n {
        match tags[i] {
            Tag::Single(cat) => {
                spans.push(make_span(tokens, sentence, cat, i, i));
                i += 1;
            }
            Tag::Begin(cat) => {
                let mut j = i + 1;
                while j < n && tags[j] == Tag::Inside(cat) {
                    j += 1;
                }
                spans.push(make_span(tokens, sentence, cat, i, j - 1));
                i = j;
            }
            _ => i += 1,
        }
    }

    spans
}

fn make_span(
    tokens: &[Token],
    sentence: &str,
    category: EntityCategory,
    start_token: usize,
    end_token: usize,
) -> EntitySpan {
    let start = tokens[start_token].start;
    let end = tokens[end_token].end;
    EntitySpan {
        text: sentence.get(start..end).unwrap_or_default().to_string(),
        category,
        start_token,
        end_token,
        start,
        end,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    #[test]
    fn test_tag_labels() {
        assert_eq!(Tag::Outside.label(), "O");
        assert_eq!(Tag::Begin(EntityCategory::PersonName).label(), "B-PERSON_NAME");
        assert_eq!(Tag::Inside(EntityCategory::CompanyName).label(), "I-COMPANY_NAME");
        assert_eq!(Tag::Single(EntityCategory::CustomerId).label(), "S-CUSTOMER_ID");
    }

    #[test]
    fn test_tag_from_label() {
        assert_eq!(Tag::from_label("O"), Some(Tag::Outside));
        assert_eq!(
            Tag::from_label("S-CONTRACT_NUMBER"),
            Some(Tag::Single(EntityCategory::ContractNumber))
        );
        assert_eq!(
            Tag::from_label("I-PERSON_NAME"),
            Some(Tag::Inside(EntityCategory::PersonName))
        );
        assert_eq!(Tag::from_label("X-PERSON_NAME"), None);
        assert_eq!(Tag::from_label("B-PER"), None);
    }

    #[test]
    fn test_tag_serializes_as_label() {
        let json = serde_json::to_string(&Tag::Begin(EntityCategory::CompanyName)).unwrap();
        assert_eq!(json, "\"B-COMPANY_NAME\"");
        let back: Tag = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Tag::Begin(EntityCategory::CompanyName));
    }

    #[test]
    fn test_untagged_categories() {
        assert!(EntityCategory::PersonName.is_tagged());
        assert!(!EntityCategory::Amount.is_tagged());
        assert!(!EntityCategory::Date.is_tagged());
        assert!(!EntityCategory::Address.is_tagged());
    }

    #[test]
    fn test_assign_single_and_multi() {
        let mut tags = vec![Tag::Outside; 5];
        assign_range(&mut tags, TokenRange::new(1, 1), EntityCategory::ContractNumber);
        assign_range(&mut tags, TokenRange::new(2, 4), EntityCategory::PersonName);
        assert_eq!(
            tags,
            vec![
                Tag::Outside,
                Tag::Single(EntityCategory::ContractNumber),
                Tag::Begin(EntityCategory::PersonName),
                Tag::Inside(EntityCategory::PersonName),
                Tag::Inside(EntityCategory::PersonName),
            ]
        );
    }

    #[test]
    fn test_assign_last_write_wins() {
        let mut tags = vec![Tag::Outside; 3];
        assign_range(&mut tags, TokenRange::new(0, 2), EntityCategory::CompanyName);
        assign_range(&mut tags, TokenRange::new(1, 1), EntityCategory::PersonName);
        assert_eq!(tags[0], Tag::Begin(EntityCategory::CompanyName));
        assert_eq!(tags[1], Tag::Single(EntityCategory::PersonName));
        assert_eq!(tags[2], Tag::Inside(EntityCategory::CompanyName));
    }

    #[test]
    fn test_tags_to_spans() {
        let sentence = "Herr Andreas Müller von AXA";
        let tokens = tokenize(sentence);
        let tags = vec![
            Tag::Begin(EntityCategory::PersonName),
            Tag::Inside(EntityCategory::PersonName),
            Tag::Inside(EntityCategory::PersonName),
            Tag::Outside,
            Tag::Single(EntityCategory::CompanyName),
        ];
        let spans = tags_to_spans(&tokens, &tags, sentence);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "Herr Andreas Müller");
        assert_eq!(spans[0].end_token, 2);
        assert_eq!(spans[1].text, "AXA");
        assert_eq!(spans[1].category, EntityCategory::CompanyName);
    }

    #[test]
    fn test_orphan_inside_is_ignored() {
        let sentence = "a b c";
        let tokens = tokenize(sentence);
        let tags = vec![
            Tag::Single(EntityCategory::PersonName),
            Tag::Inside(EntityCategory::CompanyName),
            Tag::Outside,
        ];
        let spans = tags_to_spans(&tokens, &tags, sentence);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].category, EntityCategory::PersonName);
    }
}
