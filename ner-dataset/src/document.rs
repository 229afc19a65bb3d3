//! # Documentos: entrada bruta e saída anotada
//!
//! - [`RawDocument`]: texto gerado + menções extraídas, como chegam do
//!   colaborador externo de geração/extração (sem offsets).
//! - [`AnnotatedDocument`]: derivado uma única vez de um `RawDocument`.
//! - [`DocumentType`]: os seis tipos de documento, com uma tabela de descritores
//!   (nome alemão e campos obrigatórios) consultada por tipo.

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};

use crate::annotate::AnnotatedSentence;
use crate::tagger::EntityCategory;

/// Tipos de documento de seguros gerados.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    PolicyConfirmation,
    ClaimReport,
    PremiumAdjustment,
    Cancellation,
    PaymentReminder,
    InsuranceQuote,
}

/// Descritor estático de um tipo de documento.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DocumentTypeDescriptor {
    pub doc_type: DocumentType,
    /// Nome usado nos documentos (ex: "Schadensmeldung").
    pub german_name: &'static str,
    /// Campos que o documento gerado precisa conter.
    pub required_fields: &'static [&'static str],
}

const DESCRIPTORS: [DocumentTypeDescriptor; 6] = [
    DocumentTypeDescriptor {
        doc_type: DocumentType::PolicyConfirmation,
        german_name: "Versicherungspolice-Bestätigung",
        required_fields: &[
            "Vollständige Vertragsdaten (Nummer, Laufzeit, Beitrag)",
            "Deckungsumfang und Versicherungssumme",
            "Zahlungsmodalitäten",
            "Kontaktdaten für Rückfragen",
            "Rechtliche Hinweise und Widerrufsbelehrung",
        ],
    },
    DocumentTypeDescriptor {
        doc_type: DocumentType::ClaimReport,
        german_name: "Schadensmeldung",
        required_fields: &[
            "Detaillierte Schadensschilderung",
            "Schadenshöhe in EUR",
            "Beteiligte Personen/Fahrzeuge",
            "Polizeiaktenzeichen (wenn vorhanden)",
            "Zeugenangaben",
            "Gutachter-/Werkstatttermine",
        ],
    },
    DocumentTypeDescriptor {
        doc_type: DocumentType::PremiumAdjustment,
        german_name: "Beitragsanpassung",
        required_fields: &[
            "Klare Gegenüberstellung: Alt vs. Neu",
            "Prozentuale Änderung des Beitrags",
            "Begründung der Anpassung",
            "Datum des Inkrafttretens",
            "Sonderkündigungsrecht-Hinweis",
        ],
    },
    DocumentTypeDescriptor {
        doc_type: DocumentType::Cancellation,
        german_name: "Kündigungsschreiben",
        required_fields: &[
            "Eindeutige Kündigungserklärung",
            "Kündigungsfristen beachten",
            "Grund der Kündigung (optional)",
            "Datum der gewünschten Beendigung",
            "Bitte um schriftliche Bestätigung",
            "Regelung für Restbeiträge",
        ],
    },
    DocumentTypeDescriptor {
        doc_type: DocumentType::PaymentReminder,
        german_name: "Zahlungserinnerung",
        required_fields: &[
            "Offener Betrag und Fälligkeitsdatum",
            "Neue Zahlungsfrist (meist 14 Tage)",
            "Konsequenzen bei Nichtzahlung",
            "Bankverbindung für Überweisung",
            "Mahngebühren (bei 2./3. Mahnung)",
            "Ansprechpartner für Rückfragen",
        ],
    },
    DocumentTypeDescriptor {
        doc_type: DocumentType::InsuranceQuote,
        german_name: "Versicherungsangebot",
        required_fields: &[
            "Attraktive Präsentation der Vorteile",
            "Vergleich zu Mitbewerbern (optional)",
            "Flexible Zahlungsoptionen",
            "Zusatzbausteine und Upgrades",
            "Gültigkeitsdauer des Angebots",
            "Call-to-Action für Vertragsabschluss",
        ],
    },
];

impl DocumentType {
    pub const ALL: [DocumentType; 6] = [
        DocumentType::PolicyConfirmation,
        DocumentType::ClaimReport,
        DocumentType::PremiumAdjustment,
        DocumentType::Cancellation,
        DocumentType::PaymentReminder,
        DocumentType::InsuranceQuote,
    ];

    /// Nome do tipo como aparece nas estatísticas (ex: "CLAIM_REPORT")
    pub fn name(&self) -> &'static str {
        match self {
            DocumentType::PolicyConfirmation => "POLICY_CONFIRMATION",
            DocumentType::ClaimReport => "CLAIM_REPORT",
            DocumentType::PremiumAdjustment => "PREMIUM_ADJUSTMENT",
            DocumentType::Cancellation => "CANCELLATION",
            DocumentType::PaymentReminder => "PAYMENT_REMINDER",
            DocumentType::InsuranceQuote => "INSURANCE_QUOTE",
        }
    }

    pub fn descriptor(&self) -> &'static DocumentTypeDescriptor {
        &DESCRIPTORS[*self as usize]
    }

    pub fn german_name(&self) -> &'static str {
        self.descriptor().german_name
    }

    /// Sorteia um tipo com distribuição uniforme.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    pub fn descriptors() -> &'static [DocumentTypeDescriptor] {
        &DESCRIPTORS
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Menções extraídas de um documento, agrupadas por categoria.
///
/// Campos ausentes no JSON viram listas vazias; campos desconhecidos são ignorados.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityMentions {
    pub contract_numbers: Vec<String>,
    pub customer_ids: Vec<String>,
    pub company_names: Vec<String>,
    pub person_names: Vec<String>,
    pub amounts: Vec<String>,
    pub dates: Vec<String>,
    pub addresses: Vec<String>,
}

impl EntityMentions {
    /// Menções de uma categoria, na ordem em que foram fornecidas.
    pub fn get(&self, category: EntityCategory) -> &[String] {
        match category {
            EntityCategory::ContractNumber => &self.contract_numbers,
            EntityCategory::CustomerId => &self.customer_ids,
            EntityCategory::CompanyName => &self.company_names,
            EntityCategory::PersonName => &self.person_names,
            EntityCategory::Amount => &self.amounts,
            EntityCategory::Date => &self.dates,
            EntityCategory::Address => &self.addresses,
        }
    }

    fn get_mut(&mut self, category: EntityCategory) -> &mut Vec<String> {
        match category {
            EntityCategory::ContractNumber => &mut self.contract_numbers,
            EntityCategory::CustomerId => &mut self.customer_ids,
            EntityCategory::CompanyName => &mut self.company_names,
            EntityCategory::PersonName => &mut self.person_names,
            EntityCategory::Amount => &mut self.amounts,
            EntityCategory::Date => &mut self.dates,
            EntityCategory::Address => &mut self.addresses,
        }
    }

    /// Acrescenta menções a uma categoria (builder).
    pub fn with<I, S>(mut self, category: EntityCategory, mentions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.get_mut(category)
            .extend(mentions.into_iter().map(Into::into));
        self
    }

    pub fn is_empty(&self) -> bool {
        EntityCategory::ALL.iter().all(|c| self.get(*c).is_empty())
    }

    /// Lê a resposta JSON do extrator de entidades.
    ///
    /// Aceita a resposta dentro de um bloco de código markdown. Qualquer JSON
    /// malformado resulta no conjunto vazio (todos os tokens ficam `O`).
    pub fn from_json_lenient(response: &str) -> Self {
        let body = strip_code_fence(response);
        match serde_json::from_str(body) {
            Ok(value) => Self::from_value_lenient(value),
            Err(err) => {
                tracing::warn!(error = %err, "resposta de extração inválida; usando conjunto vazio");
                Self::default()
            }
        }
    }

    /// Como [`from_json_lenient`](Self::from_json_lenient), para um valor já lido.
    ///
    /// `null` equivale a menções ausentes.
    pub fn from_value_lenient(value: serde_json::Value) -> Self {
        if value.is_null() {
            return Self::default();
        }
        match serde_json::from_value(value) {
            Ok(mentions) => mentions,
            Err(err) => {
                tracing::warn!(error = %err, "menções inválidas; usando conjunto vazio");
                Self::default()
            }
        }
    }
}

fn lenient_mentions<'de, D>(deserializer: D) -> std::result::Result<EntityMentions, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(EntityMentions::from_value_lenient(value))
}

fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Documento gerado, antes da anotação.
///
/// `entities` ausente, `null` ou malformado vira o conjunto vazio: o documento
/// continua no corpus com todos os tokens `O`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDocument {
    pub id: u32,
    pub text: String,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    #[serde(default, deserialize_with = "lenient_mentions")]
    pub entities: EntityMentions,
}

impl RawDocument {
    pub fn new(id: u32, doc_type: DocumentType, text: impl Into<String>, entities: EntityMentions) -> Self {
        Self {
            id,
            text: text.into(),
            doc_type,
            entities,
        }
    }
}

/// Documento anotado: texto bruto + texto no formato `token\tlabel`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotatedDocument {
    pub id: u32,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    pub raw_text: String,
    pub tagged_text: String,
    /// Menções com que o documento foi anotado (base das estatísticas).
    pub entities: EntityMentions,
    pub sentences: Vec<AnnotatedSentence>,
}

impl AnnotatedDocument {
    pub fn token_count(&self) -> usize {
        self.sentences.iter().map(|s| s.tokens.len()).sum()
    }
}
