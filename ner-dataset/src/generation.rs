//! # Plano de Geração
//!
//! Descritores consumidos pelo colaborador externo que gera os textos. Este
//! crate não gera texto; ele apenas sorteia, com um RNG injetado, **o que**
//! deve ser gerado: tipo de documento, variante, estilo de escrita, tipo de
//! seguradora e personalidade do autor.
//!
//! ## Mistura de variantes
//!
//! | Variante        | Probabilidade |
//! |-----------------|---------------|
//! | Complex         | 15%           |
//! | EdgeCase        | 10%           |
//! | MultiLanguage   | 5%            |
//! | Personality     | 30%           |
//! | Standard        | 40%           |

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::document::DocumentType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WritingStyle {
    Formal,
    Friendly,
    Technical,
    Legal,
    Sales,
}

impl WritingStyle {
    pub const ALL: [WritingStyle; 5] = [
        WritingStyle::Formal,
        WritingStyle::Friendly,
        WritingStyle::Technical,
        WritingStyle::Legal,
        WritingStyle::Sales,
    ];

    pub fn description(&self) -> &'static str {
        match self {
            WritingStyle::Formal => "Sehr formal und geschäftlich",
            WritingStyle::Friendly => "Freundlich und persönlich",
            WritingStyle::Technical => "Technisch und präzise",
            WritingStyle::Legal => "Rechtlich und exakt",
            WritingStyle::Sales => "Verkaufsorientiert und überzeugend",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InsuranceCompanyType {
    LargeInsurer,
    RegionalInsurer,
    InsuranceBroker,
    SpecialistInsurer,
}

impl InsuranceCompanyType {
    pub const ALL: [InsuranceCompanyType; 4] = [
        InsuranceCompanyType::LargeInsurer,
        InsuranceCompanyType::RegionalInsurer,
        InsuranceCompanyType::InsuranceBroker,
        InsuranceCompanyType::SpecialistInsurer,
    ];

    pub fn description(&self) -> &'static str {
        match self {
            InsuranceCompanyType::LargeInsurer => "Große Versicherungskonzern (Allianz, AXA-Stil)",
            InsuranceCompanyType::RegionalInsurer => "Regionale Versicherung (persönlicher)",
            InsuranceCompanyType::InsuranceBroker => "Versicherungsmakler (beratend)",
            InsuranceCompanyType::SpecialistInsurer => "Spezialversicherer (technisch)",
        }
    }
}

/// Personalidades de autor usadas na variante `Personality`.
pub const AUTHOR_PERSONALITIES: [&str; 7] = [
    "Erfahrener Sachbearbeiter (detailorientiert, gründlich)",
    "Freundlicher Kundenberater (persönlich, lösungsorientiert)",
    "Strenger Jurist (präzise, formal, rechtlich korrekt)",
    "Empathische Schadensreguliererin (verständnisvoll, professionell)",
    "Effizienter Makler (verkaufsorientiert, zeitbewusst)",
    "Geduldiger Trainer (erklärend, strukturiert)",
    "Pragmatischer Teamleiter (direkt, ergebnisorientiert)",
];

/// Variante de geração.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationVariant {
    /// Vários contratos, clientes e contatos no mesmo documento (B2B).
    Complex,
    /// Padrões difíceis: números parecidos que não são entidades, nomes abreviados.
    EdgeCase,
    /// Alemão com termos e empresas internacionais.
    MultiLanguage,
    /// Tipo de documento com estilo, seguradora e personalidade sorteados.
    Personality,
    /// Modelo fixo por tipo de documento.
    Standard,
}

impl GenerationVariant {
    /// Escolhe a variante a partir de um valor uniforme em `[0, 1)`.
    pub fn from_roll(roll: f64) -> Self {
        if roll < 0.15 {
            GenerationVariant::Complex
        } else if roll < 0.25 {
            GenerationVariant::EdgeCase
        } else if roll < 0.30 {
            GenerationVariant::MultiLanguage
        } else if roll < 0.60 {
            GenerationVariant::Personality
        } else {
            GenerationVariant::Standard
        }
    }
}

/// O que o colaborador externo deve gerar para um documento.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationPlan {
    pub doc_type: DocumentType,
    pub variant: GenerationVariant,
    /// Preenchidos apenas na variante `Personality`.
    pub style: Option<WritingStyle>,
    pub company_type: Option<InsuranceCompanyType>,
    pub personality: Option<String>,
}

impl GenerationPlan {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let doc_type = DocumentType::random(rng);
        let variant = GenerationVariant::from_roll(rng.gen::<f64>());

        if variant != GenerationVariant::Personality {
            return Self {
                doc_type,
                variant,
                style: None,
                company_type: None,
                personality: None,
            };
        }

        let style = WritingStyle::ALL[rng.gen_range(0..WritingStyle::ALL.len())];
        let company_type = InsuranceCompanyType::ALL[rng.gen_range(0..InsuranceCompanyType::ALL.len())];
        let personality = AUTHOR_PERSONALITIES[rng.gen_range(0..AUTHOR_PERSONALITIES.len())];
        Self {
            doc_type,
            variant,
            style: Some(style),
            company_type: Some(company_type),
            personality: Some(personality.to_string()),
        }
    }
}
