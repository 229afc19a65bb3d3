//! # Tokenizador para Documentos de Seguros em Alemão
//!
//! Divide uma sentença em tokens. É uma função pura do texto: a mesma entrada
//! sempre produz a mesma sequência.
//!
//! ## Regras (aplicadas em ordem)
//!
//! 1. **Pontuação final**: insere um espaço antes de `. ! ? : ; ,` quando o sinal é
//!    seguido de espaço em branco ou do fim do texto (`"erstellt."` → `"erstellt ."`).
//! 2. **Separadores numéricos**: para dois números unidos por `.` ou `-`, insere
//!    espaços ao redor do separador. A substituição é feita uma vez, da esquerda
//!    para a direita e sem sobreposição, então em `15.03.2024` só o **primeiro**
//!    separador é quebrado (`15 . 03.2024`). O número da esquerda precisa iniciar
//!    a palavra, por isso identificadores como `VS-2024-123456` continuam inteiros.
//! 3. **Espaços**: quebra nos trechos de espaço em branco.
//!
//! As regras só inserem espaços, então todo token é uma fatia contígua da
//! sentença original. Os offsets são recuperados percorrendo a sentença com um
//! cursor que pula espaços em branco.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use ner_dataset::tokenizer::tokenize;
//!
//! let tokens = tokenize("Vertragsnummer VS-2024-123456 wurde erstellt.");
//! let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
//! assert_eq!(texts, ["Vertragsnummer", "VS-2024-123456", "wurde", "erstellt", "."]);
//! ```

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Um token extraído da sentença.
///
/// Mantém a posição exata no texto da sentença (`start` e `end`), usada pelo
/// alinhador por posição e para reconstruir o texto das entidades.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Token {
    /// O texto do token (ex: "Vertragsnummer", ".", "KD-123456").
    pub text: String,
    /// Índice de byte inicial na sentença (inclusive).
    pub start: usize,
    /// Índice de byte final na sentença (exclusivo).
    pub end: usize,
    /// Índice sequencial do token na lista (0, 1, 2...).
    pub index: usize,
}

/// Sinais destacados da palavra anterior quando encerram a palavra.
const TRAILING_PUNCTUATION: &[char] = &['.', '!', '?', ':', ';', ','];

fn numeric_separator() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([0-9]+)([.-])([0-9]+)").expect("regex estática válida"))
}

/// Tokeniza uma sentença.
pub fn tokenize(sentence: &str) -> Vec<Token> {
    let spaced = split_numeric_separators(&detach_punctuation(sentence));

    let mut tokens = Vec::new();
    let mut cursor = 0;
    for (index, piece) in spaced.split_whitespace().enumerate() {
        let rest = &sentence[cursor..];
        cursor += rest.len() - rest.trim_start().len();

        let start = cursor;
        let end = start + piece.len();
        tokens.push(Token {
            text: piece.to_string(),
            start,
            end,
            index,
        });
        cursor = end;
    }
    tokens
}

/// Regra 1: espaço antes da pontuação que encerra uma palavra.
fn detach_punctuation(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        let ends_word = chars.peek().map_or(true, |next| next.is_whitespace());
        if TRAILING_PUNCTUATION.contains(&ch) && ends_word {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}

/// Regra 2: `12.5` → `12 . 5`, `2024-01-02` → `2024 - 01-02`.
fn split_numeric_separators(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut last = 0;

    for caps in numeric_separator().captures_iter(text) {
        let (Some(whole), Some(left), Some(sep), Some(right)) =
            (caps.get(0), caps.get(1), caps.get(2), caps.get(3))
        else {
            continue;
        };
        let starts_word = text[..whole.start()]
            .chars()
            .next_back()
            .map_or(true, char::is_whitespace);
        if !starts_word {
            continue;
        }

        out.push_str(&text[last..whole.start()]);
        out.push_str(left.as_str());
        out.push(' ');
        out.push_str(sep.as_str());
        out.push(' ');
        out.push_str(right.as_str());
        last = whole.end();
    }

    out.push_str(&text[last..]);
    out
}
