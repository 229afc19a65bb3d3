//! # Segmentador de Sentenças
//!
//! Heurística de parágrafo/sentença para cartas e formulários: há uma fronteira
//!
//! - em uma **linha em branco** (`\n`, espaços opcionais, `\n`), e
//! - em uma **quebra de linha seguida de letra maiúscula** (cabeçalhos, linhas de
//!   endereço, "Sehr geehrte..."). A quebra é consumida; a maiúscula fica na
//!   próxima sentença.
//!
//! "Maiúscula" é `char::is_uppercase` (Unicode), não só `A-Z`: `Ärger`, `Öffnung`
//! e `Übersicht` também abrem sentença.
//!
//! Pedaços vazios ou só com espaços são descartados. Sem nenhuma fronteira, o
//! documento inteiro vira uma única sentença.

use serde::{Deserialize, Serialize};

/// Um trecho do documento com seu offset (em bytes) no texto original.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    pub text: String,
    pub start: usize,
}

/// Divide o texto de um documento em sentenças.
pub fn segment(text: &str) -> Vec<Sentence> {
    let mut sentences = Vec::new();
    let mut piece_start = 0;
    let mut pos = 0;

    while let Some(offset) = text[pos..].find('\n') {
        let newline = pos + offset;
        let after = newline + 1;

        if let Some(end) = blank_line_end(text, after) {
            push_sentence(&mut sentences, text, piece_start, newline);
            piece_start = end;
            pos = end;
        } else if text[after..].chars().next().is_some_and(char::is_uppercase) {
            push_sentence(&mut sentences, text, piece_start, newline);
            piece_start = after;
            pos = after;
        } else {
            pos = after;
        }
    }
    push_sentence(&mut sentences, text, piece_start, text.len());

    sentences
}

/// Fim do separador `\n\s*\n` que começa logo antes de `after`.
///
/// O `\s*` é guloso: a fronteira se estende até a última quebra de linha do
/// trecho de espaços.
fn blank_line_end(text: &str, after: usize) -> Option<usize> {
    let mut end = None;
    for (i, ch) in text[after..].char_indices() {
        if !ch.is_whitespace() {
            break;
        }
        if ch == '\n' {
            end = Some(after + i + 1);
        }
    }
    end
}

fn push_sentence(sentences: &mut Vec<Sentence>, text: &str, start: usize, end: usize) {
    let piece = &text[start..end];
    if piece.trim().is_empty() {
        return;
    }
    sentences.push(Sentence {
        text: piece.to_string(),
        start,
    });
}
