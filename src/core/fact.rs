//! # Fatos: Identificadores Verdadeiros
//!
//! Um [`FactId`] é um token textual (ex: `feeling_tired`) que o motor
//! considera verdadeiro quando está presente em um [`FactSet`].
//!
//! ## Exibição
//!
//! Identificadores usam `snake_case` internamente. Para exibição na
//! interface, [`FactId::label()`] troca `_` por espaços:
//!
//! ```text
//! feeling_tired  →  "feeling tired"
//! suggest_break  →  "suggest break"
//! ```

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identificador de um fato, premissa ou conclusão.
///
/// Newtype sobre `String`: o motor nunca interpreta o conteúdo, só compara.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactId(String);

impl FactId {
    /// Cria um identificador a partir de qualquer texto.
    ///
    /// Não valida nada: a validação acontece ao montar a
    /// [`RuleTable`](super::RuleTable).
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// O token bruto (ex: `"feeling_tired"`).
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Label legível para a interface (ex: `"feeling tired"`).
    pub fn label(&self) -> String {
        self.0.replace('_', " ")
    }

    /// Um identificador é válido se não for vazio e não contiver espaços.
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty() && !self.0.chars().any(char::is_whitespace)
    }
}

impl fmt::Display for FactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FactId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for FactId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for FactId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Conjunto de fatos verdadeiros.
///
/// `BTreeSet` em vez de `HashSet`: a ordem de iteração é estável,
/// o que mantém a renderização e os testes determinísticos.
pub type FactSet = BTreeSet<FactId>;

/// Monta um [`FactSet`] a partir de tokens literais.
///
/// ```rust
/// let facts = fact_set(["feeling_tired", "feeling_sad"]);
/// assert_eq!(facts.len(), 2);
/// ```
pub fn fact_set<I, S>(ids: I) -> FactSet
where
    I: IntoIterator<Item = S>,
    S: Into<FactId>,
{
    ids.into_iter().map(Into::into).collect()
}

/// Junta os labels legíveis de vários fatos com vírgula.
pub fn join_labels<'a>(ids: impl IntoIterator<Item = &'a FactId>) -> String {
    ids.into_iter()
        .map(FactId::label)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_replaces_underscores() {
        assert_eq!(FactId::from("needs_a_break").label(), "needs a break");
    }

    #[test]
    fn validity() {
        assert!(FactId::from("feeling_sad").is_valid());
        assert!(!FactId::from("").is_valid());
        assert!(!FactId::from("feeling sad").is_valid());
    }

    #[test]
    fn fact_set_is_ordered_and_deduplicated() {
        let facts = fact_set(["b", "a", "b"]);
        let ids: Vec<&str> = facts.iter().map(FactId::as_str).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn join_labels_uses_display_form() {
        let facts = fact_set(["feeling_tired", "feeling_sad"]);
        assert_eq!(join_labels(&facts), "feeling sad, feeling tired");
    }
}
