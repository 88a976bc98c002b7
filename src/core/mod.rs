//! # Módulo Core: Tipos Fundamentais do Domínio
//!
//! Os tipos sobre os quais o motor de inferência trabalha:
//!
//! - [`FactId`]: identificador de um fato (ex: `feeling_tired`)
//! - [`FactSet`]: conjunto de fatos verdadeiros
//! - [`Rule`](rule::Rule): SE premissas ENTÃO conclusão
//! - [`RuleTable`]: tabela imutável, uma regra por conclusão
//! - [`Catalog`]: as tabelas literais das três variantes da demonstração
//!
//! ## Exemplo de Uso
//!
//! ```rust,ignore
//! use crate::core::{fact_set, RuleTable};
//!
//! let rules = RuleTable::from_literal(&[
//!     ("needs_a_break", &["feeling_tired"]),
//! ])?;
//! let facts = fact_set(["feeling_tired"]);
//! ```

/// Sub-módulo com [`FactId`] e [`FactSet`].
pub mod fact;

/// Sub-módulo com `Rule`, [`RuleTable`] e `RuleError`.
pub mod rule;

/// Sub-módulo com o [`Catalog`] embutido.
pub mod catalog;

pub use catalog::Catalog;
pub use fact::{fact_set, join_labels, FactId, FactSet};
pub use rule::RuleTable;
