//! Schedule domains
//!
//! One module per importable schedule. Each exposes its record types, a
//! [`crate::types::ScheduleDomain`] implementation and two entry points:
//! `validate_schema` (structure only) and `validate_and_clean`.

pub mod discursos;
pub mod limpeza;
pub mod mecanicas;
pub mod nvc;

pub use discursos::{Discurso, Discursos};
pub use limpeza::{EscalaLimpeza, Limpeza};
pub use mecanicas::{DesignacaoMecanica, Mecanicas, TipoReuniao};
pub use nvc::{Nvc, SemanaNvc};
