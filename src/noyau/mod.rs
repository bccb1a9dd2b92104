//! Noyau arbre d’expression
//!
//! Organisation interne :
//! - jetons.rs    : tokenisation
//! - rpn.rs       : shunting-yard + construction de l’arbre
//! - expr.rs      : arbre (Node) + opérateurs + fonctions
//! - format.rs    : affichage infixe canonique
//! - eval.rs      : évaluation / simplification + pipeline texte -> résultat
//! - derivee.rs   : dérivation symbolique
//! - numerique.rs : intégration, dichotomie, résolution
//! - erreur.rs    : erreurs typées

pub mod derivee;
pub mod erreur;
pub mod eval;
pub mod expr;
pub mod format;
pub mod jetons;
pub mod numerique;
pub mod rpn;

#[cfg(test)]
mod tests_scientifiques;


// API publique minimale
pub use erreur::{CalcError, ParseError};
pub use eval::{eval_expression, Bindings, Evaluation};
pub use expr::{Fonction, Node, Op};
pub use numerique::{find_root, integrate, solve, ParametresNumeriques};
pub use rpn::parse;
