// src/lib.rs
//
// Arbre de calcul — bibliothèque
// ------------------------------
// Texte -> jetons -> RPN -> arbre -> (affichage | évaluation | dérivée)
// + moteur numérique (intégrale, racines) branché sur l’évaluation.
//
// Exemple :
//   let e = arbre_calcul::parse("x ** 3")?;
//   let d = e.differentiate()?;            // 3 * x ** 2
//   println!("{d}");

pub mod noyau;

pub use noyau::{
    eval_expression, find_root, integrate, parse, solve, Bindings, CalcError, Evaluation,
    Fonction, Node, Op, ParametresNumeriques, ParseError,
};
